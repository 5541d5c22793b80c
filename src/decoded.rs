use std::time::{SystemTime, UNIX_EPOCH};

use crate::bdecode::decode;
use crate::checksum::{compute_btih, info_section, Btih};
use crate::error::Result;
use crate::selfcheck::verify_round_trip;
use crate::value::Value;

/// A decoded value together with the bytes it came from.
///
/// Only the self-check flag and the BTIH change after construction.
#[derive(Debug, Clone)]
pub struct DecodedObject {
    file_path: String,
    source: Vec<u8>,
    value: Value,
    decode_timestamp: i64,
    self_checked: bool,
    btih: Option<Btih>,
}

impl DecodedObject {
    pub fn new(file_path: impl Into<String>, source: Vec<u8>, value: Value) -> DecodedObject {
        DecodedObject {
            file_path: file_path.into(),
            source,
            value,
            decode_timestamp: unix_now(),
            self_checked: false,
            btih: None,
        }
    }

    /// Decodes `source` and wraps the result.
    pub fn from_bytes(file_path: impl Into<String>, source: Vec<u8>) -> Result<DecodedObject> {
        let value = decode(&source)?;
        Ok(DecodedObject::new(file_path, source, value))
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Seconds since the Unix epoch at which the object was built.
    pub fn decode_timestamp(&self) -> i64 {
        self.decode_timestamp
    }

    pub fn is_self_checked(&self) -> bool {
        self.self_checked
    }

    pub fn btih(&self) -> Option<&Btih> {
        self.btih.as_ref()
    }

    /// Re-encodes the value and compares it with the source bytes. The flag is
    /// set only on an exact match.
    pub fn make_self_check(&mut self) -> Result<()> {
        verify_round_trip(&self.source, &self.value)?;
        self.self_checked = true;
        Ok(())
    }

    pub fn info_section(&self) -> Result<&Value> {
        info_section(&self.value)
    }

    /// Derives and stores the BTIH of the `info` section.
    pub fn calculate_btih(&mut self) -> Result<&Btih> {
        let btih = compute_btih(&self.value)?;
        Ok(self.btih.insert(btih))
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
