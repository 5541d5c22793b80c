//! SHA-1 helpers and the BitTorrent Info Hash.

use std::fmt;

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::bencode::encode;
use crate::error::{Error, Result};
use crate::format::SECTION_INFO;
use crate::value::Value;

pub type Sha1Sum = [u8; 20];

/// Hashes `data` and returns the digest together with its lowercase hex form.
pub fn calculate_sha1(data: &[u8]) -> (Sha1Sum, String) {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&result);
    (hash, hex::encode(hash))
}

/// BitTorrent Info Hash, stored both as raw bytes and as lowercase hex text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Btih {
    pub bytes: Sha1Sum,
    pub text: String,
}

impl Btih {
    /// Builds a hash from its hex form, as printed by torrent clients.
    pub fn from_hex(text: &str) -> std::result::Result<Btih, hex::FromHexError> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(text, &mut bytes)?;
        Ok(Btih {
            bytes,
            text: hex::encode(bytes),
        })
    }

    pub fn into_parts(self) -> (Sha1Sum, String) {
        (self.bytes, self.text)
    }
}

impl From<(Sha1Sum, String)> for Btih {
    fn from((bytes, text): (Sha1Sum, String)) -> Self {
        Btih { bytes, text }
    }
}

impl fmt::Display for Btih {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Finds the value stored under `info` in a top-level dictionary.
pub fn info_section(root: &Value) -> Result<&Value> {
    let dict = root.as_dictionary().ok_or(Error::NotADictionary { kind: root.kind() })?;
    dict.iter()
        .find(|item| item.key == SECTION_INFO)
        .map(|item| &item.value)
        .ok_or_else(|| Error::SectionMissing {
            section: SECTION_INFO.to_string(),
        })
}

/// Re-encodes the `info` section of `root` and hashes it.
pub fn compute_btih(root: &Value) -> Result<Btih> {
    let info = info_section(root)?;
    let encoded = encode(info)?;
    let btih = Btih::from(calculate_sha1(&encoded));
    debug!(btih = %btih, info_len = encoded.len(), "computed info hash");
    Ok(btih)
}
