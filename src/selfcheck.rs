//! Round-trip verification.
//!
//! A canonical bencode value has exactly one serialization, so re-encoding a
//! decoded value must give back the bytes it was decoded from. Any difference
//! means the source was not canonical (e.g. `i-0e`, `i007e`, `03:abc`) or one
//! side of the codec is wrong.

use tracing::{debug, warn};

use crate::bencode::encode;
use crate::error::{Error, Result};
use crate::value::Value;

/// Re-encodes `value` and compares it byte for byte with `source`.
///
/// On mismatch the error carries the offset of the first differing byte.
pub fn verify_round_trip(source: &[u8], value: &Value) -> Result<()> {
    let encoded = encode(value)?;
    if encoded == source {
        debug!(len = source.len(), "self-check passed");
        return Ok(());
    }
    let offset = source
        .iter()
        .zip(encoded.iter())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| source.len().min(encoded.len()));
    warn!(
        offset,
        source_len = source.len(),
        encoded_len = encoded.len(),
        "self-check failed"
    );
    Err(Error::SelfCheck {
        offset,
        source_len: source.len(),
        encoded_len: encoded.len(),
    })
}

/// `true` only when `value` re-encodes to exactly `source`.
pub fn self_check(source: &[u8], value: &Value) -> bool {
    verify_round_trip(source, value).is_ok()
}
