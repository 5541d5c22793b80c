//! Byte classification and literal conversion used by the decoder.

use std::num::IntErrorKind;

use crate::error::DecodeError;

/// Digits `0`..`9` and the minus sign. Integer literals may be negative.
pub fn is_signed_ascii_digit(b: u8) -> bool {
    b.is_ascii_digit() || b == b'-'
}

/// Digits `0`..`9` only. String size headers are never negative.
pub fn is_ascii_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Converts an integer literal (without its `i`/`e` framing) into an `i64`.
///
/// `position` is the offset of the first literal byte and is only used for
/// error reporting.
pub fn parse_integer(literal: &[u8], max_len: usize, position: usize) -> Result<i64, DecodeError> {
    let text = literal_text(literal, max_len, position)?;
    text.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => DecodeError::Overflow {
            position,
            literal: text.to_string(),
        },
        _ => DecodeError::InvalidInteger {
            position,
            literal: text.to_string(),
        },
    })
}

/// Converts a string size header (without its `:` delimiter) into a `u64`.
pub fn parse_size(header: &[u8], max_len: usize, position: usize) -> Result<u64, DecodeError> {
    let text = literal_text(header, max_len, position)?;
    text.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => DecodeError::Overflow {
            position,
            literal: text.to_string(),
        },
        _ => DecodeError::InvalidInteger {
            position,
            literal: text.to_string(),
        },
    })
}

/// Rejects the representations canonical bencode forbids: `-0`, and any
/// leading zero except for the literal `0` itself.
pub fn check_canonical(literal: &[u8], position: usize) -> Result<(), DecodeError> {
    match literal {
        [b'-', b'0', ..] => Err(DecodeError::NegativeZero { position }),
        [b'0', _, ..] => Err(DecodeError::LeadingZero { position }),
        _ => Ok(()),
    }
}

fn literal_text(literal: &[u8], max_len: usize, position: usize) -> Result<&str, DecodeError> {
    let text = std::str::from_utf8(literal).map_err(|_| DecodeError::InvalidInteger {
        position,
        literal: String::from_utf8_lossy(literal).into_owned(),
    })?;
    if text.len() > max_len {
        return Err(DecodeError::Length {
            position,
            literal: text.to_string(),
            limit: max_len,
        });
    }
    Ok(text)
}
