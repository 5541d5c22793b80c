use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::bytestring::ByteString;

/// Errors raised while reading bencode.
///
/// Every variant that can be tied to a place in the input carries the byte
/// offset at which the problem was detected.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("syntax error at byte {position}: found '{}', expected {expected}", .found.escape_ascii())]
    Syntax {
        position: usize,
        found: u8,
        expected: &'static str,
    },

    #[error("literal '{literal}' at byte {position} is longer than {limit} characters")]
    Length {
        position: usize,
        literal: String,
        limit: usize,
    },

    #[error("literal '{literal}' at byte {position} does not fit in 64 bits")]
    Overflow { position: usize, literal: String },

    #[error("malformed integer '{literal}' at byte {position}")]
    InvalidInteger { position: usize, literal: String },

    #[error("negative zero at byte {position} is not allowed, use 0 instead")]
    NegativeZero { position: usize },

    #[error("leading zero at byte {position} is not allowed")]
    LeadingZero { position: usize },

    #[error("dictionary key '{key}' without value")]
    KeyWithoutValue { key: ByteString },

    #[error("unexpected end of stream at byte {position}")]
    UnexpectedEof { position: usize },

    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("trailing data after value at byte {position}")]
    TrailingData { position: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while writing bencode.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("unsupported value of type {type_name}: {detail}")]
    Unsupported {
        type_name: &'static str,
        detail: String,
    },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Crate-level error for the operations that combine decoding, encoding and
/// hashing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("type assertion error: root value is a {kind}, expected a dictionary")]
    NotADictionary { kind: &'static str },

    #[error("section '{section}' does not exist")]
    SectionMissing { section: String },

    #[error("self-check error: re-encoded data differs from source at byte {offset} (source {source_len} bytes, re-encoded {encoded_len} bytes)")]
    SelfCheck {
        offset: usize,
        source_len: usize,
        encoded_len: usize,
    },

    #[error("cannot read {}: {source}", .path.display())]
    File { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
