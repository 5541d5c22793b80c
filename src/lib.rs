//! Bencode codec with round-trip verification and BitTorrent Info Hash
//! derivation.
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` |
//! | Byte string | `<length>:<data>` | `4:spam` |
//! | List | `l<items>e` | `l4:spami42ee` |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` |
//!
//! Decoded dictionaries keep their entries in stream order, duplicates
//! included, so that a canonical input re-encodes to exactly the same bytes.
//! That property is what makes the info hash of a decoded `.torrent` file
//! meaningful.
//!
//! ```
//! use bencode_btih::{compute_btih, decode, encode, self_check};
//!
//! let source = b"d4:info12:Just a Test.e";
//! let value = decode(source).unwrap();
//! assert_eq!(encode(&value).unwrap(), source);
//! assert!(self_check(source, &value));
//!
//! let btih = compute_btih(&value).unwrap();
//! assert_eq!(btih.text, "6f1ef4ba8a877d657378dbbb78badfd2eaacf2a2");
//! ```

pub mod bdecode;
pub mod bencode;
pub mod bytestring;
pub mod checksum;
pub mod config;
pub mod decoded;
pub mod error;
pub mod file;
pub mod format;
pub mod primitives;
pub mod selfcheck;
pub mod value;

pub use bdecode::{decode, decode_from, decode_from_with, decode_with, BDecoder, ByteSource};
pub use bencode::{encode, encode_into, ToBencode};
pub use bytestring::{ByteString, ToByteString};
pub use checksum::{calculate_sha1, compute_btih, info_section, Btih, Sha1Sum};
pub use config::DecoderConfig;
pub use decoded::DecodedObject;
pub use error::{DecodeError, EncodeError, Error, Result};
pub use file::TorrentFile;
pub use selfcheck::{self_check, verify_round_trip};
pub use value::{DictionaryItem, Value};
