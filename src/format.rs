//! Special bytes of the bencode grammar and well-known sections of a
//! BitTorrent metainfo file.

pub const HEADER_DICTIONARY: u8 = b'd';
pub const HEADER_INTEGER: u8 = b'i';
pub const HEADER_LIST: u8 = b'l';
pub const STRING_SIZE_DELIMITER: u8 = b':';

/// Terminates integers, lists and dictionaries.
pub const FOOTER_COMMON: u8 = b'e';

/// Number of ASCII characters allowed in an integer literal or a string size
/// header. `u64::MAX` is `18446744073709551615`, twenty digits.
pub const INTEGER_MAX_LENGTH: usize = 20;

pub const SECTION_ANNOUNCE: &str = "announce";
pub const SECTION_ANNOUNCE_LIST: &str = "announce-list";
pub const SECTION_CREATION_DATE: &str = "creation date";
pub const SECTION_COMMENT: &str = "comment";
pub const SECTION_CREATED_BY: &str = "created by";
pub const SECTION_ENCODING: &str = "encoding";
pub const SECTION_INFO: &str = "info";
