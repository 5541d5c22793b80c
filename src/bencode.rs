use std::hash::Hash;
use std::io::Write;

use linked_hash_map::LinkedHashMap;
use tracing::trace;

use crate::bytestring::ByteString;
use crate::error::EncodeError;
use crate::format::{
    FOOTER_COMMON, HEADER_DICTIONARY, HEADER_INTEGER, HEADER_LIST, STRING_SIZE_DELIMITER,
};
use crate::value::{DictionaryItem, Value};

type Result<T> = std::result::Result<T, EncodeError>;

/// Types that can be written as bencode.
///
/// Implemented for [`Value`] and for the plain Rust types that map onto the
/// grammar: byte sequences and text become byte strings, every integer width
/// becomes an integer, `[Value]` a list, and `[DictionaryItem]` or a
/// [`LinkedHashMap`] a dictionary.
///
/// Dictionaries are written in the order their entries are stored. Nothing
/// is sorted or deduplicated, producing canonical output is up to the caller.
pub trait ToBencode {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()>;
}

/// Encodes a value into a fresh buffer.
pub fn encode<T: ToBencode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value.encode_to(&mut buf)?;
    trace!(len = buf.len(), "encoded bencode value");
    Ok(buf)
}

/// Encodes a value into an existing writer.
pub fn encode_into<T: ToBencode + ?Sized, W: Write>(value: &T, writer: &mut W) -> Result<()> {
    value.encode_to(writer)
}

fn encode_bytestring<W: Write>(bs: &[u8], buf: &mut W) -> Result<()> {
    write!(buf, "{}", bs.len())?;
    buf.write_all(&[STRING_SIZE_DELIMITER])?;
    buf.write_all(bs)?;
    Ok(())
}

fn encode_int<W: Write>(int: i64, buf: &mut W) -> Result<()> {
    buf.write_all(&[HEADER_INTEGER])?;
    write!(buf, "{}", int)?;
    buf.write_all(&[FOOTER_COMMON])?;
    Ok(())
}

fn encode_list<W: Write>(list: &[Value], buf: &mut W) -> Result<()> {
    buf.write_all(&[HEADER_LIST])?;
    for item in list {
        item.encode_to(buf)?;
    }
    buf.write_all(&[FOOTER_COMMON])?;
    Ok(())
}

fn encode_dict<'a, K, V, W>(entries: impl Iterator<Item = (&'a K, &'a V)>, buf: &mut W) -> Result<()>
where
    K: AsRef<[u8]> + ?Sized + 'a,
    V: ToBencode + ?Sized + 'a,
    W: Write,
{
    buf.write_all(&[HEADER_DICTIONARY])?;
    for (key, val) in entries {
        encode_bytestring(key.as_ref(), buf)?;
        val.encode_to(buf)?;
    }
    buf.write_all(&[FOOTER_COMMON])?;
    Ok(())
}

impl ToBencode for Value {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        match self {
            Value::ByteString(bytes) => encode_bytestring(bytes, buf),
            Value::Integer(int) => encode_int(*int, buf),
            Value::List(list) => encode_list(list, buf),
            Value::Dictionary(dict) => dict.as_slice().encode_to(buf),
        }
    }
}

impl ToBencode for [DictionaryItem] {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_dict(self.iter().map(|item| (&item.key, &item.value)), buf)
    }
}

impl ToBencode for Vec<DictionaryItem> {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        self.as_slice().encode_to(buf)
    }
}

impl ToBencode for [Value] {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_list(self, buf)
    }
}

impl ToBencode for Vec<Value> {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_list(self, buf)
    }
}

impl<K: AsRef<[u8]> + Hash + Eq, V: ToBencode> ToBencode for LinkedHashMap<K, V> {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_dict(self.iter(), buf)
    }
}

impl ToBencode for ByteString {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_bytestring(&self.0, buf)
    }
}

impl ToBencode for [u8] {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_bytestring(self, buf)
    }
}

impl ToBencode for Vec<u8> {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_bytestring(self, buf)
    }
}

impl ToBencode for str {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_bytestring(self.as_bytes(), buf)
    }
}

impl ToBencode for String {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        encode_bytestring(self.as_bytes(), buf)
    }
}

impl<T: ToBencode + ?Sized> ToBencode for &T {
    fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
        (**self).encode_to(buf)
    }
}

// Every value of these types fits in an i64.
macro_rules! impl_to_bencode_lossless {
    ($($ty:ty),*) => {
        $(
            impl ToBencode for $ty {
                fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
                    encode_int(i64::from(*self), buf)
                }
            }
        )*
    };
}

// Values outside the i64 range would not decode back, so they are refused.
macro_rules! impl_to_bencode_checked {
    ($($ty:ty),*) => {
        $(
            impl ToBencode for $ty {
                fn encode_to<W: Write>(&self, buf: &mut W) -> Result<()> {
                    let int = i64::try_from(*self).map_err(|_| EncodeError::Unsupported {
                        type_name: stringify!($ty),
                        detail: format!("{} is outside the signed 64-bit range", self),
                    })?;
                    encode_int(int, buf)
                }
            }
        )*
    };
}

impl_to_bencode_lossless!(i8, i16, i32, i64, u8, u16, u32);
impl_to_bencode_checked!(isize, usize, u64, i128, u128);
