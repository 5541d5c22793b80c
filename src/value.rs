use std::borrow::Cow;

use linked_hash_map::LinkedHashMap;

use crate::bytestring::ByteString;

/// A decoded bencode value.
///
/// Dictionaries are stored as the sequence of pairs read from the stream.
/// Keys are neither sorted nor deduplicated, so a decoded dictionary encodes
/// back in exactly the order it was read.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Value {
    ByteString(ByteString),
    Integer(i64),
    List(Vec<Value>),
    Dictionary(Vec<DictionaryItem>),
}

/// A single key/value pair of a dictionary.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DictionaryItem {
    pub key: ByteString,
    pub value: Value,
}

impl DictionaryItem {
    pub fn new(key: impl Into<ByteString>, value: impl Into<Value>) -> DictionaryItem {
        DictionaryItem {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key as text, with invalid UTF-8 replaced.
    pub fn key_str(&self) -> Cow<'_, str> {
        self.key.to_string_lossy()
    }

    /// The value as text when it is a byte string, `None` for every other kind.
    pub fn value_str(&self) -> Option<Cow<'_, str>> {
        match &self.value {
            Value::ByteString(bs) => Some(bs.to_string_lossy()),
            _ => None,
        }
    }
}

impl Value {
    /// Human readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::ByteString(_) => "byte string",
            Value::Integer(_) => "integer",
            Value::List(_) => "list",
            Value::Dictionary(_) => "dictionary",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::ByteString(bs) => Some(bs.as_bytes()),
            _ => None,
        }
    }

    /// Returns the byte string as text if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::ByteString(bs) => bs.as_str(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&[DictionaryItem]> {
        match self {
            Value::Dictionary(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up the first entry with the given key.
    ///
    /// Returns `None` if this is not a dictionary or the key is absent.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dictionary()?
            .iter()
            .find(|item| item.key.as_bytes() == key)
            .map(|item| &item.value)
    }

    /// Collects a dictionary into an insertion-ordered map.
    ///
    /// When a key repeats, the later value wins. Returns `None` for any other kind.
    pub fn into_map(self) -> Option<LinkedHashMap<ByteString, Value>> {
        match self {
            Value::Dictionary(items) => Some(
                items
                    .into_iter()
                    .map(|item| (item.key, item.value))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::ByteString(ByteString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::ByteString(ByteString::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::ByteString(ByteString::from(bytes))
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::ByteString(ByteString(bytes))
    }
}

impl From<ByteString> for Value {
    fn from(bs: ByteString) -> Self {
        Value::ByteString(bs)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}

impl From<Vec<DictionaryItem>> for Value {
    fn from(items: Vec<DictionaryItem>) -> Self {
        Value::Dictionary(items)
    }
}

impl From<LinkedHashMap<ByteString, Value>> for Value {
    fn from(map: LinkedHashMap<ByteString, Value>) -> Self {
        Value::Dictionary(
            map.into_iter()
                .map(|(key, value)| DictionaryItem { key, value })
                .collect(),
        )
    }
}
