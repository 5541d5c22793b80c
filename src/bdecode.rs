use std::io::{self, BufRead, Read};

use tracing::{debug, trace};

use crate::bytestring::ByteString;
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::format::{
    FOOTER_COMMON, HEADER_DICTIONARY, HEADER_INTEGER, HEADER_LIST, STRING_SIZE_DELIMITER,
};
use crate::primitives::{
    check_canonical, is_ascii_digit, is_signed_ascii_digit, parse_integer, parse_size,
};
use crate::value::{DictionaryItem, Value};

type Result<T> = std::result::Result<T, DecodeError>;

/// A cursor over the encoded bytes with one byte of lookahead.
///
/// Byte strings carry no type tag, so the decoder must look at the next byte
/// before knowing which production it is in. `peek` never consumes; `advance`
/// consumes the byte `peek` returned.
pub trait ByteSource {
    /// The next byte, or `None` at the end of the stream.
    fn peek(&mut self) -> Result<Option<u8>>;

    /// Consumes the byte last returned by `peek`.
    fn advance(&mut self);

    /// Consumes exactly `len` bytes.
    fn take(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;
}

/// An in-memory byte buffer.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> SliceSource<'a> {
        SliceSource { bytes, cursor: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.bytes.get(self.cursor).cloned())
    }

    fn advance(&mut self) {
        if self.cursor < self.bytes.len() {
            self.cursor += 1;
        }
    }

    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        let start = self.cursor;
        match start.checked_add(len).filter(|&end| end <= self.bytes.len()) {
            Some(end) => {
                self.cursor = end;
                Ok(self.bytes[start..end].to_vec())
            }
            None => {
                self.cursor = self.bytes.len();
                Err(DecodeError::UnexpectedEof {
                    position: self.cursor,
                })
            }
        }
    }

    fn position(&self) -> usize {
        self.cursor
    }
}

/// A buffered stream. The reader's own buffer provides the lookahead.
pub struct ReaderSource<R> {
    reader: R,
    position: usize,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> ReaderSource<R> {
        ReaderSource {
            reader,
            position: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> ByteSource for ReaderSource<R> {
    fn peek(&mut self) -> Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().cloned()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn advance(&mut self) {
        self.reader.consume(1);
        self.position += 1;
    }

    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        // The declared length is untrusted, let the buffer grow with the data.
        let mut buf = Vec::new();
        let read = Read::take(&mut self.reader, len as u64).read_to_end(&mut buf)?;
        self.position += read;
        if read < len {
            return Err(DecodeError::UnexpectedEof {
                position: self.position,
            });
        }
        Ok(buf)
    }

    fn position(&self) -> usize {
        self.position
    }
}

/// Recursive-descent bencode reader.
pub struct BDecoder<S> {
    source: S,
    config: DecoderConfig,
    depth: usize,
}

impl<'a> BDecoder<SliceSource<'a>> {
    pub fn new(bytes: &'a [u8]) -> BDecoder<SliceSource<'a>> {
        BDecoder::with_source(SliceSource::new(bytes), DecoderConfig::default())
    }
}

impl<R: BufRead> BDecoder<ReaderSource<R>> {
    pub fn from_reader(reader: R) -> BDecoder<ReaderSource<R>> {
        BDecoder::with_source(ReaderSource::new(reader), DecoderConfig::default())
    }
}

impl<S: ByteSource> BDecoder<S> {
    pub fn with_source(source: S, config: DecoderConfig) -> BDecoder<S> {
        BDecoder {
            source,
            config,
            depth: 0,
        }
    }

    pub fn with_config(mut self, config: DecoderConfig) -> BDecoder<S> {
        self.config = config;
        self
    }

    pub fn position(&self) -> usize {
        self.source.position()
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Reads the next complete value.
    pub fn decode(&mut self) -> Result<Value> {
        // A failed value can leave containers open.
        self.depth = 0;
        self.parse_type()
    }

    /// Succeeds only if the source is exhausted.
    pub fn finish(&mut self) -> Result<()> {
        match self.source.peek()? {
            None => Ok(()),
            Some(_) => Err(DecodeError::TrailingData {
                position: self.position(),
            }),
        }
    }

    fn parse_type(&mut self) -> Result<Value> {
        let position = self.position();
        match self.source.peek()? {
            None => Err(DecodeError::UnexpectedEof { position }),
            Some(HEADER_DICTIONARY) => self.parse_dict().map(Value::Dictionary),
            Some(HEADER_LIST) => self.parse_list().map(Value::List),
            Some(HEADER_INTEGER) => self.parse_int().map(Value::Integer),
            Some(chr) if is_ascii_digit(chr) => self.parse_str().map(Value::ByteString),
            Some(chr) => Err(DecodeError::Syntax {
                position,
                found: chr,
                expected: "'d', 'l', 'i' or a string length",
            }),
        }
    }

    fn parse_str(&mut self) -> Result<ByteString> {
        let start = self.position();
        let header = self.read_size_header()?;
        if self.config.strict_integers {
            check_canonical(&header, start)?;
        }
        let len = parse_size(&header, self.config.max_literal_length, start)?;
        let len = usize::try_from(len).map_err(|_| DecodeError::Overflow {
            position: start,
            literal: len.to_string(),
        })?;
        trace!(len, position = self.position(), "reading byte string");
        self.source.take(len).map(ByteString)
    }

    // Reads `<digits>:` and returns the digits.
    fn read_size_header(&mut self) -> Result<Vec<u8>> {
        let start = self.position();
        let mut header = Vec::new();
        loop {
            let position = self.position();
            match self.source.peek()? {
                None => return Err(DecodeError::UnexpectedEof { position }),
                Some(STRING_SIZE_DELIMITER) => break,
                Some(chr) if is_ascii_digit(chr) => {
                    if header.len() >= self.config.max_literal_length {
                        header.push(chr);
                        return Err(DecodeError::Length {
                            position: start,
                            literal: String::from_utf8_lossy(&header).into_owned(),
                            limit: self.config.max_literal_length,
                        });
                    }
                    header.push(chr);
                    self.source.advance();
                }
                Some(chr) => {
                    return Err(DecodeError::Syntax {
                        position,
                        found: chr,
                        expected: if header.is_empty() {
                            "a string length"
                        } else {
                            "a digit or ':'"
                        },
                    })
                }
            }
        }
        if header.is_empty() {
            return Err(DecodeError::Syntax {
                position: start,
                found: STRING_SIZE_DELIMITER,
                expected: "a string length",
            });
        }
        self.source.advance();
        Ok(header)
    }

    fn parse_int(&mut self) -> Result<i64> {
        self.expect_char(HEADER_INTEGER, "'i'")?;
        let start = self.position();
        let mut literal = Vec::new();
        loop {
            let position = self.position();
            match self.source.peek()? {
                None => return Err(DecodeError::UnexpectedEof { position }),
                Some(FOOTER_COMMON) => break,
                Some(chr) if is_signed_ascii_digit(chr) => {
                    if literal.len() >= self.config.max_literal_length {
                        literal.push(chr);
                        return Err(DecodeError::Length {
                            position: start,
                            literal: String::from_utf8_lossy(&literal).into_owned(),
                            limit: self.config.max_literal_length,
                        });
                    }
                    literal.push(chr);
                    self.source.advance();
                }
                Some(chr) => {
                    return Err(DecodeError::Syntax {
                        position,
                        found: chr,
                        expected: "a digit or 'e'",
                    })
                }
            }
        }
        if literal.is_empty() {
            return Err(DecodeError::Syntax {
                position: start,
                found: FOOTER_COMMON,
                expected: "an integer",
            });
        }
        if self.config.strict_integers {
            check_canonical(&literal, start)?;
        }
        let value = parse_integer(&literal, self.config.max_literal_length, start)?;
        self.source.advance();
        Ok(value)
    }

    fn parse_list(&mut self) -> Result<Vec<Value>> {
        self.expect_char(HEADER_LIST, "'l'")?;
        self.enter()?;
        let mut list = Vec::new();
        while !self.at_footer()? {
            list.push(self.parse_type()?);
        }
        self.source.advance();
        self.leave();
        Ok(list)
    }

    fn parse_dict(&mut self) -> Result<Vec<DictionaryItem>> {
        self.expect_char(HEADER_DICTIONARY, "'d'")?;
        self.enter()?;
        let mut dict = Vec::new();
        while !self.at_footer()? {
            let key = self.parse_str()?;
            if self.at_footer()? {
                return Err(DecodeError::KeyWithoutValue { key });
            }
            let value = self.parse_type()?;
            dict.push(DictionaryItem { key, value });
        }
        self.source.advance();
        self.leave();
        Ok(dict)
    }

    // A container may end here. Running out of input is an error, never an implicit close.
    fn at_footer(&mut self) -> Result<bool> {
        let position = self.position();
        match self.source.peek()? {
            None => Err(DecodeError::UnexpectedEof { position }),
            Some(chr) => Ok(chr == FOOTER_COMMON),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(DecodeError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expect_char(&mut self, expected: u8, what: &'static str) -> Result<u8> {
        let position = self.position();
        match self.source.peek()? {
            None => Err(DecodeError::UnexpectedEof { position }),
            Some(chr) if chr == expected => {
                self.source.advance();
                Ok(chr)
            }
            Some(chr) => Err(DecodeError::Syntax {
                position,
                found: chr,
                expected: what,
            }),
        }
    }
}

/// Decodes a complete buffer. Bytes left over after the value are an error.
pub fn decode(inp: &[u8]) -> Result<Value> {
    decode_with(inp, DecoderConfig::default())
}

pub fn decode_with(inp: &[u8], config: DecoderConfig) -> Result<Value> {
    debug!(len = inp.len(), "decoding bencode buffer");
    let mut decoder = BDecoder::with_source(SliceSource::new(inp), config);
    let value = decoder.decode()?;
    decoder.finish()?;
    Ok(value)
}

/// Decodes one value from a buffered reader.
///
/// The reader is left positioned right after the value, so passing
/// `&mut reader` allows reading several concatenated values.
pub fn decode_from<R: BufRead>(reader: R) -> Result<Value> {
    decode_from_with(reader, DecoderConfig::default())
}

pub fn decode_from_with<R: BufRead>(reader: R, config: DecoderConfig) -> Result<Value> {
    let mut decoder = BDecoder::from_reader(reader).with_config(config);
    let value = decoder.decode()?;
    debug!(consumed = decoder.position(), "decoded bencode value from stream");
    Ok(value)
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use super::*;

    fn bytes(s: &str) -> ByteString {
        ByteString::from(s)
    }

    #[test]
    pub fn expect_char() {
        let mut parser = BDecoder::new(b"abc");

        assert_eq!(parser.expect_char(b'a', "'a'").unwrap(), b'a');
        assert_eq!(parser.position(), 1);
        assert!(matches!(
            parser.expect_char(b'a', "'a'"),
            Err(DecodeError::Syntax { position: 1, found: b'b', .. })
        ));
        assert_eq!(parser.position(), 1);
    }

    #[test]
    pub fn test_parse_integer() {
        let parse_int = |inp: &str| {
            let mut decoder = BDecoder::new(inp.as_bytes());
            (decoder.parse_int(), decoder.position())
        };

        let (result, cursor) = parse_int("i123e");
        assert_eq!((123, 5), (result.unwrap(), cursor));
        let (result, cursor) = parse_int("i-123e");
        assert_eq!((-123, 6), (result.unwrap(), cursor));
        let (result, cursor) = parse_int("i0e");
        assert_eq!((0, 3), (result.unwrap(), cursor));

        assert!(matches!(parse_int("abc"), (Err(DecodeError::Syntax { position: 0, found: b'a', .. }), 0)));
        assert!(matches!(parse_int("iabc"), (Err(DecodeError::Syntax { position: 1, found: b'a', .. }), 1)));
        assert!(matches!(parse_int("i23abc"), (Err(DecodeError::Syntax { position: 3, found: b'a', .. }), 3)));
        assert!(matches!(parse_int("i23"), (Err(DecodeError::UnexpectedEof { position: 3 }), 3)));
        assert!(matches!(parse_int("ie"), (Err(DecodeError::Syntax { position: 1, found: b'e', .. }), 1)));
        assert!(matches!(parse_int("i1-2e"), (Err(DecodeError::InvalidInteger { .. }), _)));
    }

    #[test]
    pub fn integer_boundaries() {
        assert_eq!(Value::Integer(i64::MAX), decode(b"i9223372036854775807e").unwrap());
        assert_eq!(Value::Integer(i64::MIN), decode(b"i-9223372036854775808e").unwrap());
        assert!(matches!(
            decode(b"i9223372036854775808e"),
            Err(DecodeError::Overflow { position: 1, .. })
        ));
        assert!(matches!(
            decode(b"i123456789012345678901e"),
            Err(DecodeError::Length { position: 1, limit: 20, .. })
        ));
    }

    #[test]
    pub fn non_canonical_integers() {
        // Permissive by default: accepted, but they will not re-encode to the same bytes.
        assert_eq!(Value::Integer(0), decode(b"i-0e").unwrap());
        assert_eq!(Value::Integer(7), decode(b"i007e").unwrap());

        let strict = DecoderConfig::strict();
        assert!(matches!(decode_with(b"i-0e", strict), Err(DecodeError::NegativeZero { position: 1 })));
        assert!(matches!(decode_with(b"i007e", strict), Err(DecodeError::LeadingZero { position: 1 })));
        assert!(matches!(decode_with(b"03:abc", strict), Err(DecodeError::LeadingZero { position: 0 })));
        assert_eq!(Value::Integer(-10), decode_with(b"i-10e", strict).unwrap());
        assert_eq!(Value::from(""), decode_with(b"0:", strict).unwrap());
    }

    #[test]
    pub fn test_parse_string() {
        let parse_string = |inp: &str| {
            let mut decoder = BDecoder::new(inp.as_bytes());
            (decoder.parse_str(), decoder.position())
        };

        let (result, cursor) = parse_string("3:abc");
        assert_eq!((bytes("abc"), 5), (result.unwrap(), cursor));
        let (result, cursor) = parse_string("0:");
        assert_eq!((bytes(""), 2), (result.unwrap(), cursor));

        assert!(matches!(parse_string("abc"), (Err(DecodeError::Syntax { position: 0, found: b'a', .. }), 0)));
        assert!(matches!(parse_string("3abc"), (Err(DecodeError::Syntax { position: 1, found: b'a', .. }), 1)));
        assert!(matches!(parse_string(":abc"), (Err(DecodeError::Syntax { position: 0, found: b':', .. }), 0)));
        assert!(matches!(parse_string("3:ab"), (Err(DecodeError::UnexpectedEof { position: 4 }), 4)));
        assert!(matches!(parse_string("12"), (Err(DecodeError::UnexpectedEof { position: 2 }), 2)));
        assert!(matches!(
            parse_string("123456789012345678901:a"),
            (Err(DecodeError::Length { position: 0, limit: 20, .. }), 20)
        ));
        assert!(matches!(
            parse_string("99999999999999999999:a"),
            (Err(DecodeError::Overflow { position: 0, .. }), 21)
        ));
    }

    #[test]
    pub fn binary_string_contents() {
        let decoded = decode(b"4:\x00\xff:e").unwrap();
        assert_eq!(Value::from(vec![0x00, 0xff, b':', b'e']), decoded);
    }

    #[test]
    pub fn test_parse_list() {
        let parse_list = |inp: &str| {
            let mut decoder = BDecoder::new(inp.as_bytes());
            (decoder.parse_list(), decoder.position())
        };

        let (result, cursor) = parse_list("le");
        assert_eq!((vec![], 2), (result.unwrap(), cursor));
        let (result, cursor) = parse_list("li123ee");
        assert_eq!((vec![Value::Integer(123)], 7), (result.unwrap(), cursor));
        let (result, cursor) = parse_list("l4:spam4:eggse");
        assert_eq!((vec![Value::from("spam"), Value::from("eggs")], 14), (result.unwrap(), cursor));
        let (result, cursor) = parse_list("llleelleee");
        assert_eq!(
            (
                vec![
                    Value::List(vec![Value::List(vec![])]),
                    Value::List(vec![Value::List(vec![])]),
                ],
                10
            ),
            (result.unwrap(), cursor)
        );

        assert!(matches!(parse_list("abc"), (Err(DecodeError::Syntax { position: 0, .. }), 0)));
        assert!(matches!(parse_list("l3:abc"), (Err(DecodeError::UnexpectedEof { position: 6 }), 6)));
        assert!(matches!(parse_list("lxe"), (Err(DecodeError::Syntax { position: 1, found: b'x', .. }), 1)));
    }

    #[test]
    pub fn test_parse_dictionary() {
        let parse_dictionary = |inp: &str| {
            let mut decoder = BDecoder::new(inp.as_bytes());
            (decoder.parse_dict(), decoder.position())
        };

        let (result, cursor) = parse_dictionary("de");
        assert_eq!((vec![], 2), (result.unwrap(), cursor));

        let (result, cursor) = parse_dictionary("d1:ai123ee");
        assert_eq!((vec![DictionaryItem::new("a", 123i64)], 10), (result.unwrap(), cursor));

        let (result, cursor) = parse_dictionary("d1:al3:heye1:blee");
        assert_eq!(
            (
                vec![
                    DictionaryItem::new("a", vec![Value::from("hey")]),
                    DictionaryItem::new("b", Vec::<Value>::new()),
                ],
                17
            ),
            (result.unwrap(), cursor)
        );

        let (result, cursor) = parse_dictionary("d5:innerd1:ai345e1:b3:wowe6:inner2dee");
        assert_eq!(
            (
                vec![
                    DictionaryItem::new(
                        "inner",
                        vec![DictionaryItem::new("a", 345i64), DictionaryItem::new("b", "wow")],
                    ),
                    DictionaryItem::new("inner2", Vec::<DictionaryItem>::new()),
                ],
                37
            ),
            (result.unwrap(), cursor)
        );

        assert!(matches!(parse_dictionary("abc"), (Err(DecodeError::Syntax { position: 0, .. }), 0)));
        match parse_dictionary("d4:iteme") {
            (Err(DecodeError::KeyWithoutValue { key }), 7) => assert_eq!(bytes("item"), key),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(parse_dictionary("d1:a2:bc"), (Err(DecodeError::UnexpectedEof { position: 8 }), 8)));
        assert!(matches!(parse_dictionary("d1:a"), (Err(DecodeError::UnexpectedEof { position: 4 }), 4)));
        assert!(matches!(parse_dictionary("di1ei2ee"), (Err(DecodeError::Syntax { position: 1, found: b'i', .. }), 1)));
    }

    #[test]
    pub fn dictionary_order_and_duplicates_preserved() {
        let decoded = decode(b"d3:one3:uno3:two3:dose").unwrap();
        assert_eq!(
            Value::Dictionary(vec![DictionaryItem::new("one", "uno"), DictionaryItem::new("two", "dos")]),
            decoded
        );

        let decoded = decode(b"d1:bi1e1:ai2e1:bi3ee").unwrap();
        let keys: Vec<_> = decoded.as_dictionary().unwrap().iter().map(|i| i.key_str().into_owned()).collect();
        assert_eq!(vec!["b", "a", "b"], keys);
    }

    #[test]
    pub fn malformed_input_rejected() {
        assert!(matches!(decode(b""), Err(DecodeError::UnexpectedEof { position: 0 })));
        assert!(matches!(decode(b"x"), Err(DecodeError::Syntax { position: 0, found: b'x', .. })));
        assert!(matches!(decode(b":abc"), Err(DecodeError::Syntax { position: 0, found: b':', .. })));
        assert!(matches!(decode(b"5:abc"), Err(DecodeError::UnexpectedEof { .. })));
        assert!(matches!(decode(b"l"), Err(DecodeError::UnexpectedEof { position: 1 })));
        assert!(matches!(decode(b"d"), Err(DecodeError::UnexpectedEof { position: 1 })));
        assert!(matches!(decode(b"i1ei2e"), Err(DecodeError::TrailingData { position: 3 })));
    }

    #[test]
    pub fn nesting_is_bounded() {
        let config = DecoderConfig::default().with_max_depth(2);
        assert!(decode_with(b"llee", config).is_ok());
        assert!(decode_with(b"ld1:ai1eee", config).is_ok());
        assert!(matches!(decode_with(b"llleee", config), Err(DecodeError::NestingTooDeep { limit: 2 })));

        let hostile = vec![b'l'; 100_000];
        assert!(matches!(decode(&hostile), Err(DecodeError::NestingTooDeep { .. })));
    }

    #[test]
    pub fn depth_restarts_after_failed_value() {
        let config = DecoderConfig::default().with_max_depth(2);
        let mut decoder = BDecoder::with_source(SliceSource::new(b"llxlli1ee"), config);
        assert!(matches!(decoder.decode(), Err(DecodeError::Syntax { position: 2, found: b'x', .. })));

        decoder.source.advance();
        let inner = Value::List(vec![Value::Integer(1)]);
        assert_eq!(Value::List(vec![inner]), decoder.decode().unwrap());
        assert!(decoder.finish().is_ok());
    }

    #[test]
    pub fn reader_leaves_stream_after_value() {
        let mut reader: &[u8] = b"i1e4:spamle";
        assert_eq!(Value::Integer(1), decode_from(&mut reader).unwrap());
        assert_eq!(b"4:spamle", reader);
        assert_eq!(Value::from("spam"), decode_from(&mut reader).unwrap());
        assert_eq!(Value::List(vec![]), decode_from(&mut reader).unwrap());
        assert!(matches!(decode_from(&mut reader), Err(DecodeError::UnexpectedEof { position: 0 })));
    }

    #[test]
    pub fn reader_across_buffer_boundaries() {
        let input = b"d4:name11:example.txt6:lengthi1024e5:piece26:abcdefghijklmnopqrstuvwxyze";
        let reader = BufReader::with_capacity(2, &input[..]);
        let mut decoder = BDecoder::from_reader(reader);
        let value = decoder.decode().unwrap();
        assert_eq!(input.len(), decoder.position());
        assert_eq!(value, decode(input).unwrap());
        assert_eq!(Some("abcdefghijklmnopqrstuvwxyz"), value.get(b"piece").and_then(Value::as_str));
    }

    #[test]
    pub fn reader_truncated_string() {
        let reader = BufReader::with_capacity(4, &b"10:abc"[..]);
        assert!(matches!(decode_from(reader), Err(DecodeError::UnexpectedEof { position: 6 })));
    }
}
