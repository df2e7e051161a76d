use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Suffix marking a breakHits value as stored unscaled.
pub const RAW_MARKER: char = 'r';

/// Multiplier applied to scaled breakHits values on the wire.
const BREAK_HITS_SCALE: u8 = 6;

// ============================================================================
// ByteString
// ============================================================================

/// Length-prefixed field content. Not guaranteed to be text.
///
/// Rendered for export with a reversible escape: printable ASCII other than
/// `%` and `\` is kept as-is, every other byte becomes `%XX`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteString(Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid escape at character {position}: expected `%` followed by two hex digits")]
pub struct EscapeError {
    pub position: usize,
}

impl ByteString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Escaped text form used by the JSON and text adapters.
    pub fn to_escaped(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for &b in &self.0 {
            if (0x20..=0x7E).contains(&b) && b != b'%' && b != b'\\' {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{:02X}", b));
            }
        }
        out
    }

    /// Inverse of [`ByteString::to_escaped`].
    ///
    /// Characters outside ASCII are taken as their UTF-8 bytes so hand-edited
    /// documents don't need to escape them.
    pub fn from_escaped(text: &str) -> Result<Self, EscapeError> {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let byte = bytes
                    .get(i + 1..i + 3)
                    .filter(|pair| pair.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|pair| std::str::from_utf8(pair).ok())
                    .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                    .ok_or(EscapeError { position: i })?;
                out.push(byte);
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        Ok(Self(out))
    }
}

impl From<&str> for ByteString {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_escaped())
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_escaped())
    }
}

impl Serialize for ByteString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_escaped())
    }
}

impl<'de> Deserialize<'de> for ByteString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EscapedVisitor;

        impl Visitor<'_> for EscapedVisitor {
            type Value = ByteString;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a %XX-escaped byte string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<ByteString, E> {
                ByteString::from_escaped(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(EscapedVisitor)
    }
}

// ============================================================================
// HexBlock
// ============================================================================

/// Fixed-width opaque region, held as space-separated uppercase hex pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexBlock(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("`{0}` is not a hex byte")]
    InvalidToken(String),

    #[error("expected {expected} bytes, found {found}")]
    WrongLength { expected: usize, found: usize },
}

impl HexBlock {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let pairs: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        Self(pairs.join(" "))
    }

    /// All-zero block of `width` bytes.
    pub fn zeroed(width: usize) -> Self {
        Self::from_bytes(&vec![0u8; width])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse back to exactly `width` bytes.
    pub fn to_bytes(&self, width: usize) -> Result<Vec<u8>, HexError> {
        let mut bytes = Vec::with_capacity(width);
        for token in self.0.split_whitespace() {
            if token.len() > 2 || !token.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(HexError::InvalidToken(token.to_string()));
            }
            let byte = u8::from_str_radix(token, 16)
                .map_err(|_| HexError::InvalidToken(token.to_string()))?;
            bytes.push(byte);
        }

        if bytes.len() != width {
            return Err(HexError::WrongLength {
                expected: width,
                found: bytes.len(),
            });
        }
        Ok(bytes)
    }
}

impl From<String> for HexBlock {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for HexBlock {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// BreakHits
// ============================================================================

/// Legacy textual breakHits value.
///
/// A stored byte divisible by 6 is shown divided by 6 (`"2"` for 12). Any
/// other byte is shown as-is with the raw marker (`"13r"`). A raw byte that
/// happens to be a multiple of 6 therefore loses its marker on decode; the
/// byte still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakHits(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakHitsError {
    #[error("`{0}` is not a break hits count")]
    NotANumber(String),

    #[error("`{0}` does not fit in a byte once stored")]
    OutOfRange(String),
}

impl BreakHits {
    pub fn from_stored(byte: u8) -> Self {
        if byte % BREAK_HITS_SCALE != 0 {
            Self(format!("{}{}", byte, RAW_MARKER))
        } else {
            Self((byte / BREAK_HITS_SCALE).to_string())
        }
    }

    /// Logical count, stored multiplied by 6.
    pub fn scaled(hits: u8) -> Self {
        Self(hits.to_string())
    }

    /// Stored byte written verbatim.
    pub fn raw(byte: u8) -> Self {
        Self(format!("{}{}", byte, RAW_MARKER))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_raw(&self) -> bool {
        self.0.ends_with(RAW_MARKER)
    }

    pub fn to_stored(&self) -> Result<u8, BreakHitsError> {
        let (digits, raw) = match self.0.strip_suffix(RAW_MARKER) {
            Some(digits) => (digits, true),
            None => (self.0.as_str(), false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BreakHitsError::NotANumber(self.0.clone()));
        }
        let value: u32 = digits
            .parse()
            .map_err(|_| BreakHitsError::OutOfRange(self.0.clone()))?;

        let stored = if raw {
            value
        } else {
            value.saturating_mul(u32::from(BREAK_HITS_SCALE))
        };
        u8::try_from(stored).map_err(|_| BreakHitsError::OutOfRange(self.0.clone()))
    }
}

impl Default for BreakHits {
    fn default() -> Self {
        Self::from_stored(0)
    }
}

impl From<&str> for BreakHits {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BreakHits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_break_hits_scaled_branch() {
        assert_eq!(BreakHits::from_stored(12).as_str(), "2");
        assert_eq!(BreakHits::from_stored(0).as_str(), "0");
        assert_eq!(BreakHits::from("2").to_stored(), Ok(12));
    }

    #[test]
    fn test_break_hits_raw_branch() {
        let hits = BreakHits::from_stored(13);
        assert_eq!(hits.as_str(), "13r");
        assert!(hits.is_raw());
        assert_eq!(hits.to_stored(), Ok(13));
    }

    #[test]
    fn test_raw_multiple_of_six_loses_marker() {
        // Written raw, read back scaled: same byte, different text.
        let written = BreakHits::raw(18).to_stored().unwrap();
        assert_eq!(written, 18);
        assert_eq!(BreakHits::from_stored(written).as_str(), "3");
    }

    #[test]
    fn test_break_hits_rejects_garbage() {
        assert!(matches!(
            BreakHits::from("abc").to_stored(),
            Err(BreakHitsError::NotANumber(_))
        ));
        assert!(matches!(
            BreakHits::from("r").to_stored(),
            Err(BreakHitsError::NotANumber(_))
        ));
        assert!(matches!(
            BreakHits::from("-1").to_stored(),
            Err(BreakHitsError::NotANumber(_))
        ));
        assert!(matches!(
            BreakHits::from("43").to_stored(),
            Err(BreakHitsError::OutOfRange(_))
        ));
        assert!(matches!(
            BreakHits::from("256r").to_stored(),
            Err(BreakHitsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_hex_block_format() {
        let block = HexBlock::from_bytes(&[0x00, 0x0A, 0xFF]);
        assert_eq!(block.as_str(), "00 0A FF");
        assert_eq!(block.to_bytes(3), Ok(vec![0x00, 0x0A, 0xFF]));
    }

    #[test]
    fn test_hex_block_errors() {
        assert_eq!(
            HexBlock::from("00 ZZ").to_bytes(2),
            Err(HexError::InvalidToken("ZZ".to_string()))
        );
        assert_eq!(
            HexBlock::from("+F").to_bytes(1),
            Err(HexError::InvalidToken("+F".to_string()))
        );
        assert_eq!(
            HexBlock::from("00 01").to_bytes(3),
            Err(HexError::WrongLength {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            HexBlock::from("").to_bytes(13),
            Err(HexError::WrongLength {
                expected: 13,
                found: 0
            })
        );
    }

    #[test]
    fn test_byte_string_escape() {
        let s = ByteString::new(vec![b'D', b'i', b'r', b't', b'%', b'\\', 0x00, 0xE9]);
        assert_eq!(s.to_escaped(), "Dirt%25%5C%00%E9");
        assert_eq!(ByteString::from_escaped("Dirt%25%5C%00%E9"), Ok(s));
    }

    #[test]
    fn test_byte_string_accepts_literal_utf8() {
        let s = ByteString::from_escaped("é").unwrap();
        assert_eq!(s.as_bytes(), "é".as_bytes());
    }

    #[test]
    fn test_byte_string_bad_escape() {
        assert_eq!(
            ByteString::from_escaped("ab%4"),
            Err(EscapeError { position: 2 })
        );
        assert_eq!(
            ByteString::from_escaped("%G0"),
            Err(EscapeError { position: 0 })
        );
    }

    #[test]
    fn test_byte_string_json() {
        let s = ByteString::from("blocks.rttex");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"blocks.rttex\"");
        let back: ByteString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    proptest! {
        #[test]
        fn break_hits_inverse(byte in any::<u8>()) {
            let hits = BreakHits::from_stored(byte);
            prop_assert_eq!(hits.is_raw(), byte % 6 != 0);
            prop_assert_eq!(hits.to_stored(), Ok(byte));
        }

        #[test]
        fn hex_block_inverse(bytes in proptest::collection::vec(any::<u8>(), 0..100)) {
            let block = HexBlock::from_bytes(&bytes);
            prop_assert_eq!(block.to_bytes(bytes.len()), Ok(bytes));
        }

        #[test]
        fn byte_string_escape_inverse(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let s = ByteString::new(bytes);
            let escaped = s.to_escaped();
            prop_assert!(!escaped.contains('\\'));
            prop_assert_eq!(ByteString::from_escaped(&escaped), Ok(s));
        }
    }
}
