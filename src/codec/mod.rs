//! items.dat binary codec.
//!
//! # File Format
//! Big-endian throughout:
//! - 2 bytes: format version
//! - 4 bytes: declared item count
//! - that many variable-length item records, fields in `ITEM_FIELDS` order,
//!   version-gated fields appended per the format version
//!
//! # Example
//! ```
//! use items_dat_lib::codec::{decode, encode};
//! use items_dat_lib::item::{ByteString, Item, ItemDatabase};
//!
//! let mut dirt = Item::empty(2, 11);
//! dirt.name = ByteString::from("Dirt");
//! let db = ItemDatabase::new(11, vec![dirt]);
//!
//! let bytes = encode(&db).unwrap();
//! assert_eq!(decode(&bytes).unwrap(), db);
//! ```

pub mod cipher;
mod cursor;
mod decode;
mod encode;
mod error;

pub use cursor::ByteCursor;
pub use decode::{decode, read_header};
pub use encode::{encode, encoded_len};
pub use error::{CodecError, Result};

/// Size of the version + item count header
pub const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format_version: u16,
    pub item_count: u32,
}

/// Offset of the first byte where `a` and `b` differ, including a length
/// difference.
pub fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b.iter())
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}
