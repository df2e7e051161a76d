use thiserror::Error;

use crate::item::fields::{BreakHitsError, HexError};
use crate::item::FieldId;

/// Codec error types
#[derive(Debug, Error)]
pub enum CodecError {
    /// Fewer than the six header bytes are available
    #[error("truncated header: file ends at offset {offset}")]
    TruncatedHeader { offset: usize },

    /// A read inside a record would run past the end of the buffer
    #[error("truncated input in item {item_index} reading `{field}` at offset {offset}")]
    TruncatedInput {
        item_index: usize,
        field: FieldId,
        offset: usize,
    },

    #[error("declared item count {declared} does not match {actual} items")]
    ItemCountMismatch { declared: u32, actual: usize },

    #[error("item {item_index}: `{field}` is {len} bytes, longer than a u16 length prefix allows")]
    FieldTooLong {
        item_index: usize,
        field: FieldId,
        len: usize,
    },

    #[error("item {item_index}: `{field}` is required by format version {format_version}")]
    MissingTailField {
        item_index: usize,
        field: FieldId,
        format_version: u16,
    },

    #[error("item {item_index}: `{field}` does not exist in format version {format_version}")]
    UnexpectedTailField {
        item_index: usize,
        field: FieldId,
        format_version: u16,
    },

    #[error("item {item_index}: invalid hex in `{field}`")]
    InvalidOpaqueEncoding {
        item_index: usize,
        field: FieldId,
        #[source]
        reason: HexError,
    },

    #[error("item {item_index}: invalid break_hits")]
    InvalidLegacyField {
        item_index: usize,
        #[source]
        reason: BreakHitsError,
    },

    /// Precomputed record size disagreed with the bytes written
    #[error("item {item_index}: encoded size differs from its precomputed size")]
    SizeMismatch { item_index: usize },
}

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
