//! File-level conversion between items.dat and its editable forms.

pub mod json;
pub mod text;

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::codec::{self, Header};
use crate::item::ItemDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Binary items.dat
    Dat,
    Json,
    /// Backslash-delimited `add_item` lines
    Text,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("dat") => Ok(Format::Dat),
            Some("json") => Ok(Format::Json),
            Some("txt") => Ok(Format::Text),
            _ => bail!(
                "Cannot infer format of {} (expected .dat, .json or .txt)",
                path.display()
            ),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Dat => "dat",
            Format::Json => "json",
            Format::Text => "txt",
        }
    }
}

pub fn from_bytes(bytes: &[u8], format: Format) -> Result<ItemDatabase> {
    match format {
        Format::Dat => Ok(codec::decode(bytes)?),
        Format::Json => json::from_str(std::str::from_utf8(bytes)?),
        Format::Text => text::read(bytes),
    }
}

pub fn to_bytes(db: &ItemDatabase, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Dat => Ok(codec::encode(db)?),
        Format::Json => json::to_string(db).map(String::into_bytes),
        Format::Text => text::to_string(db).map(String::into_bytes),
    }
}

/// Load a database, picking the format from the file extension.
pub fn load(path: &Path) -> Result<ItemDatabase> {
    let format = Format::from_path(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), len = bytes.len(), ?format, "read input");

    let db = from_bytes(&bytes, format)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::info!(
        "Loaded {} items (format version {}) from {}",
        db.items.len(),
        db.format_version,
        path.display()
    );
    Ok(db)
}

pub fn save(db: &ItemDatabase, path: &Path) -> Result<()> {
    let format = Format::from_path(path)?;
    let bytes = to_bytes(db, format)
        .with_context(|| format!("Failed to encode {}", path.display()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(
        "Wrote {} items ({} bytes) to {}",
        db.items.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// What `info` reports about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub format: Format,
    pub byte_len: usize,
    pub header: Header,
    pub tail_fields: Vec<&'static str>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format:         {}", self.format.extension())?;
        writeln!(f, "bytes:          {}", self.byte_len)?;
        writeln!(f, "format version: {}", self.header.format_version)?;
        writeln!(f, "item count:     {}", self.header.item_count)?;
        if self.tail_fields.is_empty() {
            write!(f, "tail fields:    (none)")
        } else {
            write!(f, "tail fields:    {}", self.tail_fields.join(", "))
        }
    }
}

/// Summarize a file. Binary files only have their header read.
pub fn summarize(path: &Path) -> Result<Summary> {
    let format = Format::from_path(path)?;
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let header = match format {
        Format::Dat => codec::read_header(&bytes)?,
        Format::Json | Format::Text => {
            let db = from_bytes(&bytes, format)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Header {
                format_version: db.format_version,
                item_count: db.item_count,
            }
        }
    };

    Ok(Summary {
        format,
        byte_len: bytes.len(),
        header,
        tail_fields: ItemDatabase::new(header.format_version, vec![]).tail_fields(),
    })
}
