use anyhow::{Context, Result};

use crate::item::ItemDatabase;

/// Pretty-printed JSON mirroring the model field for field.
pub fn to_string(db: &ItemDatabase) -> Result<String> {
    serde_json::to_string_pretty(db).context("Failed to serialize item database")
}

pub fn from_str(text: &str) -> Result<ItemDatabase> {
    serde_json::from_str(text).context("Failed to parse item database JSON")
}
