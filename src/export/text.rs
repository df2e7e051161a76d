//! Line-oriented text form.
//!
//! ```text
//! //Format: add_item\item_id\editable_type\...
//! //NOTE: ...
//!
//! version\18
//! itemCount\2
//!
//! add_item\0\0\...
//! add_item\1\0\...
//! ```

use std::io::{Read, Write};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};

use crate::item::schema::exported_fields;
use crate::item::{FieldDef, FieldKind, Item, ItemDatabase};

pub const DELIMITER: char = '\\';

const VERSION_TAG: &str = "version";
const ITEM_COUNT_TAG: &str = "itemCount";
const ITEM_TAG: &str = "add_item";

pub fn write<W: Write>(db: &ItemDatabase, mut out: W) -> Result<()> {
    let sep = DELIMITER.to_string();
    let names: Vec<&str> = exported_fields(db.format_version)
        .map(|def| def.name)
        .collect();

    writeln!(out, "//Format: {}{}{}", ITEM_TAG, sep, names.join(sep.as_str()))?;
    writeln!(out, "//NOTE: break_hits values ending in 'r' are raw.")?;
    writeln!(out, "//Example: 184r")?;
    writeln!(
        out,
        "//A raw value is stored as written. Any other value is multiplied by 6 when encoding."
    )?;
    writeln!(
        out,
        "//Text fields escape '%', '\\' and non-printable bytes as %XX."
    )?;
    writeln!(out)?;
    writeln!(out, "{}{}{}", VERSION_TAG, sep, db.format_version)?;
    writeln!(out, "{}{}{}", ITEM_COUNT_TAG, sep, db.item_count)?;
    writeln!(out)?;

    for item in &db.items {
        let values: Vec<String> = item
            .exported_values(db.format_version)
            .into_iter()
            .map(|(_, value)| value.map(|v| v.to_text()).unwrap_or_default())
            .collect();
        writeln!(out, "{}{}{}", ITEM_TAG, sep, values.join(sep.as_str()))?;
    }

    out.flush()?;
    Ok(())
}

pub fn to_string(db: &ItemDatabase) -> Result<String> {
    let mut buffer = Vec::new();
    write(db, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn read<R: Read>(input: R) -> Result<ItemDatabase> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER as u8)
        .has_headers(false)
        .comment(Some(b'/'))
        .flexible(true)
        .quoting(false)
        .from_reader(input);

    let mut format_version: Option<u16> = None;
    let mut item_count: Option<u32> = None;
    let mut items = Vec::new();

    for result in reader.records() {
        let record = result.context("Failed to read text record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match record.get(0).unwrap_or("").trim() {
            "" => continue,
            VERSION_TAG => {
                format_version = Some(
                    header_value(&record)
                        .with_context(|| format!("line {}: bad {} line", line, VERSION_TAG))?,
                );
            }
            ITEM_COUNT_TAG => {
                item_count = Some(
                    header_value(&record)
                        .with_context(|| format!("line {}: bad {} line", line, ITEM_COUNT_TAG))?,
                );
            }
            ITEM_TAG => {
                let version = format_version
                    .ok_or_else(|| anyhow!("line {}: {} before {} line", line, ITEM_TAG, VERSION_TAG))?;
                let item = parse_item(&record, version)
                    .with_context(|| format!("line {}: item {}", line, items.len()))?;
                items.push(item);
            }
            other => bail!("line {}: unknown line tag `{}`", line, other),
        }
    }

    Ok(ItemDatabase {
        format_version: format_version.context("missing version line")?,
        item_count: item_count.context("missing itemCount line")?,
        items,
    })
}

pub fn from_str(text: &str) -> Result<ItemDatabase> {
    read(text.as_bytes())
}

fn header_value<T: std::str::FromStr>(record: &csv::StringRecord) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if record.len() != 2 {
        bail!("expected 2 fields, found {}", record.len());
    }
    Ok(record[1].trim().parse::<T>()?)
}

/// Rebuild an item through serde so field typing lives in one place.
fn parse_item(record: &csv::StringRecord, format_version: u16) -> Result<Item> {
    let defs: Vec<&FieldDef> = exported_fields(format_version).collect();
    let found = record.len().saturating_sub(1);
    if found != defs.len() {
        bail!(
            "expected {} fields for format version {}, found {}",
            defs.len(),
            format_version,
            found
        );
    }

    let mut object = Map::new();
    for (def, text) in defs.iter().zip(record.iter().skip(1)) {
        let value = text_to_json(def, text).with_context(|| format!("field `{}`", def.name))?;
        object.insert(def.name.to_string(), value);
    }

    serde_json::from_value(Value::Object(object)).context("Failed to build item")
}

fn text_to_json(def: &FieldDef, text: &str) -> Result<Value> {
    let value = match def.kind {
        FieldKind::U8 | FieldKind::U16 | FieldKind::I32 => Value::from(text.trim().parse::<i64>()?),
        FieldKind::Color => {
            let parts = text
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<u8>, _>>()?;
            let [a, r, g, b] = parts[..] else {
                bail!("expected a,r,g,b, found `{}`", text);
            };
            serde_json::json!({ "a": a, "r": r, "g": g, "b": b })
        }
        FieldKind::Bytes
        | FieldKind::CipheredBytes
        | FieldKind::BreakHits
        | FieldKind::Opaque(_) => Value::String(text.to_string()),
        FieldKind::Reserved(_) => Value::Null,
    };
    Ok(value)
}
