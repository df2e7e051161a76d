use std::io::Write;

use rayon::prelude::*;

use crate::codec::cipher;
use crate::codec::error::{CodecError, Result};
use crate::codec::HEADER_LEN;
use crate::item::schema::wire_fields;
use crate::item::{FieldDef, FieldId, FieldKind, FieldValue, Item, ItemDatabase, ITEM_FIELDS};

/// Encode a database into the items.dat layout.
///
/// Each record's size depends only on its own fields, so sizes are computed
/// up front, prefix-summed into disjoint regions of one output buffer, and
/// every region is filled independently. When several records are invalid the
/// lowest item index is reported.
pub fn encode(db: &ItemDatabase) -> Result<Vec<u8>> {
    if db.item_count as usize != db.items.len() {
        return Err(CodecError::ItemCountMismatch {
            declared: db.item_count,
            actual: db.items.len(),
        });
    }

    let version = db.format_version;

    let lengths = db
        .items
        .par_iter()
        .enumerate()
        .map(|(item_index, item)| record_len(item, version, item_index))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<Vec<usize>>>()?;

    let total = HEADER_LEN + lengths.iter().sum::<usize>();
    let mut out = vec![0u8; total];

    let (header, mut rest) = out.split_at_mut(HEADER_LEN);
    header[..2].copy_from_slice(&version.to_be_bytes());
    header[2..].copy_from_slice(&db.item_count.to_be_bytes());

    let mut regions = Vec::with_capacity(lengths.len());
    for &len in &lengths {
        let (region, tail) = std::mem::take(&mut rest).split_at_mut(len);
        regions.push(region);
        rest = tail;
    }

    regions
        .into_par_iter()
        .zip(db.items.par_iter())
        .enumerate()
        .map(|(item_index, (region, item))| write_region(region, item, version, item_index))
        .collect::<Vec<_>>()
        .into_iter()
        .collect::<Result<()>>()?;

    Ok(out)
}

/// Wire size of one record under `format_version`.
pub fn encoded_len(item: &Item, format_version: u16) -> Result<usize> {
    record_len(item, format_version, 0)
}

fn record_len(item: &Item, version: u16, item_index: usize) -> Result<usize> {
    check_tail_fields(item, version, item_index)?;

    let mut len = 0;
    for def in wire_fields(version) {
        len += match def.kind.fixed_width() {
            Some(width) => width,
            None => 2 + prefixed_len(item, def, version, item_index)?,
        };
    }
    Ok(len)
}

fn prefixed_len(item: &Item, def: &FieldDef, version: u16, item_index: usize) -> Result<usize> {
    match item.field(def.id) {
        Some(FieldValue::Bytes(bytes)) if bytes.len() > u16::MAX as usize => {
            Err(CodecError::FieldTooLong {
                item_index,
                field: def.id,
                len: bytes.len(),
            })
        }
        Some(FieldValue::Bytes(bytes)) => Ok(bytes.len()),
        Some(_) => Ok(0),
        None => Err(CodecError::MissingTailField {
            item_index,
            field: def.id,
            format_version: version,
        }),
    }
}

/// Gated fields must be present exactly when the version carries them.
fn check_tail_fields(item: &Item, version: u16, item_index: usize) -> Result<()> {
    for def in ITEM_FIELDS.iter().filter(|def| def.is_gated()) {
        match (def.present_in(version), item.field(def.id).is_some()) {
            (true, false) => {
                return Err(CodecError::MissingTailField {
                    item_index,
                    field: def.id,
                    format_version: version,
                })
            }
            (false, true) => {
                return Err(CodecError::UnexpectedTailField {
                    item_index,
                    field: def.id,
                    format_version: version,
                })
            }
            _ => {}
        }
    }
    Ok(())
}

fn write_region(region: &mut [u8], item: &Item, version: u16, item_index: usize) -> Result<()> {
    let mut writer = RecordWriter::new(region, item_index);
    write_record(&mut writer, item, version)?;

    if !writer.out.is_empty() {
        return Err(CodecError::SizeMismatch { item_index });
    }
    Ok(())
}

/// Write one record, walking `ITEM_FIELDS` in wire order.
pub(crate) fn write_record<W: Write>(
    w: &mut RecordWriter<W>,
    item: &Item,
    version: u16,
) -> Result<()> {
    for def in wire_fields(version) {
        let value = item.field(def.id).ok_or(CodecError::MissingTailField {
            item_index: w.item_index,
            field: def.id,
            format_version: version,
        })?;

        match value {
            FieldValue::U8(v) => w.put(&[v])?,
            FieldValue::U16(v) => w.put(&v.to_be_bytes())?,
            FieldValue::I32(v) => w.put(&v.to_be_bytes())?,
            FieldValue::Bytes(bytes) if def.kind == FieldKind::CipheredBytes => {
                w.put_prefixed(&cipher::apply(bytes.as_bytes(), item.item_id), def.id)?
            }
            FieldValue::Bytes(bytes) => w.put_prefixed(bytes.as_bytes(), def.id)?,
            FieldValue::Color(c) => w.put(&[c.a, c.r, c.g, c.b])?,
            FieldValue::BreakHits(hits) => {
                let byte = hits
                    .to_stored()
                    .map_err(|reason| CodecError::InvalidLegacyField {
                        item_index: w.item_index,
                        reason,
                    })?;
                w.put(&[byte])?
            }
            FieldValue::Opaque(block) => {
                let width = def.kind.fixed_width().unwrap_or(0);
                let bytes = block
                    .to_bytes(width)
                    .map_err(|reason| CodecError::InvalidOpaqueEncoding {
                        item_index: w.item_index,
                        field: def.id,
                        reason,
                    })?;
                w.put(&bytes)?
            }
            FieldValue::Reserved => {
                let width = def.kind.fixed_width().unwrap_or(0);
                w.put(&vec![0u8; width])?
            }
        }
    }
    Ok(())
}

/// Big-endian record writer. A short sink surfaces as `SizeMismatch`.
pub(crate) struct RecordWriter<W: Write> {
    out: W,
    item_index: usize,
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(out: W, item_index: usize) -> Self {
        Self { out, item_index }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.out
            .write_all(bytes)
            .map_err(|_| CodecError::SizeMismatch {
                item_index: self.item_index,
            })
    }

    fn put_prefixed(&mut self, bytes: &[u8], field: FieldId) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| CodecError::FieldTooLong {
            item_index: self.item_index,
            field,
            len: bytes.len(),
        })?;
        self.put(&len.to_be_bytes())?;
        self.put(bytes)
    }
}
