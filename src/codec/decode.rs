use crate::codec::cipher;
use crate::codec::cursor::ByteCursor;
use crate::codec::error::{CodecError, Result};
use crate::codec::{Header, HEADER_LEN};
use crate::item::{BreakHits, ByteString, Color, FieldId, HexBlock, Item, ItemDatabase};

use FieldId as F;

/// Read only the 6-byte header.
pub fn read_header(data: &[u8]) -> Result<Header> {
    if data.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader { offset: data.len() });
    }

    Ok(Header {
        format_version: u16::from_be_bytes([data[0], data[1]]),
        item_count: u32::from_be_bytes([data[2], data[3], data[4], data[5]]),
    })
}

/// Decode a complete items.dat buffer.
///
/// Records are variable-length, so each one starts where the previous one
/// ended and the walk is strictly sequential. Bytes after the last declared
/// record are ignored.
pub fn decode(data: &[u8]) -> Result<ItemDatabase> {
    let header = read_header(data)?;

    let mut cursor = ByteCursor::at(data, HEADER_LEN);

    // Cap the preallocation; the count comes from untrusted input.
    let capacity = (header.item_count as usize).min(cursor.remaining() / MIN_RECORD_LEN + 1);
    let mut items = Vec::with_capacity(capacity);

    for item_index in 0..header.item_count as usize {
        cursor.begin_item(item_index);
        items.push(read_item(&mut cursor, header.format_version)?);
    }

    Ok(ItemDatabase {
        format_version: header.format_version,
        item_count: header.item_count,
        items,
    })
}

/// Smallest possible record: a base-schema item with every string empty.
const MIN_RECORD_LEN: usize = 163;

fn read_item(c: &mut ByteCursor<'_>, version: u16) -> Result<Item> {
    let item_id = c.read_i32(F::ItemId)?;
    let editable_type = c.read_u8(F::EditableType)?;
    let item_category = c.read_u8(F::ItemCategory)?;
    let action_type = c.read_u8(F::ActionType)?;
    let hit_sound_type = c.read_u8(F::HitSoundType)?;
    let name = ByteString::new(cipher::apply(c.read_prefixed(F::Name)?, item_id));
    let texture = read_bytes(c, F::Texture)?;
    let texture_hash = c.read_i32(F::TextureHash)?;
    let item_kind = c.read_u8(F::ItemKind)?;
    let value1 = c.read_i32(F::Value1)?;
    let texture_x = c.read_u8(F::TextureX)?;
    let texture_y = c.read_u8(F::TextureY)?;
    let spread_type = c.read_u8(F::SpreadType)?;
    let is_stripey_wallpaper = c.read_u8(F::IsStripeyWallpaper)?;
    let collision_type = c.read_u8(F::CollisionType)?;
    let break_hits = BreakHits::from_stored(c.read_u8(F::BreakHits)?);
    let drop_chance = c.read_i32(F::DropChance)?;
    let clothing_type = c.read_u8(F::ClothingType)?;
    let rarity = c.read_u16(F::Rarity)?;
    let max_amount = c.read_u8(F::MaxAmount)?;
    let extra_file = read_bytes(c, F::ExtraFile)?;
    let extra_file_hash = c.read_i32(F::ExtraFileHash)?;
    let audio_volume = c.read_i32(F::AudioVolume)?;
    let pet_name = read_bytes(c, F::PetName)?;
    let pet_prefix = read_bytes(c, F::PetPrefix)?;
    let pet_suffix = read_bytes(c, F::PetSuffix)?;
    let pet_ability = read_bytes(c, F::PetAbility)?;
    let seed_base = c.read_u8(F::SeedBase)?;
    let seed_overlay = c.read_u8(F::SeedOverlay)?;
    let tree_base = c.read_u8(F::TreeBase)?;
    let tree_leaves = c.read_u8(F::TreeLeaves)?;
    let seed_color = read_color(c, F::SeedColor)?;
    let seed_overlay_color = read_color(c, F::SeedOverlayColor)?;
    // Ingredient block is not kept; the encoder writes zeros.
    c.skip(4, F::Ingredients)?;
    let grow_time = c.read_i32(F::GrowTime)?;
    let value2 = c.read_u16(F::Value2)?;
    let special_variant = c.read_u16(F::SpecialVariant)?;
    let extra_options = read_bytes(c, F::ExtraOptions)?;
    let texture2 = read_bytes(c, F::Texture2)?;
    let extra_options2 = read_bytes(c, F::ExtraOptions2)?;
    let raw_block_80 = read_block(c, F::RawBlock80)?;

    let gate = |id: FieldId| id.present_in(version);

    let punch_options = gate(F::PunchOptions)
        .then(|| read_bytes(c, F::PunchOptions))
        .transpose()?;
    let raw_block_v12 = gate(F::RawBlockV12)
        .then(|| read_block(c, F::RawBlockV12))
        .transpose()?;
    let int_v13 = gate(F::IntV13).then(|| c.read_i32(F::IntV13)).transpose()?;
    let int_v14 = gate(F::IntV14).then(|| c.read_i32(F::IntV14)).transpose()?;
    let raw_block_v15 = gate(F::RawBlockV15)
        .then(|| read_block(c, F::RawBlockV15))
        .transpose()?;
    let str_v15 = gate(F::StrV15)
        .then(|| read_bytes(c, F::StrV15))
        .transpose()?;
    let str_v16 = gate(F::StrV16)
        .then(|| read_bytes(c, F::StrV16))
        .transpose()?;
    let int_v17 = gate(F::IntV17).then(|| c.read_i32(F::IntV17)).transpose()?;
    let int_v18 = gate(F::IntV18).then(|| c.read_i32(F::IntV18)).transpose()?;

    Ok(Item {
        item_id,
        editable_type,
        item_category,
        action_type,
        hit_sound_type,
        name,
        texture,
        texture_hash,
        item_kind,
        value1,
        texture_x,
        texture_y,
        spread_type,
        is_stripey_wallpaper,
        collision_type,
        break_hits,
        drop_chance,
        clothing_type,
        rarity,
        max_amount,
        extra_file,
        extra_file_hash,
        audio_volume,
        pet_name,
        pet_prefix,
        pet_suffix,
        pet_ability,
        seed_base,
        seed_overlay,
        tree_base,
        tree_leaves,
        seed_color,
        seed_overlay_color,
        grow_time,
        value2,
        special_variant,
        extra_options,
        texture2,
        extra_options2,
        raw_block_80,
        punch_options,
        raw_block_v12,
        int_v13,
        int_v14,
        raw_block_v15,
        str_v15,
        str_v16,
        int_v17,
        int_v18,
    })
}

fn read_bytes(c: &mut ByteCursor<'_>, field: FieldId) -> Result<ByteString> {
    c.read_prefixed(field).map(ByteString::from_slice)
}

fn read_color(c: &mut ByteCursor<'_>, field: FieldId) -> Result<Color> {
    let bytes = c.take(4, field)?;
    Ok(Color {
        a: bytes[0],
        r: bytes[1],
        g: bytes[2],
        b: bytes[3],
    })
}

fn read_block(c: &mut ByteCursor<'_>, field: FieldId) -> Result<HexBlock> {
    let width = field.kind().fixed_width().unwrap_or(0);
    c.take(width, field).map(HexBlock::from_bytes)
}
