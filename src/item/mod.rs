pub mod fields;
pub mod schema;

use serde::{Deserialize, Serialize};

pub use fields::{BreakHits, ByteString, HexBlock};
pub use schema::{FieldDef, FieldId, FieldKind, FieldValue, ITEM_FIELDS};

/// Decoded items.dat: header plus every record in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDatabase {
    pub format_version: u16,
    /// Count as stored in the header. Must equal `items.len()` to encode.
    pub item_count: u32,
    pub items: Vec<Item>,
}

impl ItemDatabase {
    /// Build a database whose declared count matches `items`.
    pub fn new(format_version: u16, items: Vec<Item>) -> Self {
        Self {
            format_version,
            item_count: items.len() as u32,
            items,
        }
    }

    /// Names of the version-gated fields this database carries.
    pub fn tail_fields(&self) -> Vec<&'static str> {
        ITEM_FIELDS
            .iter()
            .filter(|def| def.is_gated() && def.present_in(self.format_version))
            .map(|def| def.name)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One item record. Field order matches the wire order in `ITEM_FIELDS`.
///
/// Version-gated fields are `None` below their gate and `Some` at or above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: i32,
    pub editable_type: u8,
    pub item_category: u8,
    pub action_type: u8,
    pub hit_sound_type: u8,
    /// Plain bytes; ciphered only on the wire
    pub name: ByteString,
    pub texture: ByteString,
    pub texture_hash: i32,
    pub item_kind: u8,
    pub value1: i32,
    pub texture_x: u8,
    pub texture_y: u8,
    pub spread_type: u8,
    pub is_stripey_wallpaper: u8,
    pub collision_type: u8,
    pub break_hits: BreakHits,
    pub drop_chance: i32,
    pub clothing_type: u8,
    pub rarity: u16,
    pub max_amount: u8,
    pub extra_file: ByteString,
    pub extra_file_hash: i32,
    pub audio_volume: i32,
    pub pet_name: ByteString,
    pub pet_prefix: ByteString,
    pub pet_suffix: ByteString,
    pub pet_ability: ByteString,
    pub seed_base: u8,
    pub seed_overlay: u8,
    pub tree_base: u8,
    pub tree_leaves: u8,
    pub seed_color: Color,
    pub seed_overlay_color: Color,
    pub grow_time: i32,
    pub value2: u16,
    pub special_variant: u16,
    pub extra_options: ByteString,
    pub texture2: ByteString,
    pub extra_options2: ByteString,
    pub raw_block_80: HexBlock,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punch_options: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_block_v12: Option<HexBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_v13: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_v14: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_block_v15: Option<HexBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub str_v15: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub str_v16: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_v17: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_v18: Option<i32>,
}

impl Item {
    /// Zero-valued item that encodes cleanly under `format_version`.
    pub fn empty(item_id: i32, format_version: u16) -> Self {
        let gate = |id: FieldId| id.present_in(format_version);
        let block = |id: FieldId| match id.kind() {
            FieldKind::Opaque(width) => HexBlock::zeroed(width),
            _ => HexBlock::default(),
        };

        Self {
            item_id,
            editable_type: 0,
            item_category: 0,
            action_type: 0,
            hit_sound_type: 0,
            name: ByteString::default(),
            texture: ByteString::default(),
            texture_hash: 0,
            item_kind: 0,
            value1: 0,
            texture_x: 0,
            texture_y: 0,
            spread_type: 0,
            is_stripey_wallpaper: 0,
            collision_type: 0,
            break_hits: BreakHits::default(),
            drop_chance: 0,
            clothing_type: 0,
            rarity: 0,
            max_amount: 0,
            extra_file: ByteString::default(),
            extra_file_hash: 0,
            audio_volume: 0,
            pet_name: ByteString::default(),
            pet_prefix: ByteString::default(),
            pet_suffix: ByteString::default(),
            pet_ability: ByteString::default(),
            seed_base: 0,
            seed_overlay: 0,
            tree_base: 0,
            tree_leaves: 0,
            seed_color: Color::default(),
            seed_overlay_color: Color::default(),
            grow_time: 0,
            value2: 0,
            special_variant: 0,
            extra_options: ByteString::default(),
            texture2: ByteString::default(),
            extra_options2: ByteString::default(),
            raw_block_80: block(FieldId::RawBlock80),
            punch_options: gate(FieldId::PunchOptions).then(ByteString::default),
            raw_block_v12: gate(FieldId::RawBlockV12).then(|| block(FieldId::RawBlockV12)),
            int_v13: gate(FieldId::IntV13).then_some(0),
            int_v14: gate(FieldId::IntV14).then_some(0),
            raw_block_v15: gate(FieldId::RawBlockV15).then(|| block(FieldId::RawBlockV15)),
            str_v15: gate(FieldId::StrV15).then(ByteString::default),
            str_v16: gate(FieldId::StrV16).then(ByteString::default),
            int_v17: gate(FieldId::IntV17).then_some(0),
            int_v18: gate(FieldId::IntV18).then_some(0),
        }
    }
}
