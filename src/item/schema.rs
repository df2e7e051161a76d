//! Static field table for item records.
//!
//! `ITEM_FIELDS` pins the wire order. The encoder walks it to size and write
//! records, the exporters walk it for column names and values, and the decoder
//! reads fields in the same order.

use std::fmt;

use super::fields::{BreakHits, ByteString, HexBlock};
use super::{Color, Item};

/// How a field is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    I32,
    /// u16 length prefix followed by raw bytes
    Bytes,
    /// Like `Bytes`, XORed with the positional cipher keyed by the item id
    CipheredBytes,
    /// a, r, g, b
    Color,
    /// One byte, legacy textual encoding
    BreakHits,
    /// Fixed-width span kept verbatim
    Opaque(usize),
    /// Fixed-width span discarded on read and zeroed on write
    Reserved(usize),
}

impl FieldKind {
    /// Wire width for fixed-size kinds. `None` for length-prefixed kinds.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            FieldKind::U8 | FieldKind::BreakHits => Some(1),
            FieldKind::U16 => Some(2),
            FieldKind::I32 | FieldKind::Color => Some(4),
            FieldKind::Opaque(width) | FieldKind::Reserved(width) => Some(width),
            FieldKind::Bytes | FieldKind::CipheredBytes => None,
        }
    }

    /// Whether the field appears in exported documents.
    pub const fn is_exported(self) -> bool {
        !matches!(self, FieldKind::Reserved(_))
    }
}

/// Identifies a field of [`Item`]. Discriminants index into `ITEM_FIELDS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    ItemId,
    EditableType,
    ItemCategory,
    ActionType,
    HitSoundType,
    Name,
    Texture,
    TextureHash,
    ItemKind,
    Value1,
    TextureX,
    TextureY,
    SpreadType,
    IsStripeyWallpaper,
    CollisionType,
    BreakHits,
    DropChance,
    ClothingType,
    Rarity,
    MaxAmount,
    ExtraFile,
    ExtraFileHash,
    AudioVolume,
    PetName,
    PetPrefix,
    PetSuffix,
    PetAbility,
    SeedBase,
    SeedOverlay,
    TreeBase,
    TreeLeaves,
    SeedColor,
    SeedOverlayColor,
    Ingredients,
    GrowTime,
    Value2,
    SpecialVariant,
    ExtraOptions,
    Texture2,
    ExtraOptions2,
    RawBlock80,
    PunchOptions,
    RawBlockV12,
    IntV13,
    IntV14,
    RawBlockV15,
    StrV15,
    StrV16,
    IntV17,
    IntV18,
}

impl FieldId {
    pub fn def(self) -> &'static FieldDef {
        &ITEM_FIELDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn kind(self) -> FieldKind {
        self.def().kind
    }

    pub fn present_in(self, format_version: u16) -> bool {
        self.def().present_in(format_version)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub id: FieldId,
    pub name: &'static str,
    pub kind: FieldKind,
    /// Lowest format version carrying the field. 0 for the base schema.
    pub since: u16,
}

impl FieldDef {
    const fn base(id: FieldId, name: &'static str, kind: FieldKind) -> Self {
        Self {
            id,
            name,
            kind,
            since: 0,
        }
    }

    const fn gated(id: FieldId, name: &'static str, kind: FieldKind, since: u16) -> Self {
        Self {
            id,
            name,
            kind,
            since,
        }
    }

    pub fn present_in(&self, format_version: u16) -> bool {
        format_version >= self.since
    }

    pub fn is_gated(&self) -> bool {
        self.since > 0
    }
}

/// Version gates, ascending. Each adds fields and never removes one.
pub const VERSION_GATES: [u16; 8] = [11, 12, 13, 14, 15, 16, 17, 18];

use FieldId as F;
use FieldKind as K;

pub static ITEM_FIELDS: [FieldDef; 50] = [
    FieldDef::base(F::ItemId, "item_id", K::I32),
    FieldDef::base(F::EditableType, "editable_type", K::U8),
    FieldDef::base(F::ItemCategory, "item_category", K::U8),
    FieldDef::base(F::ActionType, "action_type", K::U8),
    FieldDef::base(F::HitSoundType, "hit_sound_type", K::U8),
    FieldDef::base(F::Name, "name", K::CipheredBytes),
    FieldDef::base(F::Texture, "texture", K::Bytes),
    FieldDef::base(F::TextureHash, "texture_hash", K::I32),
    FieldDef::base(F::ItemKind, "item_kind", K::U8),
    FieldDef::base(F::Value1, "value1", K::I32),
    FieldDef::base(F::TextureX, "texture_x", K::U8),
    FieldDef::base(F::TextureY, "texture_y", K::U8),
    FieldDef::base(F::SpreadType, "spread_type", K::U8),
    FieldDef::base(F::IsStripeyWallpaper, "is_stripey_wallpaper", K::U8),
    FieldDef::base(F::CollisionType, "collision_type", K::U8),
    FieldDef::base(F::BreakHits, "break_hits", K::BreakHits),
    FieldDef::base(F::DropChance, "drop_chance", K::I32),
    FieldDef::base(F::ClothingType, "clothing_type", K::U8),
    FieldDef::base(F::Rarity, "rarity", K::U16),
    FieldDef::base(F::MaxAmount, "max_amount", K::U8),
    FieldDef::base(F::ExtraFile, "extra_file", K::Bytes),
    FieldDef::base(F::ExtraFileHash, "extra_file_hash", K::I32),
    FieldDef::base(F::AudioVolume, "audio_volume", K::I32),
    FieldDef::base(F::PetName, "pet_name", K::Bytes),
    FieldDef::base(F::PetPrefix, "pet_prefix", K::Bytes),
    FieldDef::base(F::PetSuffix, "pet_suffix", K::Bytes),
    FieldDef::base(F::PetAbility, "pet_ability", K::Bytes),
    FieldDef::base(F::SeedBase, "seed_base", K::U8),
    FieldDef::base(F::SeedOverlay, "seed_overlay", K::U8),
    FieldDef::base(F::TreeBase, "tree_base", K::U8),
    FieldDef::base(F::TreeLeaves, "tree_leaves", K::U8),
    FieldDef::base(F::SeedColor, "seed_color", K::Color),
    FieldDef::base(F::SeedOverlayColor, "seed_overlay_color", K::Color),
    FieldDef::base(F::Ingredients, "ingredients", K::Reserved(4)),
    FieldDef::base(F::GrowTime, "grow_time", K::I32),
    FieldDef::base(F::Value2, "value2", K::U16),
    FieldDef::base(F::SpecialVariant, "special_variant", K::U16),
    FieldDef::base(F::ExtraOptions, "extra_options", K::Bytes),
    FieldDef::base(F::Texture2, "texture2", K::Bytes),
    FieldDef::base(F::ExtraOptions2, "extra_options2", K::Bytes),
    FieldDef::base(F::RawBlock80, "raw_block_80", K::Opaque(80)),
    FieldDef::gated(F::PunchOptions, "punch_options", K::Bytes, 11),
    FieldDef::gated(F::RawBlockV12, "raw_block_v12", K::Opaque(13), 12),
    FieldDef::gated(F::IntV13, "int_v13", K::I32, 13),
    FieldDef::gated(F::IntV14, "int_v14", K::I32, 14),
    FieldDef::gated(F::RawBlockV15, "raw_block_v15", K::Opaque(25), 15),
    FieldDef::gated(F::StrV15, "str_v15", K::Bytes, 15),
    FieldDef::gated(F::StrV16, "str_v16", K::Bytes, 16),
    FieldDef::gated(F::IntV17, "int_v17", K::I32, 17),
    FieldDef::gated(F::IntV18, "int_v18", K::I32, 18),
];

/// Fields present on the wire for `format_version`, in wire order.
pub fn wire_fields(format_version: u16) -> impl Iterator<Item = &'static FieldDef> {
    ITEM_FIELDS
        .iter()
        .filter(move |def| def.present_in(format_version))
}

/// Fields present in exported documents for `format_version`, in wire order.
pub fn exported_fields(format_version: u16) -> impl Iterator<Item = &'static FieldDef> {
    wire_fields(format_version).filter(|def| def.kind.is_exported())
}

/// Borrowed view of one field's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    U8(u8),
    U16(u16),
    I32(i32),
    Bytes(&'a ByteString),
    Color(Color),
    BreakHits(&'a BreakHits),
    Opaque(&'a HexBlock),
    /// Reserved span, carries no value
    Reserved,
}

impl FieldValue<'_> {
    /// Text form used by the line-oriented export
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::U8(v) => v.to_string(),
            FieldValue::U16(v) => v.to_string(),
            FieldValue::I32(v) => v.to_string(),
            FieldValue::Bytes(s) => s.to_escaped(),
            FieldValue::Color(c) => format!("{},{},{},{}", c.a, c.r, c.g, c.b),
            FieldValue::BreakHits(b) => b.as_str().to_string(),
            FieldValue::Opaque(h) => h.as_str().to_string(),
            FieldValue::Reserved => String::new(),
        }
    }
}

impl Item {
    /// Value of `id`, or `None` for a version-gated field the item doesn't carry.
    pub fn field(&self, id: FieldId) -> Option<FieldValue<'_>> {
        use FieldValue as V;

        let value = match id {
            F::ItemId => V::I32(self.item_id),
            F::EditableType => V::U8(self.editable_type),
            F::ItemCategory => V::U8(self.item_category),
            F::ActionType => V::U8(self.action_type),
            F::HitSoundType => V::U8(self.hit_sound_type),
            F::Name => V::Bytes(&self.name),
            F::Texture => V::Bytes(&self.texture),
            F::TextureHash => V::I32(self.texture_hash),
            F::ItemKind => V::U8(self.item_kind),
            F::Value1 => V::I32(self.value1),
            F::TextureX => V::U8(self.texture_x),
            F::TextureY => V::U8(self.texture_y),
            F::SpreadType => V::U8(self.spread_type),
            F::IsStripeyWallpaper => V::U8(self.is_stripey_wallpaper),
            F::CollisionType => V::U8(self.collision_type),
            F::BreakHits => V::BreakHits(&self.break_hits),
            F::DropChance => V::I32(self.drop_chance),
            F::ClothingType => V::U8(self.clothing_type),
            F::Rarity => V::U16(self.rarity),
            F::MaxAmount => V::U8(self.max_amount),
            F::ExtraFile => V::Bytes(&self.extra_file),
            F::ExtraFileHash => V::I32(self.extra_file_hash),
            F::AudioVolume => V::I32(self.audio_volume),
            F::PetName => V::Bytes(&self.pet_name),
            F::PetPrefix => V::Bytes(&self.pet_prefix),
            F::PetSuffix => V::Bytes(&self.pet_suffix),
            F::PetAbility => V::Bytes(&self.pet_ability),
            F::SeedBase => V::U8(self.seed_base),
            F::SeedOverlay => V::U8(self.seed_overlay),
            F::TreeBase => V::U8(self.tree_base),
            F::TreeLeaves => V::U8(self.tree_leaves),
            F::SeedColor => V::Color(self.seed_color),
            F::SeedOverlayColor => V::Color(self.seed_overlay_color),
            F::Ingredients => V::Reserved,
            F::GrowTime => V::I32(self.grow_time),
            F::Value2 => V::U16(self.value2),
            F::SpecialVariant => V::U16(self.special_variant),
            F::ExtraOptions => V::Bytes(&self.extra_options),
            F::Texture2 => V::Bytes(&self.texture2),
            F::ExtraOptions2 => V::Bytes(&self.extra_options2),
            F::RawBlock80 => V::Opaque(&self.raw_block_80),
            F::PunchOptions => V::Bytes(self.punch_options.as_ref()?),
            F::RawBlockV12 => V::Opaque(self.raw_block_v12.as_ref()?),
            F::IntV13 => V::I32(self.int_v13?),
            F::IntV14 => V::I32(self.int_v14?),
            F::RawBlockV15 => V::Opaque(self.raw_block_v15.as_ref()?),
            F::StrV15 => V::Bytes(self.str_v15.as_ref()?),
            F::StrV16 => V::Bytes(self.str_v16.as_ref()?),
            F::IntV17 => V::I32(self.int_v17?),
            F::IntV18 => V::I32(self.int_v18?),
        };
        Some(value)
    }

    /// Ordered name/value pairs for the exported fields of `format_version`.
    pub fn exported_values(&self, format_version: u16) -> Vec<(&'static str, Option<FieldValue<'_>>)> {
        exported_fields(format_version)
            .map(|def| (def.name, self.field(def.id)))
            .collect()
    }
}
