// Common test utilities and helpers
#![allow(dead_code)]

use items_dat_lib::item::{BreakHits, ByteString, Color, HexBlock, Item, ItemDatabase};

const NAME_KEY: &[u8; 16] = b"PBG892FXX982ABC*";

/// Hand-assembles items.dat bytes without going through the encoder.
pub struct DatBuilder {
    version: u16,
    buf: Vec<u8>,
}

impl DatBuilder {
    pub fn new(version: u16, item_count: u32) -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(&version.to_be_bytes());
        buf.extend_from_slice(&item_count.to_be_bytes());
        Self { version, buf }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn prefixed(&mut self, bytes: &[u8]) -> &mut Self {
        self.u16(bytes.len() as u16).raw(bytes)
    }

    /// Append one record whose every field carries a value derived from `seed`.
    pub fn record(&mut self, item_id: i32, name: &str, seed: u8) -> &mut Self {
        let version = self.version;
        let ciphered: Vec<u8> = name
            .bytes()
            .enumerate()
            .map(|(i, b)| b ^ NAME_KEY[(i as i64 + item_id as i64).rem_euclid(16) as usize])
            .collect();

        self.i32(item_id)
            .u8(seed)
            .u8(seed.wrapping_add(1))
            .u8(seed.wrapping_add(2))
            .u8(seed.wrapping_add(3))
            .prefixed(&ciphered)
            .prefixed(b"tiles_page1.rttex")
            .i32(-123_456)
            .u8(seed.wrapping_add(4))
            .i32(i32::MAX)
            .u8(7)
            .u8(9)
            .u8(2)
            .u8(0)
            .u8(1)
            .u8(seed.wrapping_mul(5))
            .i32(-1)
            .u8(3)
            .u16(0xBEEF)
            .u8(200)
            .prefixed(b"audio/punch.wav")
            .i32(0x1234_5678)
            .i32(100)
            .prefixed(b"Pet")
            .prefixed(b"")
            .prefixed(b"of Doom\x01")
            .prefixed(b"%50")
            .u8(1)
            .u8(2)
            .u8(3)
            .u8(4)
            .raw(&[255, seed, 0, 128])
            .raw(&[0, 0, 0, 0xFF])
            .raw(&[0; 4])
            .i32(3600)
            .u16(12)
            .u16(65535)
            .prefixed(b"opts")
            .prefixed(b"")
            .prefixed(b"\\back\\slash")
            .raw(&pattern(80, seed));

        if version >= 11 {
            self.prefixed(b"punch");
        }
        if version >= 12 {
            self.raw(&pattern(13, seed.wrapping_add(80)));
        }
        if version >= 13 {
            self.i32(13);
        }
        if version >= 14 {
            self.i32(-14);
        }
        if version >= 15 {
            self.raw(&pattern(25, seed.wrapping_add(93)))
                .prefixed(b"fifteen");
        }
        if version >= 16 {
            self.prefixed(b"sixteen");
        }
        if version >= 17 {
            self.i32(17);
        }
        if version >= 18 {
            self.i32(i32::MIN);
        }
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

pub fn pattern(len: usize, start: u8) -> Vec<u8> {
    (0..len).map(|i| start.wrapping_add(i as u8).wrapping_mul(7)).collect()
}

/// Offset of the reserved ingredient block inside a record built by
/// [`DatBuilder::record`] with a name of `name_len` bytes.
pub fn ingredients_offset(name_len: usize) -> usize {
    // item_id, four u8s, name prefix
    4 + 4 + 2 + name_len
        // texture, texture_hash, item_kind, value1, six u8s, drop_chance
        + 2 + 17 + 4 + 1 + 4 + 6 + 4
        // clothing_type, rarity, max_amount, extra_file, hash, audio_volume
        + 1 + 2 + 1 + 2 + 15 + 4 + 4
        // pet strings
        + (2 + 3) + 2 + (2 + 8) + (2 + 3)
        // seed and tree bytes, two colors
        + 4 + 4 + 4
}

/// A model item with every field populated for `format_version`.
pub fn sample_item(item_id: i32, format_version: u16) -> Item {
    let mut item = Item::empty(item_id, format_version);
    item.editable_type = 1;
    item.item_category = 2;
    item.name = ByteString::from(format!("Item {}", item_id).as_str());
    item.texture = ByteString::from("tiles_page2.rttex");
    item.texture_hash = -42;
    item.break_hits = BreakHits::scaled(8);
    item.rarity = 999;
    item.pet_ability = ByteString::new(vec![0x00, b'%', 0xFE]);
    item.seed_color = Color {
        a: 255,
        r: 1,
        g: 2,
        b: 3,
    };
    item.raw_block_80 = HexBlock::from_bytes(&pattern(80, item_id as u8));
    if format_version >= 11 {
        item.punch_options = Some(ByteString::from("punch"));
    }
    if format_version >= 13 {
        item.int_v13 = Some(item_id);
    }
    if format_version >= 16 {
        item.str_v16 = Some(ByteString::from("v16"));
    }
    item
}

pub fn sample_database(format_version: u16, count: usize) -> ItemDatabase {
    let items = (0..count as i32)
        .map(|id| sample_item(id, format_version))
        .collect();
    ItemDatabase::new(format_version, items)
}

pub fn diff_bytes(original: &[u8], new: &[u8]) -> Vec<String> {
    let mut diffs: Vec<String> = original
        .iter()
        .zip(new.iter())
        .enumerate()
        .filter_map(|(i, (a, b))| {
            if a == b {
                None
            } else {
                Some(format!("offset 0x{:04X}: 0x{:02X} -> 0x{:02X}", i, a, b))
            }
        })
        .collect();
    if original.len() != new.len() {
        diffs.push(format!("length {} -> {}", original.len(), new.len()));
    }
    diffs
}

pub fn assert_same_bytes(original: &[u8], new: &[u8], what: &str) {
    if original != new {
        let diffs = diff_bytes(original, new);
        panic!(
            "{} produced {} byte differences:\n{}",
            what,
            diffs.len(),
            diffs.join("\n")
        );
    }
}
