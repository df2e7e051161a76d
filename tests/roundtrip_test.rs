use items_dat_lib::codec::{self, CodecError};
use items_dat_lib::item::FieldId;

#[path = "common/mod.rs"]
mod common;

use common::{assert_same_bytes, DatBuilder};

fn three_records(version: u16) -> Vec<u8> {
    DatBuilder::new(version, 3)
        .record(0, "Blank", 0)
        .record(2, "Dirt", 6)
        .record(-7, "Guardian Pineapple", 41)
        .finish()
}

#[test]
fn roundtrip_preserves_bytes_across_versions() {
    for version in [10, 11, 12, 13, 14, 15, 16, 17, 18] {
        let original = three_records(version);
        let db = codec::decode(&original)
            .unwrap_or_else(|e| panic!("Failed to decode v{}: {}", version, e));
        assert_eq!(db.items.len(), 3);

        let new_bytes = codec::encode(&db)
            .unwrap_or_else(|e| panic!("Failed to encode v{}: {}", version, e));
        assert_same_bytes(&original, &new_bytes, &format!("v{} round trip", version));
    }
}

#[test]
fn decode_reads_hand_built_fields() {
    let db = codec::decode(&three_records(18)).unwrap();
    let dirt = &db.items[1];

    assert_eq!(db.format_version, 18);
    assert_eq!(db.item_count, 3);
    assert_eq!(dirt.item_id, 2);
    assert_eq!(dirt.name.as_bytes(), b"Dirt");
    assert_eq!(dirt.texture.as_bytes(), b"tiles_page1.rttex");
    assert_eq!(dirt.texture_hash, -123_456);
    assert_eq!(dirt.rarity, 0xBEEF);
    // seed 6 stores 30, a multiple of 6
    assert_eq!(dirt.break_hits.as_str(), "5");
    assert_eq!(dirt.pet_suffix.to_escaped(), "of Doom%01");
    assert_eq!(dirt.pet_ability.to_escaped(), "%2550");
    assert_eq!(dirt.extra_options2.to_escaped(), "%5Cback%5Cslash");
    assert_eq!(dirt.seed_color.a, 255);
    assert_eq!(dirt.seed_color.r, 6);
    assert_eq!(dirt.str_v15.as_ref().unwrap().as_bytes(), b"fifteen");
    assert_eq!(dirt.int_v18, Some(i32::MIN));

    let pineapple = &db.items[2];
    assert_eq!(pineapple.item_id, -7);
    assert_eq!(pineapple.name.as_bytes(), b"Guardian Pineapple");
    // seed 41 stores 205, not a multiple of 6
    assert_eq!(pineapple.break_hits.as_str(), "205r");
}

#[test]
fn version_gates_tail_fields() {
    let v10 = codec::decode(&three_records(10)).unwrap();
    let item = &v10.items[0];
    assert!(item.punch_options.is_none());
    assert!(item.raw_block_v12.is_none());
    assert!(item.int_v18.is_none());

    let v14 = codec::decode(&three_records(14)).unwrap();
    let item = &v14.items[0];
    assert_eq!(item.punch_options.as_ref().unwrap().as_bytes(), b"punch");
    assert!(item.raw_block_v12.is_some());
    assert_eq!(item.int_v13, Some(13));
    assert_eq!(item.int_v14, Some(-14));
    assert!(item.raw_block_v15.is_none());
    assert!(item.str_v15.is_none());
    assert!(item.str_v16.is_none());
}

#[test]
fn truncation_names_the_failing_item() {
    let full = three_records(11);
    let db = codec::decode(&full).unwrap();
    let second_starts = codec::HEADER_LEN + codec::encoded_len(&db.items[0], 11).unwrap();

    // Cut inside the second record's texture string
    let truncated = &full[..second_starts + 20];
    match codec::decode(truncated) {
        Err(CodecError::TruncatedInput {
            item_index, field, ..
        }) => {
            assert_eq!(item_index, 1);
            assert_eq!(field, FieldId::Texture);
        }
        other => panic!("expected truncated input, got {:?}", other),
    }
}

#[test]
fn truncation_inside_tail_fields() {
    let full = three_records(18);
    // Drop the last byte of int_v18 in the final record
    let truncated = &full[..full.len() - 1];
    match codec::decode(truncated) {
        Err(CodecError::TruncatedInput {
            item_index, field, ..
        }) => {
            assert_eq!(item_index, 2);
            assert_eq!(field, FieldId::IntV18);
        }
        other => panic!("expected truncated input, got {:?}", other),
    }
}

#[test]
fn declared_count_larger_than_data_fails() {
    // Header claims two items; the buffer ends right after item 0
    let bytes = DatBuilder::new(10, 2).record(1, "Only", 0).finish();
    let err = codec::decode(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedInput { item_index: 1, .. }));
    assert!(err.to_string().contains("item 1"));
}

#[test]
fn nonzero_ingredients_are_not_preserved() {
    let mut original = DatBuilder::new(10, 1).record(2, "Dirt", 0).finish();
    let offset = codec::HEADER_LEN + common::ingredients_offset(4);
    assert_eq!(&original[offset..offset + 4], &[0, 0, 0, 0]);
    original[offset..offset + 4].copy_from_slice(&[1, 2, 3, 4]);

    let new_bytes = codec::encode(&codec::decode(&original).unwrap()).unwrap();
    assert_eq!(new_bytes.len(), original.len());
    assert_eq!(&new_bytes[offset..offset + 4], &[0, 0, 0, 0]);
    assert_eq!(
        codec::first_difference(&original, &new_bytes),
        Some(offset)
    );
}
