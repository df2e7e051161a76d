/// XOR key for item names
pub const ITEM_NAME_KEY: &[u8; 16] = b"PBG892FXX982ABC*";

/// Apply the positional name cipher in place.
///
/// Byte `i` is XORed with `ITEM_NAME_KEY[(i + item_id) mod 16]`, so the
/// keystream depends on the owning record's id. XOR makes this its own
/// inverse: the same call enciphers and deciphers.
pub fn apply_in_place(buffer: &mut [u8], item_id: i32) {
    let key_len = ITEM_NAME_KEY.len() as i64;

    for (i, byte) in buffer.iter_mut().enumerate() {
        // rem_euclid keeps negative ids in range
        let key_index = (i as i64 + i64::from(item_id)).rem_euclid(key_len) as usize;
        *byte ^= ITEM_NAME_KEY[key_index];
    }
}

/// Copying form of [`apply_in_place`]
pub fn apply(bytes: &[u8], item_id: i32) -> Vec<u8> {
    let mut out = bytes.to_vec();
    apply_in_place(&mut out, item_id);
    out
}
