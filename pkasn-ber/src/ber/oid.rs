//! OBJECT IDENTIFIER content codec
//!
//! # OID Encoding Rules
//! - The first two arcs X.Y are packed into one subidentifier: 40*X + Y
//! - Every subidentifier is base-128, most significant group first, with
//!   bit 8 set on all bytes except the last of each subidentifier

use pkasn_core::{BerError, BerResult, ObjectIdentifier};

/// Decode OBJECT IDENTIFIER content bytes
///
/// # Error Handling
/// Returns `InvalidData` for empty content, a subidentifier cut off by the
/// end of content, a subidentifier padded with a leading 0x80, or a
/// subidentifier that does not fit in 32 bits.
pub fn decode_oid_content(bytes: &[u8]) -> BerResult<ObjectIdentifier> {
    if bytes.is_empty() {
        return Err(BerError::InvalidData("OID encoding is too short".to_string()));
    }

    let mut subidentifiers = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == 0x80 {
            return Err(BerError::InvalidData("Leading 0x80 in OID component".to_string()));
        }
        let mut value: u32 = 0;
        loop {
            let Some(&byte) = bytes.get(pos) else {
                return Err(BerError::InvalidData("OID component truncated".to_string()));
            };
            pos += 1;
            if value > (u32::MAX >> 7) {
                return Err(BerError::InvalidData("OID component overflow".to_string()));
            }
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                break;
            }
        }
        subidentifiers.push(value);
    }

    let first = subidentifiers[0];
    let mut components = Vec::with_capacity(subidentifiers.len() + 1);
    match first {
        0..=39 => components.extend([0, first]),
        40..=79 => components.extend([1, first - 40]),
        _ => components.extend([2, first - 80]),
    }
    components.extend_from_slice(&subidentifiers[1..]);

    ObjectIdentifier::new(components)
}

/// Encode OBJECT IDENTIFIER content bytes
pub fn encode_oid_content(oid: &ObjectIdentifier) -> BerResult<Vec<u8>> {
    let components = oid.components();
    if components.len() < 2 {
        return Err(BerError::Encoding(
            "Object identifier must have at least 2 components".to_string(),
        ));
    }

    let first = components[0]
        .checked_mul(40)
        .and_then(|x| x.checked_add(components[1]))
        .ok_or_else(|| BerError::Encoding("OID component too large".to_string()))?;

    let mut out = Vec::new();
    push_base128(&mut out, first);
    for &component in &components[2..] {
        push_base128(&mut out, component);
    }
    Ok(out)
}

fn push_base128(out: &mut Vec<u8>, value: u32) {
    let groups = (32 - value.leading_zeros() as usize).div_ceil(7).max(1);
    for i in (1..groups).rev() {
        out.push(0x80 | ((value >> (7 * i)) & 0x7F) as u8);
    }
    out.push((value & 0x7F) as u8);
}
