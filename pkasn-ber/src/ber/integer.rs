//! INTEGER content codec (two's complement <-> sign and magnitude)
//!
//! # Encoding Format
//!
//! INTEGER content is a big-endian two's complement number. The high bit of
//! the first byte is the sign:
//! - `05` is 5, `00 80` is 128 (the leading zero keeps it positive)
//! - `FF` is -1, `80` is -128
//!
//! DER requires the shortest form: the first nine bits must not be all
//! zeros or all ones.

use num_bigint::{BigInt, BigUint, Sign};
use pkasn_core::{BerError, BerResult};

/// Decode INTEGER content bytes
///
/// Empty content decodes to zero. Redundant leading bytes are accepted;
/// use [`is_minimal_integer`] to enforce DER.
pub fn decode_integer_content(bytes: &[u8]) -> BigInt {
    let Some(first) = bytes.first() else {
        return BigInt::default();
    };

    if first & 0x80 == 0 {
        return BigInt::from_biguint(Sign::Plus, BigUint::from_bytes_be(bytes));
    }

    // negative: complement, then add one from the least significant byte
    let mut magnitude: Vec<u8> = bytes.iter().map(|b| !b).collect();
    for byte in magnitude.iter_mut().rev() {
        let (sum, carry) = byte.overflowing_add(1);
        *byte = sum;
        if !carry {
            break;
        }
    }
    BigInt::from_biguint(Sign::Minus, BigUint::from_bytes_be(&magnitude))
}

/// Check the DER minimality rule for INTEGER content
pub fn is_minimal_integer(bytes: &[u8]) -> bool {
    match (bytes.first(), bytes.get(1).map(|b| b & 0x80 != 0)) {
        (None, _) => false,
        (Some(0x00), Some(false)) => false,
        (Some(0xFF), Some(true)) => false,
        _ => true,
    }
}

/// Encode a value as minimal two's complement content
pub fn encode_integer_content(value: &BigInt) -> Vec<u8> {
    match value.sign() {
        Sign::NoSign => vec![0x00],
        Sign::Plus => {
            let mut bytes = value.magnitude().to_bytes_be();
            if bytes[0] & 0x80 != 0 {
                bytes.insert(0, 0x00);
            }
            bytes
        }
        Sign::Minus => {
            let mut bytes = value.magnitude().to_bytes_be();
            // -2^(8k-1) fits in k bytes; any other magnitude with the top
            // bit set needs one more byte
            let is_power = bytes[0] == 0x80 && bytes[1..].iter().all(|b| *b == 0);
            if bytes[0] & 0x80 != 0 && !is_power {
                bytes.insert(0, 0x00);
            }
            for byte in bytes.iter_mut() {
                *byte = !*byte;
            }
            for byte in bytes.iter_mut().rev() {
                let (sum, carry) = byte.overflowing_add(1);
                *byte = sum;
                if !carry {
                    break;
                }
            }
            bytes
        }
    }
}

/// Narrow a decoded integer to an unsigned value of at most `width` bytes
///
/// # Error Handling
/// - `InvalidData` if `width` is above 8 bytes
/// - `NegativeInteger` for negative values
/// - `ValueTooLarge` if the value needs more than `width` bytes
pub fn to_constrained(value: &BigInt, width: usize) -> BerResult<u64> {
    if width > 8 {
        return Err(BerError::InvalidData(format!(
            "cannot decode a {} byte integer into 64 bits",
            width
        )));
    }
    if value.sign() == Sign::Minus {
        return Err(BerError::NegativeInteger);
    }
    if value.bits() > 8 * width as u64 {
        return Err(BerError::ValueTooLarge(width));
    }

    let mut out: u64 = 0;
    for byte in value.magnitude().to_bytes_be() {
        out = (out << 8) | u64::from(byte);
    }
    Ok(out)
}
