//! Tag and length fields: the stateless scanner and its encoding mirror
//!
//! # Tag Encoding
//!
//! Short form (tag number 0-30):
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//!
//! Long form (tag number >= 31):
//! ```text
//! First byte:      C C P 1 1 1 1 1  (all tag bits set to 1)
//! Following bytes: 1 T T T T T T T  (continuation bytes, last byte has bit 8 = 0)
//! ```
//!
//! # Length Encoding
//!
//! - Short form: one byte below 0x80
//! - Long form: `0x80 | n` followed by `n` big-endian length bytes, `n` in 1..=4
//! - Indefinite form: `0x80`, content runs until a matching EOC (`00 00`)
//!
//! Indefinite lengths are resolved up front by pre-scanning the content for
//! its EOC marker, so the rest of the decoder only ever sees definite
//! lengths. The pre-scan recurses once per nested indefinite length and is
//! bounded by an explicit budget.

use crate::ber::source::{ByteSource, PeekCursor};
use pkasn_core::{BerError, BerResult, ClassTag, TypeTag};

/// Maximum number of long-form length octets accepted
pub const MAX_LENGTH_OCTETS: usize = 4;

/// Default budget of nested indefinite-length encodings
pub const ALLOWED_EOC_NESTINGS: usize = 16;

/// Decoded identifier octets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagField {
    pub type_tag: TypeTag,
    pub class_tag: ClassTag,
    /// Number of identifier octets consumed
    pub field_size: usize,
}

/// Which of the three length forms was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthForm {
    Short,
    Long,
    Indefinite,
}

/// Decoded length octets
///
/// For the indefinite form `value` is the length discovered by the
/// pre-scan, including the terminating EOC marker. The decoder reads that
/// many bytes and drops the marker from the object value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthField {
    pub value: usize,
    pub field_size: usize,
    pub form: LengthForm,
}

impl LengthField {
    /// Check whether a long-form length used more octets than needed
    pub fn is_minimal(&self) -> bool {
        match self.form {
            LengthForm::Short => true,
            LengthForm::Long => {
                self.value >= 0x80 && self.field_size - 1 == significant_bytes(self.value)
            }
            LengthForm::Indefinite => false,
        }
    }
}

/// Decode one group of identifier octets
///
/// # Returns
/// `Ok(None)` if the source is exhausted before the first byte. This is the
/// natural end of a stream, not an error.
///
/// # Error Handling
/// - `TruncatedTag` if data ends inside a long-form tag
/// - `TagTooLarge` if the tag number does not fit in 32 bits
pub fn decode_tag(source: &mut dyn ByteSource) -> BerResult<Option<TagField>> {
    let Some(first) = source.read_byte()? else {
        return Ok(None);
    };

    let class_tag = ClassTag::from_identifier(first);
    if first & 0x1F != 0x1F {
        return Ok(Some(TagField {
            type_tag: TypeTag(u32::from(first & 0x1F)),
            class_tag,
            field_size: 1,
        }));
    }

    let mut tag_buf: u32 = 0;
    let mut field_size = 1;
    loop {
        let Some(byte) = source.read_byte()? else {
            return Err(BerError::TruncatedTag);
        };
        if tag_buf > (u32::MAX >> 7) {
            return Err(BerError::TagTooLarge);
        }
        field_size += 1;
        tag_buf = (tag_buf << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }

    Ok(Some(TagField {
        type_tag: TypeTag(tag_buf),
        class_tag,
        field_size,
    }))
}

/// Decode one length field
///
/// `allow_indef` is the remaining budget of nested indefinite lengths; an
/// indefinite length with a zero budget fails with `NestingTooDeep`.
pub fn decode_length(source: &mut dyn ByteSource, allow_indef: usize) -> BerResult<LengthField> {
    let Some(first) = source.read_byte()? else {
        return Err(BerError::LengthNotFound);
    };

    if first & 0x80 == 0 {
        return Ok(LengthField {
            value: usize::from(first),
            field_size: 1,
            form: LengthForm::Short,
        });
    }

    let num_bytes = usize::from(first & 0x7F);
    if num_bytes > MAX_LENGTH_OCTETS {
        return Err(BerError::LengthTooLarge(num_bytes));
    }

    if num_bytes == 0 {
        if allow_indef == 0 {
            log::debug!("rejecting indefinite length: nesting budget exhausted");
            return Err(BerError::NestingTooDeep);
        }
        let value = find_eoc(source, allow_indef - 1)?;
        return Ok(LengthField {
            value,
            field_size: 1,
            form: LengthForm::Indefinite,
        });
    }

    // With at most MAX_LENGTH_OCTETS octets this only fires where usize is
    // narrower than 32 bits.
    let mut length: usize = 0;
    for _ in 0..num_bytes {
        if length > (usize::MAX >> 8) {
            return Err(BerError::LengthOverflow);
        }
        let Some(byte) = source.read_byte()? else {
            return Err(BerError::LengthTruncated);
        };
        length = (length << 8) | usize::from(byte);
    }

    Ok(LengthField {
        value: length,
        field_size: 1 + num_bytes,
        form: LengthForm::Long,
    })
}

/// Find the length of indefinite-length content, including its EOC marker
///
/// Walks the content TLV by TLV without consuming anything from `source`.
/// Nested indefinite lengths recurse through [`decode_length`] with a
/// smaller budget.
fn find_eoc(source: &mut dyn ByteSource, allow_indef: usize) -> BerResult<usize> {
    let mut cursor = PeekCursor::new(source);
    let mut length: usize = 0;

    loop {
        let Some(tag) = decode_tag(&mut cursor)? else {
            // content ended without its EOC marker
            return Err(BerError::ValueTruncated);
        };
        let item = decode_length(&mut cursor, allow_indef)?;
        if cursor.discard_next(item.value)? != item.value {
            return Err(BerError::ValueTruncated);
        }

        length = length
            .checked_add(tag.field_size)
            .and_then(|l| l.checked_add(item.field_size))
            .and_then(|l| l.checked_add(item.value))
            .ok_or(BerError::LengthOverflow)?;

        if tag.type_tag == TypeTag::EOC && tag.class_tag == ClassTag::UNIVERSAL {
            if item.value != 0 {
                return Err(BerError::InvalidData("EOC marker with non-zero length".to_string()));
            }
            break;
        }
    }

    log::debug!("indefinite length resolved to {} bytes", length);
    Ok(length)
}

/// Encode identifier octets
pub fn encode_tag(type_tag: TypeTag, class_tag: ClassTag) -> Vec<u8> {
    let class_bits = class_tag.bits();
    let number = type_tag.0;

    if number <= 30 {
        return vec![class_bits | number as u8];
    }

    let mut result = vec![class_bits | 0x1F];
    let blocks = (32 - number.leading_zeros() as usize).div_ceil(7);
    for i in (1..blocks).rev() {
        result.push(0x80 | ((number >> (7 * i)) & 0x7F) as u8);
    }
    result.push((number & 0x7F) as u8);
    result
}

/// Encode a definite length in its shortest form
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }
    let num_bytes = significant_bytes(length);
    let mut result = Vec::with_capacity(1 + num_bytes);
    result.push(0x80 | num_bytes as u8);
    for i in (0..num_bytes).rev() {
        result.push((length >> (8 * i)) as u8);
    }
    result
}

fn significant_bytes(value: usize) -> usize {
    let bits = usize::BITS as usize - value.leading_zeros() as usize;
    bits.div_ceil(8).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::source::MemorySource;

    fn tag_of(data: &[u8]) -> BerResult<Option<TagField>> {
        decode_tag(&mut MemorySource::new(data))
    }

    fn length_of(data: &[u8]) -> BerResult<LengthField> {
        decode_length(&mut MemorySource::new(data), ALLOWED_EOC_NESTINGS)
    }

    #[test]
    fn test_decode_short_tag() {
        let tag = tag_of(&[0x30]).unwrap().unwrap();
        assert_eq!(tag.type_tag, TypeTag::SEQUENCE);
        assert_eq!(tag.class_tag, ClassTag::CONSTRUCTED);
        assert_eq!(tag.field_size, 1);

        let tag = tag_of(&[0x82]).unwrap().unwrap();
        assert_eq!(tag.type_tag, TypeTag(2));
        assert_eq!(tag.class_tag, ClassTag::CONTEXT_SPECIFIC);
    }

    #[test]
    fn test_decode_long_tag() {
        let tag = tag_of(&[0x5F, 0x81, 0x00]).unwrap().unwrap();
        assert_eq!(tag.type_tag, TypeTag(128));
        assert_eq!(tag.class_tag, ClassTag::APPLICATION);
        assert_eq!(tag.field_size, 3);

        let tag = tag_of(&[0x1F, 0x8F, 0xFF, 0xFF, 0xFF, 0x7F]).unwrap().unwrap();
        assert_eq!(tag.type_tag, TypeTag(u32::MAX));
    }

    #[test]
    fn test_decode_tag_errors() {
        assert!(tag_of(&[]).unwrap().is_none());
        assert!(matches!(tag_of(&[0x1F]), Err(BerError::TruncatedTag)));
        assert!(matches!(tag_of(&[0x1F, 0x81]), Err(BerError::TruncatedTag)));
        assert!(matches!(
            tag_of(&[0x1F, 0x90, 0x80, 0x80, 0x80, 0x00]),
            Err(BerError::TagTooLarge)
        ));
    }

    #[test]
    fn test_decode_length_forms() {
        let length = length_of(&[0x05]).unwrap();
        assert_eq!((length.value, length.field_size, length.form), (5, 1, LengthForm::Short));

        let length = length_of(&[0x82, 0x01, 0x00]).unwrap();
        assert_eq!((length.value, length.field_size, length.form), (256, 3, LengthForm::Long));
        assert!(length.is_minimal());

        let length = length_of(&[0x84, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(length.value, 0xFFFF_FFFF);

        assert!(!length_of(&[0x81, 0x05]).unwrap().is_minimal());
        assert!(!length_of(&[0x82, 0x00, 0x80]).unwrap().is_minimal());
    }

    #[test]
    fn test_decode_length_errors() {
        assert!(matches!(length_of(&[]), Err(BerError::LengthNotFound)));
        assert!(matches!(length_of(&[0x82, 0x01]), Err(BerError::LengthTruncated)));
        assert!(matches!(
            length_of(&[0x85, 0x01, 0x00, 0x00, 0x00, 0x00]),
            Err(BerError::LengthTooLarge(5))
        ));
        assert!(matches!(length_of(&[0xFF]), Err(BerError::LengthTooLarge(127))));
    }

    #[test]
    fn test_indefinite_length_prescan() {
        // 30 80 | 02 01 05 | 30 80 01 01 FF 00 00 | 00 00
        let data = [
            0x80, 0x02, 0x01, 0x05, 0x30, 0x80, 0x01, 0x01, 0xFF, 0x00, 0x00, 0x00, 0x00,
        ];
        let mut source = MemorySource::new(&data);
        let length = decode_length(&mut source, ALLOWED_EOC_NESTINGS).unwrap();
        assert_eq!(length.form, LengthForm::Indefinite);
        assert_eq!(length.value, 12);
        assert_eq!(source.bytes_read(), 1);
    }

    #[test]
    fn test_indefinite_length_missing_eoc() {
        let data = [0x80, 0x02, 0x01, 0x05];
        assert!(matches!(length_of(&data), Err(BerError::ValueTruncated)));
    }

    #[test]
    fn test_indefinite_length_zero_budget() {
        let data = [0x80, 0x00, 0x00];
        let result = decode_length(&mut MemorySource::new(&data), 0);
        assert!(matches!(result, Err(BerError::NestingTooDeep)));
        assert!(decode_length(&mut MemorySource::new(&data), 1).is_ok());
    }

    #[test]
    fn test_encode_tag() {
        assert_eq!(encode_tag(TypeTag::INTEGER, ClassTag::UNIVERSAL), vec![0x02]);
        assert_eq!(encode_tag(TypeTag(30), ClassTag::PRIVATE), vec![0xDE]);
        assert_eq!(encode_tag(TypeTag(31), ClassTag::APPLICATION), vec![0x5F, 0x1F]);
        assert_eq!(encode_tag(TypeTag(128), ClassTag::APPLICATION), vec![0x5F, 0x81, 0x00]);
        assert_eq!(
            encode_tag(TypeTag(u32::MAX), ClassTag::UNIVERSAL),
            vec![0x1F, 0x8F, 0xFF, 0xFF, 0xFF, 0x7F]
        );
    }

    #[test]
    fn test_encode_length_minimal() {
        assert_eq!(encode_length(0), vec![0x00]);
        assert_eq!(encode_length(127), vec![0x7F]);
        assert_eq!(encode_length(128), vec![0x81, 0x80]);
        assert_eq!(encode_length(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(0x01_00_00_00), vec![0x84, 0x01, 0x00, 0x00, 0x00]);
    }
}
