//! DER encoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use pkasn_ber::ber::DerEncoder;
//!
//! let mut encoder = DerEncoder::new();
//! encoder.start_sequence()?.encode_u64(5)?.encode_bool(true)?.end_cons()?;
//! assert_eq!(
//!     encoder.get_contents()?,
//!     vec![0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xFF]
//! );
//! # Ok::<(), pkasn_core::BerError>(())
//! ```
//!
//! # Scopes
//!
//! Constructed values are built bottom-up: `start_cons` opens a new content
//! buffer and `end_cons` wraps it in a definite-length TLV appended to the
//! enclosing buffer. Items of a universal SET are kept apart and written in
//! ascending byte order when the SET is closed.

use crate::ber::integer::encode_integer_content;
use crate::ber::oid::encode_oid_content;
use crate::ber::traits::Asn1Encode;
use crate::ber::types::{encode_length, encode_tag};
use bytes::{BufMut, BytesMut};
use num_bigint::BigInt;
use pkasn_core::{
    describe_tag, BerError, BerResult, BitString, ClassTag, ObjectIdentifier, TypeTag,
};

/// Content collected for an open constructed value
enum ScopeBody {
    Sequence(BytesMut),
    /// DER orders SET members by their encodings
    Set(Vec<Vec<u8>>),
}

struct EncoderScope {
    type_tag: TypeTag,
    class_tag: ClassTag,
    body: ScopeBody,
}

impl EncoderScope {
    fn append(&mut self, bytes: &[u8]) {
        match &mut self.body {
            ScopeBody::Sequence(buffer) => buffer.put_slice(bytes),
            ScopeBody::Set(items) => items.push(bytes.to_vec()),
        }
    }

    fn finish(self) -> Vec<u8> {
        match self.body {
            ScopeBody::Sequence(buffer) => buffer.to_vec(),
            ScopeBody::Set(mut items) => {
                items.sort();
                items.concat()
            }
        }
    }
}

/// DER encoder
///
/// Output is always definite length with minimal tag, length and INTEGER
/// encodings.
#[derive(Default)]
pub struct DerEncoder {
    contents: BytesMut,
    scopes: Vec<EncoderScope>,
}

impl DerEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constructed scopes currently open
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn append(&mut self, bytes: &[u8]) {
        match self.scopes.last_mut() {
            Some(scope) => scope.append(bytes),
            None => self.contents.put_slice(bytes),
        }
    }

    /// Append one TLV
    ///
    /// # Encoding Process
    /// 1. Encode tag
    /// 2. Encode length (shortest form)
    /// 3. Append value bytes
    pub fn add_object(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
        value: &[u8],
    ) -> BerResult<&mut Self> {
        let mut tlv = encode_tag(type_tag, class_tag);
        tlv.extend_from_slice(&encode_length(value.len()));
        tlv.extend_from_slice(value);
        self.append(&tlv);
        Ok(self)
    }

    /// Append bytes that are already DER encoded
    pub fn raw_bytes(&mut self, bytes: &[u8]) -> BerResult<&mut Self> {
        self.append(bytes);
        Ok(self)
    }

    /// Open a constructed value
    ///
    /// The CONSTRUCTED bit is added to `class_tag`.
    pub fn start_cons(&mut self, type_tag: TypeTag, class_tag: ClassTag) -> BerResult<&mut Self> {
        let class_tag = class_tag | ClassTag::CONSTRUCTED;
        let body = if type_tag == TypeTag::SET && class_tag.class_bits() == ClassTag::UNIVERSAL {
            ScopeBody::Set(Vec::new())
        } else {
            ScopeBody::Sequence(BytesMut::new())
        };
        self.scopes.push(EncoderScope {
            type_tag,
            class_tag,
            body,
        });
        Ok(self)
    }

    pub fn start_sequence(&mut self) -> BerResult<&mut Self> {
        self.start_cons(TypeTag::SEQUENCE, ClassTag::UNIVERSAL)
    }

    pub fn start_set(&mut self) -> BerResult<&mut Self> {
        self.start_cons(TypeTag::SET, ClassTag::UNIVERSAL)
    }

    /// Open an `[n] EXPLICIT` wrapper
    pub fn start_explicit(&mut self, tag: u32) -> BerResult<&mut Self> {
        self.start_cons(TypeTag(tag), ClassTag::CONTEXT_SPECIFIC)
    }

    /// Close the innermost constructed value
    ///
    /// # Error Handling
    /// `Encoding` if no constructed value is open.
    pub fn end_cons(&mut self) -> BerResult<&mut Self> {
        let Some(scope) = self.scopes.pop() else {
            return Err(BerError::Encoding(
                "end_cons called without a matching start_cons".to_string(),
            ));
        };
        let (type_tag, class_tag) = (scope.type_tag, scope.class_tag);
        let content = scope.finish();
        log::trace!(
            "closing {} with {} content bytes",
            describe_tag(type_tag, class_tag),
            content.len()
        );
        self.add_object(type_tag, class_tag, &content)
    }

    pub fn end_explicit(&mut self) -> BerResult<&mut Self> {
        self.end_cons()
    }

    /// Take the finished encoding
    ///
    /// # Error Handling
    /// `Encoding` if a constructed value is still open.
    pub fn get_contents(&mut self) -> BerResult<Vec<u8>> {
        if !self.scopes.is_empty() {
            return Err(BerError::Encoding(format!(
                "{} constructed value(s) not closed",
                self.scopes.len()
            )));
        }
        Ok(self.contents.split().to_vec())
    }

    /// Consume the encoder and return the finished encoding
    pub fn into_bytes(mut self) -> BerResult<Vec<u8>> {
        self.get_contents()
    }

    pub fn encode_null(&mut self) -> BerResult<&mut Self> {
        self.add_object(TypeTag::NULL, ClassTag::UNIVERSAL, &[])
    }

    /// Encode a BOOLEAN as 0x00 or 0xFF
    pub fn encode_bool(&mut self, value: bool) -> BerResult<&mut Self> {
        self.add_object(
            TypeTag::BOOLEAN,
            ClassTag::UNIVERSAL,
            &[if value { 0xFF } else { 0x00 }],
        )
    }

    /// Encode an INTEGER
    pub fn encode_bigint(&mut self, value: &BigInt) -> BerResult<&mut Self> {
        self.encode_bigint_tagged(value, TypeTag::INTEGER, ClassTag::UNIVERSAL)
    }

    /// Encode an implicitly tagged INTEGER
    ///
    /// # Encoding Format
    /// Minimal big-endian two's complement; zero is a single 0x00 byte.
    pub fn encode_bigint_tagged(
        &mut self,
        value: &BigInt,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<&mut Self> {
        self.add_object(type_tag, class_tag, &encode_integer_content(value))
    }

    pub fn encode_u64(&mut self, value: u64) -> BerResult<&mut Self> {
        self.encode_bigint(&BigInt::from(value))
    }

    pub fn encode_enumerated(&mut self, value: u32) -> BerResult<&mut Self> {
        self.encode_bigint_tagged(&BigInt::from(value), TypeTag::ENUMERATED, ClassTag::UNIVERSAL)
    }

    pub fn encode_octet_string(&mut self, value: &[u8]) -> BerResult<&mut Self> {
        self.add_object(TypeTag::OCTET_STRING, ClassTag::UNIVERSAL, value)
    }

    pub fn encode_octet_string_tagged(
        &mut self,
        value: &[u8],
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<&mut Self> {
        self.add_object(type_tag, class_tag, value)
    }

    /// Encode a BIT STRING
    pub fn encode_bit_string(&mut self, value: &BitString) -> BerResult<&mut Self> {
        self.encode_bit_string_tagged(value, TypeTag::BIT_STRING, ClassTag::UNIVERSAL)
    }

    /// Encode an implicitly tagged BIT STRING
    ///
    /// # Encoding Format
    /// - Value: unused bits count (1 byte) + bit string bytes
    pub fn encode_bit_string_tagged(
        &mut self,
        value: &BitString,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<&mut Self> {
        let mut content = Vec::with_capacity(value.as_bytes().len() + 1);
        content.push(value.unused_bits());
        content.extend_from_slice(value.as_bytes());
        self.add_object(type_tag, class_tag, &content)
    }

    pub fn encode_oid(&mut self, oid: &ObjectIdentifier) -> BerResult<&mut Self> {
        let content = encode_oid_content(oid)?;
        self.add_object(TypeTag::OBJECT_ID, ClassTag::UNIVERSAL, &content)
    }

    /// Encode any type implementing [`Asn1Encode`]
    pub fn encode<T: Asn1Encode + ?Sized>(&mut self, value: &T) -> BerResult<&mut Self> {
        value.encode_into(self)?;
        Ok(self)
    }

    /// Encode a SEQUENCE OF
    pub fn encode_list<T: Asn1Encode>(&mut self, values: &[T]) -> BerResult<&mut Self> {
        self.start_sequence()?;
        for value in values {
            value.encode_into(self)?;
        }
        self.end_cons()
    }

    /// Encode a field with a DEFAULT value; nothing is written when `value`
    /// equals `default`
    pub fn encode_optional<T>(&mut self, value: &T, default: &T) -> BerResult<&mut Self>
    where
        T: Asn1Encode + PartialEq,
    {
        if value != default {
            value.encode_into(self)?;
        }
        Ok(self)
    }

    /// Run `build` only when `condition` holds
    pub fn encode_if<F>(&mut self, condition: bool, build: F) -> BerResult<&mut Self>
    where
        F: FnOnce(&mut DerEncoder) -> BerResult<()>,
    {
        if condition {
            build(self)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_scenario() {
        let mut encoder = DerEncoder::new();
        encoder
            .start_sequence()
            .unwrap()
            .encode_u64(5)
            .unwrap()
            .encode_bool(true)
            .unwrap()
            .end_cons()
            .unwrap();
        assert_eq!(
            encoder.get_contents().unwrap(),
            vec![0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xFF]
        );
        // contents are taken, the encoder starts over
        assert!(encoder.get_contents().unwrap().is_empty());
    }

    #[test]
    fn test_set_sorted_on_close() {
        let mut encoder = DerEncoder::new();
        encoder.start_set().unwrap();
        encoder.encode_octet_string(&[0x02]).unwrap();
        encoder.encode_bool(false).unwrap();
        encoder.encode_octet_string(&[0x01]).unwrap();
        encoder.end_cons().unwrap();
        assert_eq!(
            encoder.into_bytes().unwrap(),
            vec![0x31, 0x09, 0x01, 0x01, 0x00, 0x04, 0x01, 0x01, 0x04, 0x01, 0x02]
        );
    }

    #[test]
    fn test_explicit_and_implicit_tags() {
        let mut encoder = DerEncoder::new();
        encoder.start_explicit(0).unwrap().encode_u64(2).unwrap().end_explicit().unwrap();
        encoder
            .encode_octet_string_tagged(&[0xAA], TypeTag(1), ClassTag::CONTEXT_SPECIFIC)
            .unwrap();
        assert_eq!(
            encoder.get_contents().unwrap(),
            vec![0xA0, 0x03, 0x02, 0x01, 0x02, 0x81, 0x01, 0xAA]
        );
    }

    #[test]
    fn test_misuse_is_an_error() {
        let mut encoder = DerEncoder::new();
        assert!(matches!(encoder.end_cons(), Err(BerError::Encoding(_))));

        encoder.start_sequence().unwrap();
        assert_eq!(encoder.depth(), 1);
        assert!(matches!(encoder.get_contents(), Err(BerError::Encoding(_))));
    }

    #[test]
    fn test_long_content_length() {
        let mut encoder = DerEncoder::new();
        encoder.encode_octet_string(&[0u8; 300]).unwrap();
        let der = encoder.into_bytes().unwrap();
        assert_eq!(&der[..4], &[0x04, 0x82, 0x01, 0x2C]);
        assert_eq!(der.len(), 304);
    }

    #[test]
    fn test_optional_and_conditional() {
        let mut encoder = DerEncoder::new();
        encoder.encode_optional(&false, &false).unwrap();
        encoder.encode_optional(&true, &false).unwrap();
        encoder.encode_if(false, |enc| enc.encode_null().map(|_| ())).unwrap();
        encoder.encode_if(true, |enc| enc.encode_null().map(|_| ())).unwrap();
        assert_eq!(encoder.get_contents().unwrap(), vec![0x01, 0x01, 0xFF, 0x05, 0x00]);
    }

    #[test]
    fn test_bit_string_and_list() {
        let mut encoder = DerEncoder::new();
        let bits = BitString::new(vec![0xA0], 5).unwrap();
        encoder.encode_bit_string(&bits).unwrap();
        encoder.encode_list(&[1u32, 2u32]).unwrap();
        assert_eq!(
            encoder.get_contents().unwrap(),
            vec![0x03, 0x02, 0x05, 0xA0, 0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
    }
}
