//! A single decoded TLV unit

use crate::ber::types::{encode_length, encode_tag};
use pkasn_core::{describe_tag, BerError, BerResult, ClassTag, TypeTag};
use std::fmt;

/// One decoded BER object: tag, class and an owned copy of the value bytes
///
/// An object without tagging is the "no object" sentinel returned when the
/// source is exhausted; it is distinct from a present zero-length object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BerObject {
    tagging: Option<(TypeTag, ClassTag)>,
    value: Vec<u8>,
}

impl BerObject {
    /// Create an object with the given tagging and value
    pub fn new(type_tag: TypeTag, class_tag: ClassTag, value: Vec<u8>) -> Self {
        Self {
            tagging: Some((type_tag, class_tag)),
            value,
        }
    }

    /// The end-of-data sentinel
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if this object carries real decoded data
    pub fn is_set(&self) -> bool {
        self.tagging.is_some()
    }

    /// Tag and class, `None` for the sentinel
    pub fn tagging(&self) -> Option<(TypeTag, ClassTag)> {
        self.tagging
    }

    /// Type tag, `None` for the sentinel
    pub fn type_tag(&self) -> Option<TypeTag> {
        self.tagging.map(|(type_tag, _)| type_tag)
    }

    /// Class tag, `None` for the sentinel
    pub fn class_tag(&self) -> Option<ClassTag> {
        self.tagging.map(|(_, class_tag)| class_tag)
    }

    /// Check the tagging without failing
    pub fn is_a(&self, type_tag: TypeTag, class_tag: ClassTag) -> bool {
        self.tagging == Some((type_tag, class_tag))
    }

    /// Check if this is an End-Of-Contents marker
    pub fn is_eoc(&self) -> bool {
        self.is_a(TypeTag::EOC, ClassTag::UNIVERSAL)
    }

    /// Fail with a `BadTag` error unless the tagging matches
    ///
    /// `context` names what was being decoded and ends up in the error.
    pub fn assert_is_a(
        &self,
        type_tag: TypeTag,
        class_tag: ClassTag,
        context: &str,
    ) -> BerResult<()> {
        if self.is_a(type_tag, class_tag) {
            return Ok(());
        }
        let context = if context.is_empty() {
            describe_tag(type_tag, class_tag)
        } else {
            context.to_string()
        };
        Err(BerError::bad_tag(context, type_tag, class_tag, self.tagging))
    }

    /// Replace the tagging (used to decode implicitly tagged values)
    pub fn set_tagging(&mut self, type_tag: TypeTag, class_tag: ClassTag) {
        self.tagging = Some((type_tag, class_tag));
    }

    /// The value bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consume the object and return the value bytes
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Length of the value in bytes
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Size the value buffer to `length` zero bytes and hand it out for filling
    pub(crate) fn mutable_bits(&mut self, length: usize) -> &mut [u8] {
        self.value.clear();
        self.value.resize(length, 0);
        &mut self.value
    }

    /// Drop the EOC marker that closes indefinite-length content
    pub(crate) fn strip_eoc(&mut self) -> BerResult<()> {
        if !self.value.ends_with(&[0x00, 0x00]) {
            return Err(BerError::InvalidData(
                "indefinite-length content without EOC marker".to_string(),
            ));
        }
        self.value.truncate(self.value.len() - 2);
        Ok(())
    }

    /// Re-encode the object as a definite-length TLV
    pub fn to_der(&self) -> BerResult<Vec<u8>> {
        let Some((type_tag, class_tag)) = self.tagging else {
            return Err(BerError::Encoding("cannot encode an unset object".to_string()));
        };
        let mut out = encode_tag(type_tag, class_tag);
        out.extend_from_slice(&encode_length(self.value.len()));
        out.extend_from_slice(&self.value);
        Ok(out)
    }
}

impl fmt::Display for BerObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tagging {
            Some((type_tag, class_tag)) => {
                write!(f, "{} ({} bytes)", describe_tag(type_tag, class_tag), self.value.len())
            }
            None => f.write_str("NO_OBJECT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_vs_empty() {
        let none = BerObject::none();
        assert!(!none.is_set());
        assert!(none.type_tag().is_none());

        let null = BerObject::new(TypeTag::NULL, ClassTag::UNIVERSAL, Vec::new());
        assert!(null.is_set());
        assert!(null.is_empty());
        assert_ne!(none, null);
    }

    #[test]
    fn test_assert_is_a() {
        let obj = BerObject::new(TypeTag::INTEGER, ClassTag::UNIVERSAL, vec![0x05]);
        assert!(obj.assert_is_a(TypeTag::INTEGER, ClassTag::UNIVERSAL, "").is_ok());

        match obj.assert_is_a(TypeTag::SEQUENCE, ClassTag::CONSTRUCTED, "") {
            Err(BerError::BadTag {
                expected_type,
                expected_class,
                actual,
                ..
            }) => {
                assert_eq!(expected_type, TypeTag::SEQUENCE);
                assert_eq!(expected_class, ClassTag::CONSTRUCTED);
                assert_eq!(actual, Some((TypeTag::INTEGER, ClassTag::UNIVERSAL)));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let err = BerObject::none()
            .assert_is_a(TypeTag::BOOLEAN, ClassTag::UNIVERSAL, "flag")
            .unwrap_err();
        assert!(matches!(err, BerError::BadTag { actual: None, .. }));
    }

    #[test]
    fn test_to_der() {
        let obj = BerObject::new(TypeTag::OCTET_STRING, ClassTag::UNIVERSAL, vec![0xAB; 200]);
        let der = obj.to_der().unwrap();
        assert_eq!(&der[..3], &[0x04, 0x81, 0xC8]);
        assert_eq!(der.len(), 203);
        assert!(BerObject::none().to_der().is_err());
    }
}
