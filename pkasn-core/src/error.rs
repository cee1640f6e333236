use crate::tag::{describe_optional_tag, describe_tag, ClassTag, TypeTag};
use thiserror::Error;

/// Main error type for BER/DER encoding and decoding
///
/// Every malformed-input condition has its own variant so that callers can
/// tell a truncated value from a bad tag or an exhausted nesting budget
/// without parsing messages.
#[derive(Error, Debug)]
pub enum BerError {
    #[error("Tag mismatch when decoding {context}: expected {}, got {}",
        expected_tag(.expected_type, .expected_class), actual_tag(.actual))]
    BadTag {
        context: String,
        expected_type: TypeTag,
        expected_class: ClassTag,
        actual: Option<(TypeTag, ClassTag)>,
    },

    #[error("Long-form tag overflowed 32 bits")]
    TagTooLarge,

    #[error("Long-form tag truncated")]
    TruncatedTag,

    #[error("Length field not found")]
    LengthNotFound,

    #[error("Length field truncated")]
    LengthTruncated,

    #[error("Length field is too large: {0} length octets (max 4)")]
    LengthTooLarge(usize),

    #[error("Length field overflow")]
    LengthOverflow,

    #[error("Nested indefinite length encodings too deep")]
    NestingTooDeep,

    #[error("Value truncated")]
    ValueTruncated,

    #[error("Invalid BOOLEAN size: {0}")]
    InvalidBooleanSize(usize),

    #[error("NULL object had nonzero size: {0}")]
    InvalidNull(usize),

    #[error("Invalid BIT STRING: {0}")]
    InvalidBitString(String),

    #[error("Decoded integer value larger than expected ({0} bytes allowed)")]
    ValueTooLarge(usize),

    #[error("Decoded integer value was negative")]
    NegativeInteger,

    #[error("Data remains: {0}")]
    DataRemains(String),

    #[error("Data left in constructed value")]
    DataLeft,

    #[error("end_cons called with null parent")]
    NullParent,

    #[error("Only one push back is allowed")]
    PushBackPending,

    #[error("Not DER: {0}")]
    NotDer(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unknown critical extension: {0}")]
    UnknownCriticalExtension(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BerError {
    /// Build a tag mismatch error
    pub fn bad_tag(
        context: impl Into<String>,
        expected_type: TypeTag,
        expected_class: ClassTag,
        actual: Option<(TypeTag, ClassTag)>,
    ) -> Self {
        BerError::BadTag {
            context: context.into(),
            expected_type,
            expected_class,
            actual,
        }
    }
}

fn expected_tag(type_tag: &TypeTag, class_tag: &ClassTag) -> String {
    describe_tag(*type_tag, *class_tag)
}

fn actual_tag(actual: &Option<(TypeTag, ClassTag)>) -> String {
    describe_optional_tag(*actual)
}

/// Result type alias for BER/DER operations
pub type BerResult<T> = Result<T, BerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_tag_message() {
        let err = BerError::bad_tag(
            "object",
            TypeTag::SEQUENCE,
            ClassTag::CONSTRUCTED,
            Some((TypeTag::INTEGER, ClassTag::UNIVERSAL)),
        );
        assert_eq!(
            err.to_string(),
            "Tag mismatch when decoding object: expected SEQUENCE/CONSTRUCTED, got INTEGER"
        );
    }
}
