//! ASN.1 identifier vocabulary (type tags and class tags)
//!
//! An identifier octet group carries two pieces of information:
//! - **Class tag** (bits 8-6 of the first octet): the tag class plus the
//!   constructed/primitive flag
//! - **Type tag**: the tag number, either in the low 5 bits or, for
//!   numbers 31 and above, in continuation octets
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//!
//! The class tag is kept as the raw high bits of the identifier octet so
//! that "constructed SEQUENCE" is simply `ClassTag::UNIVERSAL | ClassTag::CONSTRUCTED`
//! and can be compared in one step.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Class of an ASN.1 tag, including the constructed flag
    ///
    /// `UNIVERSAL` is the empty set, so `contains(UNIVERSAL)` is always
    /// true; use [`ClassTag::class_bits`] to compare the class alone.
    pub struct ClassTag: u8 {
        /// Universal class (00)
        const UNIVERSAL = 0x00;
        /// Constructed encoding (content is a series of TLVs)
        const CONSTRUCTED = 0x20;
        /// Application class (01)
        const APPLICATION = 0x40;
        /// Context-specific class (10)
        const CONTEXT_SPECIFIC = 0x80;
        /// Private class (11)
        const PRIVATE = 0xC0;
        /// `[n] EXPLICIT` wrapper: constructed, context-specific
        const EXPLICIT_CONTEXT_SPECIFIC = 0xA0;
    }
}

impl ClassTag {
    /// Extract the class tag from the first identifier octet
    pub fn from_identifier(octet: u8) -> Self {
        ClassTag::from_bits_truncate(octet & 0xE0)
    }

    /// The class bits without the constructed flag
    pub fn class_bits(self) -> ClassTag {
        self & ClassTag::PRIVATE
    }

    /// Check if the constructed flag is set
    pub fn is_constructed(self) -> bool {
        self.contains(ClassTag::CONSTRUCTED)
    }
}

impl fmt::Display for ClassTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.class_bits().bits() {
            0x00 => "UNIVERSAL",
            0x40 => "APPLICATION",
            0x80 => "CONTEXT_SPECIFIC",
            _ => "PRIVATE",
        };
        if self.is_constructed() {
            write!(f, "{}/CONSTRUCTED", name)
        } else {
            f.write_str(name)
        }
    }
}

/// ASN.1 type tag (the tag number)
///
/// Long-form tags are limited to the 32-bit range; the decoder rejects
/// anything larger instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(pub u32);

impl TypeTag {
    pub const EOC: TypeTag = TypeTag(0x00);
    pub const BOOLEAN: TypeTag = TypeTag(0x01);
    pub const INTEGER: TypeTag = TypeTag(0x02);
    pub const BIT_STRING: TypeTag = TypeTag(0x03);
    pub const OCTET_STRING: TypeTag = TypeTag(0x04);
    pub const NULL: TypeTag = TypeTag(0x05);
    pub const OBJECT_ID: TypeTag = TypeTag(0x06);
    pub const ENUMERATED: TypeTag = TypeTag(0x0A);
    pub const UTF8_STRING: TypeTag = TypeTag(0x0C);
    pub const SEQUENCE: TypeTag = TypeTag(0x10);
    pub const SET: TypeTag = TypeTag(0x11);
    pub const NUMERIC_STRING: TypeTag = TypeTag(0x12);
    pub const PRINTABLE_STRING: TypeTag = TypeTag(0x13);
    pub const T61_STRING: TypeTag = TypeTag(0x14);
    pub const IA5_STRING: TypeTag = TypeTag(0x16);
    pub const UTC_TIME: TypeTag = TypeTag(0x17);
    pub const GENERALIZED_TIME: TypeTag = TypeTag(0x18);
    pub const VISIBLE_STRING: TypeTag = TypeTag(0x1A);
    pub const UNIVERSAL_STRING: TypeTag = TypeTag(0x1C);
    pub const BMP_STRING: TypeTag = TypeTag(0x1E);

    /// Get the tag number
    pub fn number(self) -> u32 {
        self.0
    }

    /// Name of a universal type, if this number has one
    pub fn universal_name(self) -> Option<&'static str> {
        let name = match self {
            TypeTag::EOC => "EOC",
            TypeTag::BOOLEAN => "BOOLEAN",
            TypeTag::INTEGER => "INTEGER",
            TypeTag::BIT_STRING => "BIT STRING",
            TypeTag::OCTET_STRING => "OCTET STRING",
            TypeTag::NULL => "NULL",
            TypeTag::OBJECT_ID => "OBJECT",
            TypeTag::ENUMERATED => "ENUMERATED",
            TypeTag::UTF8_STRING => "UTF8 STRING",
            TypeTag::SEQUENCE => "SEQUENCE",
            TypeTag::SET => "SET",
            TypeTag::NUMERIC_STRING => "NUMERIC STRING",
            TypeTag::PRINTABLE_STRING => "PRINTABLE STRING",
            TypeTag::T61_STRING => "T61 STRING",
            TypeTag::IA5_STRING => "IA5 STRING",
            TypeTag::UTC_TIME => "UTC TIME",
            TypeTag::GENERALIZED_TIME => "GENERALIZED TIME",
            TypeTag::VISIBLE_STRING => "VISIBLE STRING",
            TypeTag::UNIVERSAL_STRING => "UNIVERSAL STRING",
            TypeTag::BMP_STRING => "BMP STRING",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u32> for TypeTag {
    fn from(number: u32) -> Self {
        TypeTag(number)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human readable form of a (type tag, class tag) pair
///
/// Universal tags are shown by name, everything else as `[n]` with its
/// class, e.g. `SEQUENCE/CONSTRUCTED` or `[0] CONTEXT_SPECIFIC/CONSTRUCTED`.
pub fn describe_tag(type_tag: TypeTag, class_tag: ClassTag) -> String {
    if class_tag.class_bits() == ClassTag::UNIVERSAL {
        let name = match type_tag.universal_name() {
            Some(name) => name.to_string(),
            None => format!("UNIVERSAL {}", type_tag.0),
        };
        if class_tag.is_constructed() {
            format!("{}/CONSTRUCTED", name)
        } else {
            name
        }
    } else {
        format!("[{}] {}", type_tag.0, class_tag)
    }
}

/// Like [`describe_tag`] but accepts the "no object" sentinel
pub fn describe_optional_tag(tagging: Option<(TypeTag, ClassTag)>) -> String {
    match tagging {
        Some((type_tag, class_tag)) => describe_tag(type_tag, class_tag),
        None => "NO_OBJECT".to_string(),
    }
}
