//! BER decoder for ASN.1 structures
//!
//! # Usage Example
//!
//! ```rust
//! use pkasn_ber::ber::BerDecoder;
//!
//! // SEQUENCE { INTEGER 5, BOOLEAN TRUE }
//! let data = [0x30, 0x06, 0x02, 0x01, 0x05, 0x01, 0x01, 0xFF];
//! let mut decoder = BerDecoder::new(&data);
//! decoder.start_sequence()?;
//! let number = decoder.decode_u32()?;
//! let flag = decoder.decode_bool()?;
//! decoder.end_cons()?.verify_end()?;
//! assert_eq!((number, flag), (5, true));
//! # Ok::<(), pkasn_core::BerError>(())
//! ```
//!
//! # Scopes
//!
//! `start_cons` reads one constructed object and makes its content the
//! current source; `end_cons` checks that content was fully consumed and
//! returns to the enclosing level. Open scopes are kept on an explicit
//! stack inside the decoder, so the nesting of a structure never turns into
//! nesting of decoder objects.
//!
//! # Push Back
//!
//! Every level has a single push-back slot. Grammars with OPTIONAL fields
//! read the next object, look at its tag and push it back if it belongs to
//! a later field.

use crate::ber::config::{DecoderConfig, PaddingBits};
use crate::ber::integer::{decode_integer_content, is_minimal_integer, to_constrained};
use crate::ber::object::BerObject;
use crate::ber::oid::decode_oid_content;
use crate::ber::source::{ByteSource, MemorySource};
use crate::ber::traits::Asn1Decode;
use crate::ber::types::{decode_length, decode_tag, LengthForm};
use num_bigint::{BigInt, BigUint, Sign};
use pkasn_core::{
    describe_tag, BerError, BerResult, BitString, ClassTag, ObjectIdentifier, OctetString,
    TypeTag,
};
use std::fmt;

/// Where the outermost level reads from
enum RootSource<'a> {
    /// Buffer handed to the decoder (borrowed or owned)
    Memory(MemorySource<'a>),
    /// Source owned by the caller
    External(&'a mut dyn ByteSource),
}

/// An open constructed value
struct Scope {
    source: MemorySource<'static>,
    pushed: Option<BerObject>,
    type_tag: TypeTag,
    class_tag: ClassTag,
}

/// Stateful BER decoder
///
/// # Error Handling
///
/// Every operation returns `BerResult`; a malformed object anywhere in a
/// structure fails the whole decode and no partially decoded value is
/// returned.
pub struct BerDecoder<'a> {
    root: RootSource<'a>,
    root_pushed: Option<BerObject>,
    scopes: Vec<Scope>,
    config: DecoderConfig,
}

impl<'a> BerDecoder<'a> {
    /// Create a decoder over a borrowed buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self::from_root(RootSource::Memory(MemorySource::new(data)))
    }

    /// Create a decoder reading from a caller-owned source
    pub fn from_source(source: &'a mut dyn ByteSource) -> Self {
        Self::from_root(RootSource::External(source))
    }

    fn from_root(root: RootSource<'a>) -> Self {
        Self {
            root,
            root_pushed: None,
            scopes: Vec::new(),
            config: DecoderConfig::default(),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of constructed scopes currently open
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Source and push-back slot of the current level
    fn cursor(&mut self) -> (&mut (dyn ByteSource + 'a), &mut Option<BerObject>) {
        match self.scopes.last_mut() {
            Some(scope) => (&mut scope.source, &mut scope.pushed),
            None => {
                let source: &mut (dyn ByteSource + 'a) = match &mut self.root {
                    RootSource::Memory(memory) => memory,
                    RootSource::External(source) => &mut **source,
                };
                (source, &mut self.root_pushed)
            }
        }
    }

    /// Check if the current level has more objects
    pub fn more_items(&mut self) -> BerResult<bool> {
        let (source, pushed) = self.cursor();
        if is_pending(pushed) {
            return Ok(true);
        }
        Ok(!source.end_of_data()?)
    }

    /// Read the next object of the current level
    ///
    /// Returns the push-back object if there is one. At end of data the
    /// unset sentinel object is returned; that is not an error. EOC markers
    /// are skipped.
    pub fn get_next_object(&mut self) -> BerResult<BerObject> {
        let config = self.config;
        let (source, pushed) = self.cursor();
        if let Some(object) = pushed.take() {
            return Ok(object);
        }
        read_object(source, &config)
    }

    /// Read the next object and push it straight back
    pub fn peek_next_object(&mut self) -> BerResult<BerObject> {
        let object = self.get_next_object()?;
        self.push_back(object.clone())?;
        Ok(object)
    }

    /// Return an object to the current level so the next read yields it
    ///
    /// # Error Handling
    /// Fails with `PushBackPending` if an object is already pushed back.
    pub fn push_back(&mut self, object: BerObject) -> BerResult<()> {
        let (_, pushed) = self.cursor();
        if pushed.is_some() {
            return Err(BerError::PushBackPending);
        }
        *pushed = Some(object);
        Ok(())
    }

    /// Descend into a constructed value
    ///
    /// The CONSTRUCTED bit is added to `class_tag` before the tag check.
    pub fn start_cons(&mut self, type_tag: TypeTag, class_tag: ClassTag) -> BerResult<&mut Self> {
        let class_tag = class_tag | ClassTag::CONSTRUCTED;
        let object = self.get_next_object()?;
        object.assert_is_a(type_tag, class_tag, "")?;

        log::debug!(
            "entering {} ({} bytes) at depth {}",
            describe_tag(type_tag, class_tag),
            object.len(),
            self.scopes.len()
        );
        self.scopes.push(Scope {
            source: MemorySource::from_vec(object.into_value()),
            pushed: None,
            type_tag,
            class_tag,
        });
        Ok(self)
    }

    /// Descend into a SEQUENCE
    pub fn start_sequence(&mut self) -> BerResult<&mut Self> {
        self.start_cons(TypeTag::SEQUENCE, ClassTag::UNIVERSAL)
    }

    /// Descend into a SET
    pub fn start_set(&mut self) -> BerResult<&mut Self> {
        self.start_cons(TypeTag::SET, ClassTag::UNIVERSAL)
    }

    /// Descend into an `[n] EXPLICIT` wrapper
    pub fn start_explicit(&mut self, tag: u32) -> BerResult<&mut Self> {
        self.start_cons(TypeTag(tag), ClassTag::CONTEXT_SPECIFIC)
    }

    /// Leave the current constructed value
    ///
    /// # Error Handling
    /// - `NullParent` if no scope is open
    /// - `DataLeft` if the content was not fully consumed
    pub fn end_cons(&mut self) -> BerResult<&mut Self> {
        let depth = self.scopes.len();
        let Some(scope) = self.scopes.last_mut() else {
            return Err(BerError::NullParent);
        };
        if is_pending(&scope.pushed) || scope.source.remaining() != 0 {
            log::debug!(
                "{} closed with {} bytes left",
                describe_tag(scope.type_tag, scope.class_tag),
                scope.source.remaining()
            );
            return Err(BerError::DataLeft);
        }
        log::debug!(
            "leaving {} at depth {}",
            describe_tag(scope.type_tag, scope.class_tag),
            depth - 1
        );
        self.scopes.pop();
        Ok(self)
    }

    /// Leave an `[n] EXPLICIT` wrapper
    pub fn end_explicit(&mut self) -> BerResult<&mut Self> {
        self.end_cons()
    }

    /// Fail unless the current level is exhausted
    pub fn verify_end(&mut self) -> BerResult<&mut Self> {
        self.verify_end_with("BerDecoder::verify_end called, but data remains")
    }

    /// Like [`verify_end`](Self::verify_end) with a caller supplied message
    pub fn verify_end_with(&mut self, message: &str) -> BerResult<&mut Self> {
        if self.more_items()? {
            return Err(BerError::DataRemains(message.to_string()));
        }
        Ok(self)
    }

    /// Drop everything left at the current level
    pub fn discard_remaining(&mut self) -> BerResult<&mut Self> {
        let (source, pushed) = self.cursor();
        *pushed = None;
        while source.discard_next(4096)? > 0 {}
        Ok(self)
    }

    /// All bytes left at the current level, including a pushed back object
    pub fn raw_bytes(&mut self) -> BerResult<Vec<u8>> {
        let (source, pushed) = self.cursor();
        let mut out = match pushed.take() {
            Some(object) if object.is_set() => object.to_der()?,
            _ => Vec::new(),
        };
        let mut chunk = [0u8; 4096];
        loop {
            let got = source.read(&mut chunk)?;
            if got == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..got]);
        }
        Ok(out)
    }

    /// Read a primitive object with the given tagging
    fn get_primitive(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
        context: &str,
    ) -> BerResult<BerObject> {
        let object = self.get_next_object()?;
        object.assert_is_a(type_tag, class_tag, context)?;
        Ok(object)
    }

    /// Read an object of known tagging and size and return its value
    pub fn get_next_value(
        &mut self,
        size: usize,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<Vec<u8>> {
        let object = self.get_primitive(type_tag, class_tag, "")?;
        if object.len() != size {
            return Err(BerError::InvalidData(format!(
                "{} size {} does not match expected {}",
                describe_tag(type_tag, class_tag),
                object.len(),
                size
            )));
        }
        Ok(object.into_value())
    }

    /// Decode a BOOLEAN
    pub fn decode_bool(&mut self) -> BerResult<bool> {
        self.decode_bool_tagged(TypeTag::BOOLEAN, ClassTag::UNIVERSAL)
    }

    /// Decode an implicitly tagged BOOLEAN
    ///
    /// # Error Handling
    /// `InvalidBooleanSize` unless the content is exactly one byte.
    pub fn decode_bool_tagged(&mut self, type_tag: TypeTag, class_tag: ClassTag) -> BerResult<bool> {
        let object = self.get_primitive(type_tag, class_tag, "BOOLEAN")?;
        let [value] = object.value() else {
            return Err(BerError::InvalidBooleanSize(object.len()));
        };
        if self.config.require_der_boolean && *value != 0x00 && *value != 0xFF {
            return Err(BerError::NotDer(format!("BOOLEAN content {:#04x}", value)));
        }
        Ok(*value != 0x00)
    }

    /// Decode a NULL
    pub fn decode_null(&mut self) -> BerResult<()> {
        self.decode_null_tagged(TypeTag::NULL, ClassTag::UNIVERSAL)
    }

    pub fn decode_null_tagged(&mut self, type_tag: TypeTag, class_tag: ClassTag) -> BerResult<()> {
        let object = self.get_primitive(type_tag, class_tag, "NULL")?;
        if !object.is_empty() {
            return Err(BerError::InvalidNull(object.len()));
        }
        Ok(())
    }

    /// Decode an INTEGER of any size
    pub fn decode_bigint(&mut self) -> BerResult<BigInt> {
        self.decode_bigint_tagged(TypeTag::INTEGER, ClassTag::UNIVERSAL)
    }

    /// Decode an implicitly tagged INTEGER (also used for ENUMERATED)
    pub fn decode_bigint_tagged(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<BigInt> {
        let object = self.get_primitive(type_tag, class_tag, "INTEGER")?;
        if self.config.require_minimal_integer && !is_minimal_integer(object.value()) {
            return Err(BerError::NotDer("non-minimal INTEGER encoding".to_string()));
        }
        Ok(decode_integer_content(object.value()))
    }

    /// Decode a non-negative INTEGER of at most `width` bytes
    ///
    /// # Error Handling
    /// - `InvalidData` if `width` is above 8 (checked before reading)
    /// - `NegativeInteger` / `ValueTooLarge` if the value does not fit
    pub fn decode_small_integer(&mut self, width: usize) -> BerResult<u64> {
        self.decode_small_integer_tagged(width, TypeTag::INTEGER, ClassTag::UNIVERSAL)
    }

    pub fn decode_small_integer_tagged(
        &mut self,
        width: usize,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<u64> {
        if width > 8 {
            return Err(BerError::InvalidData(format!(
                "cannot decode a {} byte integer into 64 bits",
                width
            )));
        }
        let value = self.decode_bigint_tagged(type_tag, class_tag)?;
        to_constrained(&value, width)
    }

    /// Decode an INTEGER into a fixed-width unsigned type
    pub fn decode_integer_type<T: FixedWidthUint>(&mut self) -> BerResult<T> {
        self.decode_integer_type_tagged(TypeTag::INTEGER, ClassTag::UNIVERSAL)
    }

    pub fn decode_integer_type_tagged<T: FixedWidthUint>(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<T> {
        let value = self.decode_small_integer_tagged(T::BYTES, type_tag, class_tag)?;
        Ok(T::from_u64(value))
    }

    /// Decode an INTEGER that must fit in 32 bits
    pub fn decode_u32(&mut self) -> BerResult<u32> {
        self.decode_integer_type::<u32>()
    }

    /// Decode an ENUMERATED
    pub fn decode_enumerated(&mut self) -> BerResult<u32> {
        self.decode_integer_type_tagged::<u32>(TypeTag::ENUMERATED, ClassTag::UNIVERSAL)
    }

    /// Decode an OCTET STRING
    pub fn decode_octet_string(&mut self) -> BerResult<OctetString> {
        self.decode_octet_string_tagged(TypeTag::OCTET_STRING, ClassTag::UNIVERSAL)
    }

    pub fn decode_octet_string_tagged(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<OctetString> {
        let object = self.get_primitive(type_tag, class_tag, "OCTET STRING")?;
        Ok(OctetString::new(object.into_value()))
    }

    /// Decode an OCTET STRING and return the raw bytes
    pub fn get_next_octet_string(&mut self) -> BerResult<Vec<u8>> {
        Ok(self.decode_octet_string()?.into_bytes())
    }

    /// Decode an unsigned big-endian integer carried in an OCTET STRING
    pub fn decode_octet_string_bigint(&mut self) -> BerResult<BigInt> {
        let bytes = self.get_next_octet_string()?;
        Ok(BigInt::from_biguint(Sign::Plus, BigUint::from_bytes_be(&bytes)))
    }

    /// Decode a BIT STRING
    pub fn decode_bit_string(&mut self) -> BerResult<BitString> {
        self.decode_bit_string_tagged(TypeTag::BIT_STRING, ClassTag::UNIVERSAL)
    }

    /// Decode an implicitly tagged BIT STRING
    ///
    /// # Decoding Format
    /// The first content byte is the count of unused bits (0-7) in the last
    /// byte; the remaining bytes are the bits. Non-zero padding bits are
    /// cleared or rejected depending on [`DecoderConfig::bit_string_padding`].
    pub fn decode_bit_string_tagged(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<BitString> {
        let object = self.get_primitive(type_tag, class_tag, "BIT STRING")?;
        let Some((&unused_bits, payload)) = object.value().split_first() else {
            return Err(BerError::InvalidBitString("missing unused bits byte".to_string()));
        };
        if unused_bits >= 8 {
            return Err(BerError::InvalidBitString(format!(
                "unused bits count {}",
                unused_bits
            )));
        }
        if let Some(last) = payload.last() {
            let padding = last & !(0xFFu8 << unused_bits);
            if padding != 0 {
                match self.config.bit_string_padding {
                    PaddingBits::Mask => {
                        log::warn!("clearing non-zero BIT STRING padding bits {:#04x}", padding)
                    }
                    PaddingBits::Reject => {
                        return Err(BerError::InvalidBitString(
                            "non-zero padding bits".to_string(),
                        ));
                    }
                }
            }
        }
        BitString::new(payload.to_vec(), unused_bits)
    }

    /// Decode an OBJECT IDENTIFIER
    pub fn decode_oid(&mut self) -> BerResult<ObjectIdentifier> {
        self.decode_oid_tagged(TypeTag::OBJECT_ID, ClassTag::UNIVERSAL)
    }

    pub fn decode_oid_tagged(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<ObjectIdentifier> {
        let object = self.get_primitive(type_tag, class_tag, "OBJECT")?;
        decode_oid_content(object.value())
    }

    /// Decode any type implementing [`Asn1Decode`]
    pub fn decode<T: Asn1Decode>(&mut self) -> BerResult<T> {
        T::decode_from(self)
    }

    /// Decode and compare against an expected value
    pub fn decode_and_check<T>(&mut self, expected: &T, message: &str) -> BerResult<&mut Self>
    where
        T: Asn1Decode + PartialEq + fmt::Debug,
    {
        let actual = T::decode_from(self)?;
        if &actual != expected {
            return Err(BerError::InvalidData(format!(
                "{} (expected {:?}, got {:?})",
                message, expected, actual
            )));
        }
        Ok(self)
    }

    /// Decode an OPTIONAL field identified by its tag
    ///
    /// If the next object does not carry `(type_tag, class_tag)` it is
    /// pushed back and `None` is returned. A constructed context-specific
    /// tag is treated as an `[n] EXPLICIT` wrapper around `T`; any other tag
    /// must be `T`'s own tag.
    pub fn decode_optional<T: Asn1Decode>(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
    ) -> BerResult<Option<T>> {
        let object = self.get_next_object()?;
        if !object.is_a(type_tag, class_tag) {
            self.push_back(object)?;
            return Ok(None);
        }

        if class_tag.is_constructed() && class_tag.class_bits() == ClassTag::CONTEXT_SPECIFIC {
            let mut inner = BerDecoder::from_object(object).with_config(self.config);
            let value = T::decode_from(&mut inner)?;
            inner.verify_end()?;
            return Ok(Some(value));
        }

        self.push_back(object)?;
        T::decode_from(self).map(Some)
    }

    /// Decode an OPTIONAL `[n] IMPLICIT` field
    ///
    /// A matching object is re-tagged to `(real_type, real_class)` before
    /// `T` decodes it.
    pub fn decode_optional_implicit<T: Asn1Decode>(
        &mut self,
        type_tag: TypeTag,
        class_tag: ClassTag,
        real_type: TypeTag,
        real_class: ClassTag,
    ) -> BerResult<Option<T>> {
        let mut object = self.get_next_object()?;
        if !object.is_a(type_tag, class_tag) {
            self.push_back(object)?;
            return Ok(None);
        }
        object.set_tagging(real_type, real_class);
        self.push_back(object)?;
        T::decode_from(self).map(Some)
    }

    /// Decode a SEQUENCE OF `T`
    pub fn decode_list<T: Asn1Decode>(&mut self) -> BerResult<Vec<T>> {
        self.decode_collection(TypeTag::SEQUENCE)
    }

    /// Decode a SET OF `T`
    pub fn decode_set_of<T: Asn1Decode>(&mut self) -> BerResult<Vec<T>> {
        self.decode_collection(TypeTag::SET)
    }

    fn decode_collection<T: Asn1Decode>(&mut self, type_tag: TypeTag) -> BerResult<Vec<T>> {
        self.start_cons(type_tag, ClassTag::UNIVERSAL)?;
        let mut items = Vec::new();
        while self.more_items()? {
            items.push(T::decode_from(self)?);
        }
        self.end_cons()?;
        Ok(items)
    }
}

impl BerDecoder<'static> {
    /// Create a decoder that owns its buffer
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_root(RootSource::Memory(MemorySource::from_vec(data)))
    }

    /// Create a decoder over the value of a decoded object
    pub fn from_object(object: BerObject) -> Self {
        Self::from_vec(object.into_value())
    }
}

/// Read one object from a source, skipping EOC markers
fn read_object(source: &mut dyn ByteSource, config: &DecoderConfig) -> BerResult<BerObject> {
    loop {
        let Some(tag) = decode_tag(source)? else {
            return Ok(BerObject::none());
        };
        let length = decode_length(source, config.max_indefinite_nesting)?;
        config.check_length(&length)?;

        if !source.check_available(length.value)? {
            return Err(BerError::ValueTruncated);
        }
        let mut object = BerObject::new(tag.type_tag, tag.class_tag, Vec::new());
        if source.read(object.mutable_bits(length.value))? != length.value {
            return Err(BerError::ValueTruncated);
        }
        if length.form == LengthForm::Indefinite {
            object.strip_eoc()?;
        }

        if object.is_eoc() {
            if !object.is_empty() {
                return Err(BerError::InvalidData(
                    "EOC marker with non-zero length".to_string(),
                ));
            }
            continue;
        }

        log::trace!("decoded {}", object);
        return Ok(object);
    }
}

fn is_pending(pushed: &Option<BerObject>) -> bool {
    pushed.as_ref().is_some_and(BerObject::is_set)
}

/// Unsigned integer types that [`BerDecoder::decode_integer_type`] can fill
pub trait FixedWidthUint: Sized {
    /// Width of the type in bytes
    const BYTES: usize;

    fn from_u64(value: u64) -> Self;
}

macro_rules! fixed_width_uint {
    ($($ty:ty),*) => {
        $(
            impl FixedWidthUint for $ty {
                const BYTES: usize = std::mem::size_of::<$ty>();

                fn from_u64(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

fixed_width_uint!(u8, u16, u32, u64);
