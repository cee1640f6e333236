//! X.509 v3 extensions
//!
//! ```text
//! Extensions ::= SEQUENCE SIZE (1..MAX) OF Extension
//!
//! Extension ::= SEQUENCE {
//!     extnID      OBJECT IDENTIFIER,
//!     critical    BOOLEAN DEFAULT FALSE,
//!     extnValue   OCTET STRING }
//! ```
//!
//! `extnValue` holds the DER encoding of the extension payload. Payloads
//! this crate understands ([`BasicConstraints`], [`KeyUsage`]) can be
//! decoded from an [`Extension`]; everything else stays opaque.

use crate::oids;
use bitflags::bitflags;
use pkasn_ber::{Asn1Decode, Asn1Encode, BerDecoder, DerEncoder};
use pkasn_core::{BerError, BerResult, BitString, ClassTag, ObjectIdentifier, TypeTag};
use std::collections::HashSet;

/// What to do with a critical extension whose OID is not recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCriticalPolicy {
    /// Fail with `UnknownCriticalExtension`
    Reject,
    /// Keep the extension and leave the decision to the caller
    Keep,
}

/// A single extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    oid: ObjectIdentifier,
    critical: bool,
    value: Vec<u8>,
}

impl Extension {
    pub fn new(oid: ObjectIdentifier, critical: bool, value: Vec<u8>) -> Self {
        Self {
            oid,
            critical,
            value,
        }
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// The DER encoded payload (content of `extnValue`)
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Decode the payload as `T`; the payload must be consumed completely
    pub fn decode_value<T: Asn1Decode>(&self) -> BerResult<T> {
        let mut decoder = BerDecoder::new(&self.value);
        let value = T::decode_from(&mut decoder)?;
        decoder.verify_end_with("extension payload has trailing data")?;
        Ok(value)
    }
}

impl Asn1Decode for Extension {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.start_sequence()?;
        let oid = decoder.decode_oid()?;
        let critical = decoder
            .decode_optional::<bool>(TypeTag::BOOLEAN, ClassTag::UNIVERSAL)?
            .unwrap_or(false);
        let value = decoder.get_next_octet_string()?;
        decoder.end_cons()?;
        Ok(Self {
            oid,
            critical,
            value,
        })
    }
}

impl Asn1Encode for Extension {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder
            .start_sequence()?
            .encode_oid(&self.oid)?
            .encode_optional(&self.critical, &false)?
            .encode_octet_string(&self.value)?
            .end_cons()?;
        Ok(())
    }
}

/// An ordered list of extensions with unique OIDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    extensions: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extension
    ///
    /// # Error Handling
    /// `InvalidData` if an extension with the same OID is already present.
    pub fn add(&mut self, extension: Extension) -> BerResult<()> {
        if self.get(extension.oid()).is_some() {
            return Err(BerError::InvalidData(format!(
                "Duplicate extension {}",
                extension.oid()
            )));
        }
        self.extensions.push(extension);
        Ok(())
    }

    pub fn get(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.oid() == oid)
    }

    /// Look an extension up by the arcs of its OID
    pub fn find(&self, arcs: &[u32]) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.oid().components() == arcs)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Critical extensions whose OID is not in `recognised`
    pub fn unknown_critical<'e>(&'e self, recognised: &[&[u32]]) -> Vec<&'e Extension> {
        self.extensions
            .iter()
            .filter(|e| e.is_critical() && !recognised.contains(&e.oid().components()))
            .collect()
    }

    /// Decode and apply `policy` to critical extensions outside `recognised`
    ///
    /// # Error Handling
    /// - `UnknownCriticalExtension` under [`UnknownCriticalPolicy::Reject`]
    /// - `InvalidData` for duplicate extension OIDs
    pub fn decode_with_policy(
        decoder: &mut BerDecoder<'_>,
        recognised: &[&[u32]],
        policy: UnknownCriticalPolicy,
    ) -> BerResult<Self> {
        let extensions = Self::decode_from(decoder)?;
        for extension in extensions.unknown_critical(recognised) {
            match policy {
                UnknownCriticalPolicy::Reject => {
                    return Err(BerError::UnknownCriticalExtension(extension.oid().to_string()));
                }
                UnknownCriticalPolicy::Keep => {
                    log::warn!("keeping unrecognised critical extension {}", extension.oid())
                }
            }
        }
        Ok(extensions)
    }

    /// [`decode_with_policy`](Self::decode_with_policy) against
    /// [`oids::RECOGNISED_EXTENSIONS`]
    pub fn decode_strict(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        Self::decode_with_policy(
            decoder,
            oids::RECOGNISED_EXTENSIONS,
            UnknownCriticalPolicy::Reject,
        )
    }
}

impl Asn1Decode for Extensions {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        let list: Vec<Extension> = decoder.decode_list()?;
        let mut seen = HashSet::new();
        let mut extensions = Extensions::new();
        for extension in list {
            if !seen.insert(extension.oid().clone()) {
                return Err(BerError::InvalidData(format!(
                    "Duplicate extension {}",
                    extension.oid()
                )));
            }
            extensions.extensions.push(extension);
        }
        Ok(extensions)
    }
}

impl Asn1Encode for Extensions {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_list(&self.extensions)?;
        Ok(())
    }
}

/// Basic constraints payload
///
/// ```text
/// BasicConstraints ::= SEQUENCE {
///     cA                  BOOLEAN DEFAULT FALSE,
///     pathLenConstraint   INTEGER (0..MAX) OPTIONAL }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConstraints {
    pub ca: bool,
    pub path_len: Option<u32>,
}

impl BasicConstraints {
    /// Wrap the payload in an extension
    pub fn to_extension(&self, critical: bool) -> BerResult<Extension> {
        let mut encoder = DerEncoder::new();
        self.encode_into(&mut encoder)?;
        Ok(Extension::new(
            ObjectIdentifier::new(oids::BASIC_CONSTRAINTS.to_vec())?,
            critical,
            encoder.into_bytes()?,
        ))
    }
}

impl Asn1Decode for BasicConstraints {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.start_sequence()?;
        let ca = decoder
            .decode_optional::<bool>(TypeTag::BOOLEAN, ClassTag::UNIVERSAL)?
            .unwrap_or(false);
        let path_len = decoder.decode_optional::<u32>(TypeTag::INTEGER, ClassTag::UNIVERSAL)?;
        decoder.end_cons()?;
        Ok(Self { ca, path_len })
    }
}

impl Asn1Encode for BasicConstraints {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder
            .start_sequence()?
            .encode_optional(&self.ca, &false)?
            .encode_if(self.path_len.is_some(), |enc| {
                enc.encode_u64(u64::from(self.path_len.unwrap_or(0))).map(|_| ())
            })?
            .end_cons()?;
        Ok(())
    }
}

bitflags! {
    /// Key usage payload (a named BIT STRING)
    ///
    /// Bit 0 of the BIT STRING (digitalSignature) is the most significant
    /// bit of the first byte, so the flags are laid out big-endian over the
    /// first two bytes.
    pub struct KeyUsage: u16 {
        const DIGITAL_SIGNATURE = 1 << 15;
        const NON_REPUDIATION = 1 << 14;
        const KEY_ENCIPHERMENT = 1 << 13;
        const DATA_ENCIPHERMENT = 1 << 12;
        const KEY_AGREEMENT = 1 << 11;
        const KEY_CERT_SIGN = 1 << 10;
        const CRL_SIGN = 1 << 9;
        const ENCIPHER_ONLY = 1 << 8;
        const DECIPHER_ONLY = 1 << 7;
    }
}

impl KeyUsage {
    /// Wrap the payload in an extension
    pub fn to_extension(&self, critical: bool) -> BerResult<Extension> {
        let mut encoder = DerEncoder::new();
        self.encode_into(&mut encoder)?;
        Ok(Extension::new(
            ObjectIdentifier::new(oids::KEY_USAGE.to_vec())?,
            critical,
            encoder.into_bytes()?,
        ))
    }
}

impl Asn1Decode for KeyUsage {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        let bits = decoder.decode_bit_string()?;
        let bytes = bits.as_bytes();
        if bytes.len() > 2 {
            return Err(BerError::InvalidData(format!(
                "key usage BIT STRING too long: {} bytes",
                bytes.len()
            )));
        }
        let mut usage: u16 = 0;
        for (i, byte) in bytes.iter().enumerate() {
            usage |= u16::from(*byte) << (8 - 8 * i);
        }
        Ok(KeyUsage::from_bits_truncate(usage))
    }
}

impl Asn1Encode for KeyUsage {
    /// Trailing zero bits are dropped, as DER requires for named bit lists
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        if self.is_empty() {
            return Err(BerError::Encoding("cannot encode an empty key usage".to_string()));
        }
        let bytes = self.bits().to_be_bytes();
        let used = if bytes[1] == 0 { 1 } else { 2 };
        let unused_bits = bytes[used - 1].trailing_zeros() as u8;
        let bits = BitString::new(bytes[..used].to_vec(), unused_bits)?;
        encoder.encode_bit_string(&bits)?;
        Ok(())
    }
}
