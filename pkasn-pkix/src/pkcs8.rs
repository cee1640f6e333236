//! PKCS #8 PrivateKeyInfo
//!
//! ```text
//! PrivateKeyInfo ::= SEQUENCE {
//!     version                   INTEGER (0),
//!     privateKeyAlgorithm       AlgorithmIdentifier,
//!     privateKey                OCTET STRING,
//!     attributes           [0]  IMPLICIT Attributes OPTIONAL }
//! ```
//!
//! Only the unencrypted envelope is handled; the private key bytes are
//! returned as-is for an algorithm-specific loader.

use crate::algorithm::AlgorithmIdentifier;
use pkasn_ber::{Asn1Decode, Asn1Encode, BerDecoder, DerEncoder};
use pkasn_core::{BerResult, ClassTag, TypeTag};

/// Unencrypted private key envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyInfo {
    algorithm: AlgorithmIdentifier,
    private_key: Vec<u8>,
    attributes: Option<Vec<u8>>,
}

impl PrivateKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, private_key: Vec<u8>) -> Self {
        Self {
            algorithm,
            private_key,
            attributes: None,
        }
    }

    /// Attach encoded attributes (the content of the `[0]` field)
    pub fn with_attributes(mut self, attributes: Vec<u8>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn algorithm(&self) -> &AlgorithmIdentifier {
        &self.algorithm
    }

    /// The algorithm-specific private key encoding
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Content of the `[0] IMPLICIT` attributes field, if present
    pub fn attributes(&self) -> Option<&[u8]> {
        self.attributes.as_deref()
    }

    /// Decode from DER/BER bytes; trailing data is an error
    pub fn decode(data: &[u8]) -> BerResult<Self> {
        let mut decoder = BerDecoder::new(data);
        let info = Self::decode_from(&mut decoder)?;
        decoder.verify_end()?;
        Ok(info)
    }

    /// Encode to DER
    pub fn encode(&self) -> BerResult<Vec<u8>> {
        let mut encoder = DerEncoder::new();
        self.encode_into(&mut encoder)?;
        encoder.into_bytes()
    }
}

impl Asn1Decode for PrivateKeyInfo {
    /// Fields after the attributes (such as a PKCS #8 v2 public key) are
    /// skipped.
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder
            .start_sequence()?
            .decode_and_check(&0u32, "Unknown PKCS #8 version number")?;
        let algorithm = decoder.decode::<AlgorithmIdentifier>()?;
        let private_key = decoder.get_next_octet_string()?;

        let next = decoder.get_next_object()?;
        let attributes = if next.is_a(TypeTag(0), ClassTag::EXPLICIT_CONTEXT_SPECIFIC) {
            Some(next.into_value())
        } else {
            decoder.push_back(next)?;
            None
        };

        decoder.discard_remaining()?.end_cons()?;
        Ok(Self {
            algorithm,
            private_key,
            attributes,
        })
    }
}

impl Asn1Encode for PrivateKeyInfo {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder
            .start_sequence()?
            .encode_u64(0)?
            .encode(&self.algorithm)?
            .encode_octet_string(&self.private_key)?;
        if let Some(attributes) = &self.attributes {
            encoder.add_object(TypeTag(0), ClassTag::EXPLICIT_CONTEXT_SPECIFIC, attributes)?;
        }
        encoder.end_cons()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use pkasn_core::{BerError, ObjectIdentifier};

    fn rsa_info() -> PrivateKeyInfo {
        let oid = ObjectIdentifier::new(oids::RSA_ENCRYPTION.to_vec()).unwrap();
        PrivateKeyInfo::new(
            AlgorithmIdentifier::with_null_parameters(oid),
            vec![0x30, 0x03, 0x02, 0x01, 0x00],
        )
    }

    #[test]
    fn test_envelope() {
        let info = rsa_info();
        let der = info.encode().unwrap();
        // SEQUENCE { INTEGER 0, AlgorithmIdentifier (15 bytes), OCTET STRING (5 bytes) }
        assert_eq!(&der[..5], &[0x30, 0x19, 0x02, 0x01, 0x00]);
        assert_eq!(der.len(), 27);

        let back = PrivateKeyInfo::decode(&der).unwrap();
        assert!(back.algorithm().is_algorithm(oids::RSA_ENCRYPTION));
        assert_eq!(back.private_key(), &[0x30, 0x03, 0x02, 0x01, 0x00]);
        assert_eq!(back.attributes(), None);
    }

    #[test]
    fn test_attributes_kept() {
        let info = rsa_info().with_attributes(vec![0x30, 0x00]);
        let der = info.encode().unwrap();
        let back = PrivateKeyInfo::decode(&der).unwrap();
        assert_eq!(back.attributes(), Some(&[0x30, 0x00][..]));
        assert_eq!(back, info);
    }

    #[test]
    fn test_indefinite_length_matches_der() {
        let info = rsa_info().with_attributes(vec![0x30, 0x00]);
        let der = info.encode().unwrap();

        // outer SEQUENCE and the [0] attributes in indefinite form
        let mut ber = vec![0x30, 0x80];
        ber.extend_from_slice(&der[2..der.len() - 4]);
        ber.extend_from_slice(&[0xA0, 0x80, 0x30, 0x00, 0x00, 0x00]);
        ber.extend_from_slice(&[0x00, 0x00]);

        let back = PrivateKeyInfo::decode(&ber).unwrap();
        assert_eq!(back.attributes(), Some(&[0x30, 0x00][..]));
        assert_eq!(back, PrivateKeyInfo::decode(&der).unwrap());
        assert_eq!(back.encode().unwrap(), der);
    }

    #[test]
    fn test_version_must_be_zero() {
        let mut der = rsa_info().encode().unwrap();
        der[4] = 0x01;
        assert!(matches!(PrivateKeyInfo::decode(&der), Err(BerError::InvalidData(_))));
    }
}
