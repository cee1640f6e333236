//! AlgorithmIdentifier
//!
//! ```text
//! AlgorithmIdentifier ::= SEQUENCE {
//!     algorithm   OBJECT IDENTIFIER,
//!     parameters  ANY DEFINED BY algorithm OPTIONAL }
//! ```

use pkasn_ber::{Asn1Decode, Asn1Encode, BerDecoder, DerEncoder};
use pkasn_core::{BerResult, ObjectIdentifier};

/// DER encoding of NULL
const NULL_PARAMETERS: [u8; 2] = [0x05, 0x00];

/// Algorithm OID plus its parameters
///
/// Parameters are kept as the raw encoded TLV since their type depends on
/// the algorithm. An empty vector means the field was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    oid: ObjectIdentifier,
    parameters: Vec<u8>,
}

impl AlgorithmIdentifier {
    /// Create an identifier with already encoded parameters
    pub fn new(oid: ObjectIdentifier, parameters: Vec<u8>) -> Self {
        Self { oid, parameters }
    }

    /// Create an identifier with NULL parameters (as RSA uses)
    pub fn with_null_parameters(oid: ObjectIdentifier) -> Self {
        Self::new(oid, NULL_PARAMETERS.to_vec())
    }

    /// Create an identifier without parameters
    pub fn without_parameters(oid: ObjectIdentifier) -> Self {
        Self::new(oid, Vec::new())
    }

    pub fn oid(&self) -> &ObjectIdentifier {
        &self.oid
    }

    /// The encoded parameters, empty if absent
    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    /// Check if the algorithm OID has the given arcs
    pub fn is_algorithm(&self, arcs: &[u32]) -> bool {
        self.oid.components() == arcs
    }

    pub fn parameters_are_null(&self) -> bool {
        self.parameters == NULL_PARAMETERS
    }

    pub fn parameters_are_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameters_are_null_or_empty(&self) -> bool {
        self.parameters_are_empty() || self.parameters_are_null()
    }

    /// Decode from DER/BER bytes; trailing data is an error
    pub fn decode(data: &[u8]) -> BerResult<Self> {
        let mut decoder = BerDecoder::new(data);
        let value = Self::decode_from(&mut decoder)?;
        decoder.verify_end()?;
        Ok(value)
    }

    /// Encode to DER
    pub fn encode(&self) -> BerResult<Vec<u8>> {
        let mut encoder = DerEncoder::new();
        self.encode_into(&mut encoder)?;
        encoder.into_bytes()
    }
}

impl Asn1Decode for AlgorithmIdentifier {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.start_sequence()?;
        let oid = decoder.decode_oid()?;
        let parameters = decoder.raw_bytes()?;
        decoder.end_cons()?;
        Ok(Self { oid, parameters })
    }
}

impl Asn1Encode for AlgorithmIdentifier {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder
            .start_sequence()?
            .encode_oid(&self.oid)?
            .raw_bytes(&self.parameters)?
            .end_cons()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;

    const RSA_ALG_ID: [u8; 15] = [
        0x30, 0x0D, 0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01, 0x05, 0x00,
    ];

    #[test]
    fn test_decode_rsa_with_null() {
        let alg = AlgorithmIdentifier::decode(&RSA_ALG_ID).unwrap();
        assert!(alg.is_algorithm(oids::RSA_ENCRYPTION));
        assert!(alg.parameters_are_null());
        assert!(alg.parameters_are_null_or_empty());
        assert_eq!(alg.encode().unwrap(), RSA_ALG_ID.to_vec());
    }

    #[test]
    fn test_indefinite_length_matches_der() {
        let mut ber = vec![0x30, 0x80];
        ber.extend_from_slice(&RSA_ALG_ID[2..]);
        ber.extend_from_slice(&[0x00, 0x00]);

        let alg = AlgorithmIdentifier::decode(&ber).unwrap();
        assert_eq!(alg, AlgorithmIdentifier::decode(&RSA_ALG_ID).unwrap());
        assert_eq!(alg.parameters(), &[0x05, 0x00]);
        assert!(alg.parameters_are_null());
        assert_eq!(alg.encode().unwrap(), RSA_ALG_ID.to_vec());
    }

    #[test]
    fn test_absent_parameters() {
        let oid = ObjectIdentifier::new(oids::EC_PUBLIC_KEY.to_vec()).unwrap();
        let alg = AlgorithmIdentifier::without_parameters(oid);
        let der = alg.encode().unwrap();
        assert_eq!(der[0], 0x30);
        let back = AlgorithmIdentifier::decode(&der).unwrap();
        assert!(back.parameters_are_empty());
        assert_eq!(back, alg);
    }

    #[test]
    fn test_structured_parameters_kept_raw() {
        // DSA identifier with SEQUENCE { INTEGER 23, INTEGER 11, INTEGER 2 }
        let data = [
            0x30, 0x14, 0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x38, 0x04, 0x01, 0x30, 0x09, 0x02,
            0x01, 0x17, 0x02, 0x01, 0x0B, 0x02, 0x01, 0x02,
        ];
        let alg = AlgorithmIdentifier::decode(&data).unwrap();
        assert!(alg.is_algorithm(oids::DSA));
        assert_eq!(alg.parameters(), &data[11..]);
    }

    #[test]
    fn test_trailing_data_rejected() {
        let mut data = RSA_ALG_ID.to_vec();
        data.extend_from_slice(&[0x05, 0x00]);
        assert!(AlgorithmIdentifier::decode(&data).is_err());
    }
}
