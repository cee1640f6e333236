//! BER/DER codec for public-key infrastructure structures
//!
//! This crate decodes BER (including indefinite lengths) and encodes DER.
//! The ASN.1 vocabulary (tags, errors, value types) lives in `pkasn-core`.

pub mod ber;

pub use ber::{
    Asn1Decode, Asn1Encode, BerDecoder, BerObject, ByteSource, DecoderConfig, DerEncoder,
    MemorySource, PaddingBits, PrettyPrinter, StreamSource,
};
pub use pkasn_core::{BerError, BerResult, ClassTag, TypeTag};
