//! pkasn - BER/DER codec for public-key infrastructure data
//!
//! This library decodes BER (including indefinite-length encodings) and
//! encodes canonical DER, with typed helpers for the X.509 and PKCS
//! structures built on top of the codec.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `pkasn-core`: Error type, tag vocabulary and value types
//! - `pkasn-ber`: Byte sources, tag/length scanner, decoder, encoder
//! - `pkasn-pkix`: AlgorithmIdentifier, extensions, DL groups, PKCS #8
//!
//! # Usage
//!
//! ```
//! use pkasn::{BerDecoder, DerEncoder};
//!
//! let mut encoder = DerEncoder::new();
//! encoder.start_sequence()?.encode_u64(5)?.encode_bool(true)?.end_cons()?;
//! let der = encoder.into_bytes()?;
//!
//! let mut decoder = BerDecoder::new(&der);
//! decoder.start_sequence()?;
//! assert_eq!(decoder.decode_u32()?, 5);
//! assert!(decoder.decode_bool()?);
//! decoder.end_cons()?.verify_end()?;
//! # Ok::<(), pkasn::BerError>(())
//! ```

// Re-export core types
pub use pkasn_core::{describe_tag, BerError, BerResult, ClassTag, TypeTag};
pub use pkasn_core::datatypes::*;
pub use num_bigint::BigInt;

// Re-export the codec
pub use pkasn_ber::ber::{
    looks_like_ber, Asn1Decode, Asn1Encode, BerDecoder, BerObject, ByteSource, DecoderConfig,
    DerEncoder, MemorySource, PaddingBits, PrettyPrinter, StreamSource,
};

// Re-export PKIX structures
pub mod pkix {
    pub use pkasn_pkix::*;
}

#[cfg(test)]
mod properties;
