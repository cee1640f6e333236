//! BER (Basic Encoding Rules) decoder and DER encoder
//!
//! Every ASN.1 value is a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! The value of a constructed type is itself a series of TLVs.
//!
//! # Layers
//!
//! - [`source`]: pull-based byte sources (memory, `std::io::Read`)
//! - [`types`]: stateless tag/length scanner and its encoding mirror
//! - [`object`]: one decoded TLV
//! - [`decoder`]: stateful, scope-aware decoder over a source
//! - [`encoder`]: DER encoder with a scope stack
//! - [`integer`], [`oid`]: content codecs for INTEGER and OBJECT IDENTIFIER
//!
//! # Implementation Notes
//!
//! 1. **Indefinite Length**: resolved by a bounded pre-scan for the matching
//!    EOC marker (default budget of 16 nested levels).
//! 2. **Lengths**: at most 4 length octets are accepted.
//! 3. **Tags**: tag numbers are limited to 32 bits.
//! 4. **Strictness**: the decoder is permissive by default; see
//!    [`DecoderConfig::der`] for the canonical-form checks.

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod integer;
pub mod object;
pub mod oid;
pub mod pretty;
pub mod source;
pub mod traits;
pub mod types;

pub use config::{DecoderConfig, PaddingBits};
pub use decoder::{BerDecoder, FixedWidthUint};
pub use encoder::DerEncoder;
pub use object::BerObject;
pub use pretty::PrettyPrinter;
pub use source::{looks_like_ber, ByteSource, MemorySource, StreamSource};
pub use traits::{Asn1Decode, Asn1Encode};
pub use types::{
    decode_length, decode_tag, encode_length, encode_tag, LengthField, LengthForm, TagField,
    ALLOWED_EOC_NESTINGS, MAX_LENGTH_OCTETS,
};
