//! Public-key infrastructure structures
//!
//! Typed X.509 and PKCS structures decoded and encoded through the
//! [`Asn1Decode`](pkasn_ber::Asn1Decode) / [`Asn1Encode`](pkasn_ber::Asn1Encode)
//! traits of `pkasn-ber`.
//!
//! - [`AlgorithmIdentifier`]: algorithm OID plus raw parameters
//! - [`Extension`] / [`Extensions`]: X.509 v3 extensions, with
//!   [`BasicConstraints`] and [`KeyUsage`] payloads
//! - [`DlGroup`]: discrete-logarithm group parameters in the ANSI X9.57,
//!   ANSI X9.42 and PKCS #3 layouts
//! - [`PrivateKeyInfo`]: the unencrypted PKCS #8 envelope

pub mod algorithm;
pub mod dl_group;
pub mod extensions;
pub mod oids;
pub mod pkcs8;

pub use algorithm::AlgorithmIdentifier;
pub use dl_group::{DlGroup, DlGroupFormat};
pub use extensions::{BasicConstraints, Extension, Extensions, KeyUsage, UnknownCriticalPolicy};
pub use pkcs8::PrivateKeyInfo;
