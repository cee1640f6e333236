//! Core types for the pkasn BER/DER codec
//!
//! This crate provides the error type, the ASN.1 tag vocabulary and the
//! value types shared by the decoder, the encoder and the PKIX helpers.

pub mod error;
pub mod tag;
pub mod datatypes;

pub use error::{BerError, BerResult};
pub use tag::{describe_tag, ClassTag, TypeTag};
pub use datatypes::{BitString, ObjectIdentifier, OctetString};
