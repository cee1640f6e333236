//! Value types carried by BER/DER encodings

pub mod bit_string;
pub mod octet_string;
pub mod object_identifier;

pub use bit_string::BitString;
pub use octet_string::OctetString;
pub use object_identifier::ObjectIdentifier;
