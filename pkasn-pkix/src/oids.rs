//! Arcs of the object identifiers this crate knows about

/// id-ce-basicConstraints
pub const BASIC_CONSTRAINTS: &[u32] = &[2, 5, 29, 19];
/// id-ce-keyUsage
pub const KEY_USAGE: &[u32] = &[2, 5, 29, 15];
/// id-ce-subjectKeyIdentifier
pub const SUBJECT_KEY_IDENTIFIER: &[u32] = &[2, 5, 29, 14];
/// id-ce-authorityKeyIdentifier
pub const AUTHORITY_KEY_IDENTIFIER: &[u32] = &[2, 5, 29, 35];

/// rsaEncryption
pub const RSA_ENCRYPTION: &[u32] = &[1, 2, 840, 113549, 1, 1, 1];
/// id-dsa
pub const DSA: &[u32] = &[1, 2, 840, 10040, 4, 1];
/// dhpublicnumber (ANSI X9.42)
pub const DH_PUBLIC_NUMBER: &[u32] = &[1, 2, 840, 10046, 2, 1];
/// id-ecPublicKey
pub const EC_PUBLIC_KEY: &[u32] = &[1, 2, 840, 10045, 2, 1];

/// Extensions whose payloads this crate can interpret
pub const RECOGNISED_EXTENSIONS: &[&[u32]] = &[
    BASIC_CONSTRAINTS,
    KEY_USAGE,
    SUBJECT_KEY_IDENTIFIER,
    AUTHORITY_KEY_IDENTIFIER,
];
