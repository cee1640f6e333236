//! Decoder strictness configuration

use crate::ber::types::{ALLOWED_EOC_NESTINGS, LengthField, LengthForm};
use pkasn_core::{BerError, BerResult};

/// What to do with non-zero padding bits in the last byte of a BIT STRING
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingBits {
    /// Clear the padding bits and continue
    Mask,
    /// Fail with `InvalidBitString`
    Reject,
}

/// Decoder configuration
///
/// The default is the permissive BER profile used for certificates in the
/// wild: indefinite lengths, non-minimal lengths and integers and any
/// non-zero BOOLEAN are accepted. [`DecoderConfig::der`] turns on every
/// canonical-form check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Budget of nested indefinite-length encodings
    pub max_indefinite_nesting: usize,
    /// Accept the indefinite length form at all
    pub allow_indefinite_length: bool,
    /// Reject long-form lengths that use more octets than needed
    pub require_minimal_length: bool,
    /// Reject empty INTEGER content and redundant leading 0x00/0xFF bytes
    pub require_minimal_integer: bool,
    /// Only accept 0x00 and 0xFF as BOOLEAN content
    pub require_der_boolean: bool,
    /// Handling of BIT STRING padding bits
    pub bit_string_padding: PaddingBits,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_indefinite_nesting: ALLOWED_EOC_NESTINGS,
            allow_indefinite_length: true,
            require_minimal_length: false,
            require_minimal_integer: false,
            require_der_boolean: false,
            bit_string_padding: PaddingBits::Mask,
        }
    }
}

impl DecoderConfig {
    /// Permissive BER profile (same as `Default`)
    pub fn ber() -> Self {
        Self::default()
    }

    /// Strict DER profile
    pub fn der() -> Self {
        Self {
            max_indefinite_nesting: ALLOWED_EOC_NESTINGS,
            allow_indefinite_length: false,
            require_minimal_length: true,
            require_minimal_integer: true,
            require_der_boolean: true,
            bit_string_padding: PaddingBits::Reject,
        }
    }

    /// Check a decoded length field against the length rules
    pub(crate) fn check_length(&self, length: &LengthField) -> BerResult<()> {
        match length.form {
            LengthForm::Indefinite if !self.allow_indefinite_length => {
                Err(BerError::NotDer("indefinite length encoding".to_string()))
            }
            LengthForm::Long if self.require_minimal_length && !length.is_minimal() => Err(
                BerError::NotDer(format!("non-minimal length encoding of {}", length.value)),
            ),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        let ber = DecoderConfig::ber();
        assert_eq!(ber, DecoderConfig::default());
        assert_eq!(ber.max_indefinite_nesting, 16);
        assert!(ber.allow_indefinite_length);

        let der = DecoderConfig::der();
        assert!(!der.allow_indefinite_length);
        assert_eq!(der.bit_string_padding, PaddingBits::Reject);
    }

    #[test]
    fn test_check_length() {
        let long = LengthField {
            value: 5,
            field_size: 2,
            form: LengthForm::Long,
        };
        assert!(DecoderConfig::ber().check_length(&long).is_ok());
        assert!(matches!(
            DecoderConfig::der().check_length(&long),
            Err(BerError::NotDer(_))
        ));

        let indefinite = LengthField {
            value: 2,
            field_size: 1,
            form: LengthForm::Indefinite,
        };
        assert!(DecoderConfig::der().check_length(&indefinite).is_err());
    }
}
