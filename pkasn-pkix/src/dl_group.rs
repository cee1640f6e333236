//! Discrete-logarithm group parameters
//!
//! The same three numbers travel in three different layouts:
//!
//! ```text
//! ANSI X9.57 (DSA)    SEQUENCE { p, q, g }
//! ANSI X9.42 (DH)     SEQUENCE { p, g, q, j OPTIONAL, validationParms OPTIONAL }
//! PKCS #3 (DH)        SEQUENCE { p, g, privateValueLength OPTIONAL }
//! ```

use num_bigint::{BigInt, Sign};
use pkasn_ber::{BerDecoder, DerEncoder};
use pkasn_core::{BerError, BerResult};

/// Layout of encoded group parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlGroupFormat {
    /// p, q, g; nothing may follow
    AnsiX957,
    /// p, g, q; trailing fields are skipped
    AnsiX942,
    /// p, g; trailing fields are skipped and q is unknown
    Pkcs3,
}

/// Group parameters: prime modulus `p`, subgroup order `q`, generator `g`
///
/// `q` is zero when it is unknown (PKCS #3 parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlGroup {
    p: BigInt,
    q: BigInt,
    g: BigInt,
}

impl DlGroup {
    /// Create a group, checking that `p` and `g` are above 1 and `q` is not
    /// negative
    pub fn new(p: BigInt, q: BigInt, g: BigInt) -> BerResult<Self> {
        let one = BigInt::from(1);
        if p <= one {
            return Err(BerError::InvalidData("DL group modulus p too small".to_string()));
        }
        if g <= one {
            return Err(BerError::InvalidData("DL group generator g too small".to_string()));
        }
        if q.sign() == Sign::Minus {
            return Err(BerError::InvalidData("DL group order q is negative".to_string()));
        }
        Ok(Self { p, q, g })
    }

    pub fn p(&self) -> &BigInt {
        &self.p
    }

    pub fn q(&self) -> &BigInt {
        &self.q
    }

    pub fn g(&self) -> &BigInt {
        &self.g
    }

    /// Check if the subgroup order is known
    pub fn has_q(&self) -> bool {
        self.q.sign() != Sign::NoSign
    }

    /// Decode parameters in the given layout
    ///
    /// # Error Handling
    /// Fails on any decoding error, on data after the outer SEQUENCE, on
    /// extra fields in the X9.57 layout and on out-of-range numbers.
    pub fn decode(data: &[u8], format: DlGroupFormat) -> BerResult<Self> {
        let mut decoder = BerDecoder::new(data);
        let group = Self::decode_from(&mut decoder, format)?;
        decoder.verify_end()?;
        Ok(group)
    }

    /// Decode parameters at the decoder's current position
    pub fn decode_from(decoder: &mut BerDecoder<'_>, format: DlGroupFormat) -> BerResult<Self> {
        decoder.start_sequence()?;
        let p = decoder.decode_bigint()?;
        let (q, g) = match format {
            DlGroupFormat::AnsiX957 => {
                let q = decoder.decode_bigint()?;
                let g = decoder.decode_bigint()?;
                decoder.verify_end()?;
                (q, g)
            }
            DlGroupFormat::AnsiX942 => {
                let g = decoder.decode_bigint()?;
                let q = decoder.decode_bigint()?;
                decoder.discard_remaining()?;
                (q, g)
            }
            DlGroupFormat::Pkcs3 => {
                let g = decoder.decode_bigint()?;
                decoder.discard_remaining()?;
                (BigInt::default(), g)
            }
        };
        decoder.end_cons()?;
        Self::new(p, q, g)
    }

    /// Encode in the given layout
    ///
    /// # Error Handling
    /// `Encoding` if the layout needs `q` and the group has none.
    pub fn encode(&self, format: DlGroupFormat) -> BerResult<Vec<u8>> {
        let mut encoder = DerEncoder::new();
        self.encode_into(&mut encoder, format)?;
        encoder.into_bytes()
    }

    pub fn encode_into(&self, encoder: &mut DerEncoder, format: DlGroupFormat) -> BerResult<()> {
        if format != DlGroupFormat::Pkcs3 && !self.has_q() {
            return Err(BerError::Encoding(format!(
                "cannot encode {:?} parameters without q",
                format
            )));
        }
        encoder.start_sequence()?.encode_bigint(&self.p)?;
        match format {
            DlGroupFormat::AnsiX957 => {
                encoder.encode_bigint(&self.q)?.encode_bigint(&self.g)?;
            }
            DlGroupFormat::AnsiX942 => {
                encoder.encode_bigint(&self.g)?.encode_bigint(&self.q)?;
            }
            DlGroupFormat::Pkcs3 => {
                encoder.encode_bigint(&self.g)?;
            }
        }
        encoder.end_cons()?;
        Ok(())
    }
}
