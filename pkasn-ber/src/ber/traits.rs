//! Encode/decode traits for ASN.1 values
//!
//! Structures implement [`Asn1Decode`] and [`Asn1Encode`] by driving the
//! decoder and encoder field by field; the impls here cover the primitive
//! universal types.

use crate::ber::decoder::BerDecoder;
use crate::ber::encoder::DerEncoder;
use num_bigint::BigInt;
use pkasn_core::{BerResult, BitString, ObjectIdentifier, OctetString};

/// A value that can be read from a [`BerDecoder`]
pub trait Asn1Decode: Sized {
    /// Decode one value at the decoder's current position
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self>;
}

/// A value that can be written to a [`DerEncoder`]
pub trait Asn1Encode {
    /// Append the DER encoding of this value to the encoder's current scope
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()>;
}

impl Asn1Decode for bool {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_bool()
    }
}

impl Asn1Encode for bool {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_bool(*self).map(|_| ())
    }
}

/// NULL
impl Asn1Decode for () {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_null()
    }
}

impl Asn1Encode for () {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_null().map(|_| ())
    }
}

impl Asn1Decode for BigInt {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_bigint()
    }
}

impl Asn1Encode for BigInt {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_bigint(self).map(|_| ())
    }
}

impl Asn1Decode for BitString {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_bit_string()
    }
}

impl Asn1Encode for BitString {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_bit_string(self).map(|_| ())
    }
}

impl Asn1Decode for OctetString {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_octet_string()
    }
}

impl Asn1Encode for OctetString {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_octet_string(self.as_bytes()).map(|_| ())
    }
}

impl Asn1Decode for ObjectIdentifier {
    fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
        decoder.decode_oid()
    }
}

impl Asn1Encode for ObjectIdentifier {
    fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
        encoder.encode_oid(self).map(|_| ())
    }
}

macro_rules! unsigned_integer {
    ($($ty:ty),*) => {
        $(
            impl Asn1Decode for $ty {
                fn decode_from(decoder: &mut BerDecoder<'_>) -> BerResult<Self> {
                    decoder.decode_integer_type::<$ty>()
                }
            }

            impl Asn1Encode for $ty {
                fn encode_into(&self, encoder: &mut DerEncoder) -> BerResult<()> {
                    encoder.encode_u64(u64::from(*self)).map(|_| ())
                }
            }
        )*
    };
}

unsigned_integer!(u8, u16, u32, u64);
