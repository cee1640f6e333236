//! BIT STRING value type

use crate::error::{BerError, BerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits (zeros and ones). A bit string value can have any length including zero.
///
/// Bits are stored MSB first; the last `unused_bits` bits of the final byte
/// are padding and are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    unused_bits: u8,
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The bit string as a byte array
    /// * `unused_bits` - Number of padding bits in the last byte (0-7)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `unused_bits` is 8 or more
    /// - `bytes` is empty and `unused_bits` > 0
    ///
    /// Padding bits are cleared.
    pub fn new(mut bytes: Vec<u8>, unused_bits: u8) -> BerResult<Self> {
        if unused_bits > 7 {
            return Err(BerError::InvalidBitString(format!(
                "unused bits count {} out of range",
                unused_bits
            )));
        }
        if bytes.is_empty() && unused_bits != 0 {
            return Err(BerError::InvalidBitString(
                "unused bits declared for an empty bit string".to_string(),
            ));
        }
        if let Some(last) = bytes.last_mut() {
            *last &= 0xFFu8 << unused_bits;
        }
        Ok(Self { bytes, unused_bits })
    }

    /// Create a bit string whose length is a whole number of bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            unused_bits: 0,
        }
    }

    /// Create a bit string from individual bits, MSB first
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (index, bit) in bits.iter().enumerate() {
            if *bit {
                bytes[index / 8] |= 0x80 >> (index % 8);
            }
        }
        let unused_bits = ((8 - bits.len() % 8) % 8) as u8;
        Self { bytes, unused_bits }
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the bit string and return the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of padding bits in the last byte.
    pub fn unused_bits(&self) -> u8 {
        self.unused_bits
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.bytes.len() * 8 - self.unused_bits as usize
    }

    /// Get the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based)
    ///
    /// # Returns
    /// * `true` if the bit is set, `false` otherwise
    /// * `Err` if the index is out of bounds
    pub fn get_bit(&self, index: usize) -> BerResult<bool> {
        if index >= self.num_bits() {
            return Err(BerError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index,
                self.num_bits()
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        Ok((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Set the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based)
    /// * `value` - The value to set (true = 1, false = 0)
    ///
    /// # Returns
    /// * `Err` if the index is out of bounds
    pub fn set_bit(&mut self, index: usize, value: bool) -> BerResult<()> {
        if index >= self.num_bits() {
            return Err(BerError::InvalidData(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index,
                self.num_bits()
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        if value {
            self.bytes[byte_index] |= 1 << bit_index;
        } else {
            self.bytes[byte_index] &= !(1 << bit_index);
        }
        Ok(())
    }

    /// Check a named bit, treating bits past the end as zero
    ///
    /// DER strips trailing zero bits from named-bit lists, so a short
    /// string is not an error here.
    pub fn is_set(&self, index: usize) -> bool {
        self.get_bit(index).unwrap_or(false)
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{:02X}", byte)?;
        }
        if self.unused_bits != 0 {
            write!(f, " ({} unused)", self.unused_bits)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_new() {
        let bytes = vec![0xFF, 0x00, 0xAA];
        let bit_string = BitString::new(bytes.clone(), 0).unwrap();
        assert_eq!(bit_string.as_bytes(), &bytes);
        assert_eq!(bit_string.num_bits(), 24);
    }

    #[test]
    fn test_bit_string_clears_padding() {
        let bit_string = BitString::new(vec![0x6E, 0x5F], 6).unwrap();
        assert_eq!(bit_string.as_bytes(), &[0x6E, 0x40]);
        assert_eq!(bit_string.num_bits(), 10);
    }

    #[test]
    fn test_bit_string_invalid() {
        assert!(BitString::new(vec![0xFF], 8).is_err());
        assert!(BitString::new(Vec::new(), 3).is_err());
        assert!(BitString::new(Vec::new(), 0).is_ok());
    }

    #[test]
    fn test_bit_string_from_bits() {
        let bit_string = BitString::from_bits(&[true, false, true, true, false, false, false, false, true]);
        assert_eq!(bit_string.as_bytes(), &[0xB0, 0x80]);
        assert_eq!(bit_string.unused_bits(), 7);
        assert!(bit_string.is_set(8));
        assert!(!bit_string.is_set(9));
    }

    #[test]
    fn test_bit_string_get_set() {
        let mut bit_string = BitString::from_bytes(vec![0x00]);
        bit_string.set_bit(1, true).unwrap();
        assert!(bit_string.get_bit(1).unwrap());
        assert!(!bit_string.get_bit(0).unwrap());
        assert!(bit_string.get_bit(8).is_err());
    }
}
