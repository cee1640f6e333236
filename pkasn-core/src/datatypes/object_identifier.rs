//! OBJECT IDENTIFIER value type

use crate::error::{BerError, BerResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static DOTTED_OID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)+$").expect("static OID pattern"));

/// ASN.1 object identifier, e.g. `1.2.840.113549.1.1.1`
///
/// Arcs are limited to 32 bits. The first two arcs must satisfy the X.660
/// rules (first arc 0, 1 or 2; second arc below 40 unless the first is 2)
/// so that every value has exactly one encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIdentifier {
    components: Vec<u32>,
}

impl ObjectIdentifier {
    /// Create an object identifier from its arcs
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than two arcs are given or the first two
    /// arcs cannot be packed into one subidentifier.
    pub fn new(components: Vec<u32>) -> BerResult<Self> {
        if components.len() < 2 {
            return Err(BerError::InvalidData(
                "Object identifier must have at least 2 components".to_string(),
            ));
        }
        match components[0] {
            0 | 1 if components[1] >= 40 => {
                return Err(BerError::InvalidData(format!(
                    "Second OID arc {} too large under first arc {}",
                    components[1], components[0]
                )));
            }
            0 | 1 => {}
            2 if components[1] > u32::MAX - 80 => {
                return Err(BerError::InvalidData("OID component too large".to_string()));
            }
            2 => {}
            first => {
                return Err(BerError::InvalidData(format!(
                    "Invalid first OID arc {}",
                    first
                )));
            }
        }
        Ok(Self { components })
    }

    /// Parse the dotted decimal form
    pub fn from_string(s: &str) -> BerResult<Self> {
        if !DOTTED_OID.is_match(s) {
            return Err(BerError::InvalidData(format!("Invalid OID string: {}", s)));
        }
        let components = s
            .split('.')
            .map(|arc| {
                arc.parse::<u32>()
                    .map_err(|_| BerError::InvalidData(format!("OID arc out of range: {}", arc)))
            })
            .collect::<BerResult<Vec<u32>>>()?;
        Self::new(components)
    }

    /// Get the arcs
    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl FromStr for ObjectIdentifier {
    type Err = BerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}
