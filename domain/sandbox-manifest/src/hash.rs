use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Key of a manifest definition.
///
/// The game API reports definition hashes as unsigned 32-bit integers, while the
/// definition tables are keyed by the same bits read as a signed integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionHash(i32);

impl DefinitionHash {
    pub fn from_signed(value: i32) -> Self {
        DefinitionHash(value)
    }

    pub fn from_unsigned(value: u32) -> Self {
        DefinitionHash(unsigned_to_signed(value))
    }

    pub fn signed(&self) -> i32 {
        self.0
    }

    pub fn unsigned(&self) -> u32 {
        self.0 as u32
    }
}

/// Two's-complement fold: values above `i32::MAX` have 2^32 subtracted.
pub fn unsigned_to_signed(value: u32) -> i32 {
    if value > i32::MAX as u32 {
        (i64::from(value) - (1i64 << 32)) as i32
    } else {
        value as i32
    }
}

impl From<u32> for DefinitionHash {
    fn from(value: u32) -> Self {
        DefinitionHash::from_unsigned(value)
    }
}

impl From<i32> for DefinitionHash {
    fn from(value: i32) -> Self {
        DefinitionHash::from_signed(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashOutOfRange(pub i64);

impl std::fmt::Display for HashOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} is not a 32-bit definition hash", self.0)
    }
}

impl TryFrom<i64> for DefinitionHash {
    type Error = HashOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if let Ok(unsigned) = u32::try_from(value) {
            Ok(DefinitionHash::from_unsigned(unsigned))
        } else if let Ok(signed) = i32::try_from(value) {
            Ok(DefinitionHash::from_signed(signed))
        } else {
            Err(HashOutOfRange(value))
        }
    }
}

impl FromStr for DefinitionHash {
    type Err = HashOutOfRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<i64>().map_err(|_| HashOutOfRange(0))?;
        DefinitionHash::try_from(value)
    }
}

impl std::fmt::Display for DefinitionHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.unsigned())
    }
}
