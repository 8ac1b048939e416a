//! SHA-256 digest value type

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::integrity::DIGEST_LEN;

/// 256-bit content digest of a byte stream
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

/// Why a hex string could not be turned into a [`Digest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    InvalidLength { expected: usize, actual: usize },
    InvalidHex(String),
}

impl fmt::Display for DigestParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestParseError::InvalidLength { expected, actual } => write!(
                f,
                "expected {} hex characters, got {}",
                expected, actual
            ),
            DigestParseError::InvalidHex(reason) => write!(f, "invalid hex: {}", reason),
        }
    }
}

impl std::error::Error for DigestParseError {}

impl Digest {
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn from_hex(value: &str) -> Result<Self, DigestParseError> {
        let value = value.trim();
        if value.len() != DIGEST_LEN * 2 {
            return Err(DigestParseError::InvalidLength {
                expected: DIGEST_LEN * 2,
                actual: value.len(),
            });
        }

        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(value, &mut bytes)
            .map_err(|e| DigestParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::from_hex(&value).map_err(serde::de::Error::custom)
    }
}
