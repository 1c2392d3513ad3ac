//! 32-byte words: block hashes and storage slot keys

use crate::error::{decode_fixed, ParseError};
use std::fmt;
use std::str::FromStr;

/// 32-byte value
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256([u8; 32]);

impl H256 {
    /// All zeros
    pub const ZERO: H256 = H256([0u8; 32]);

    /// Wrap raw bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }

    /// Big-endian `value` in the low-order bytes
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        H256(bytes)
    }

    /// Parse exactly 32 bytes of hex, `0x` optional
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        decode_fixed(s, "hash", false).map(H256)
    }

    /// Parse up to 32 bytes of hex, left-padding with zeros.
    ///
    /// Tracers print storage keys in compact form (`0x1`) as often as
    /// padded; both name the same slot.
    pub fn from_hex_padded(s: &str) -> Result<Self, ParseError> {
        decode_fixed(s, "hash", true).map(H256)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex, always 64 digits
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for H256 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_padded(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for H256 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for H256 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        H256::from_hex_padded(&s).map_err(serde::de::Error::custom)
    }
}
