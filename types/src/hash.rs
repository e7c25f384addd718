//! Ledger transaction hash type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte ledger transaction hash.
///
/// Returned by the ledger on a successful vote commit and stored on the
/// relational mirror row as the `vote_hash` linking the two systems.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes: [u8; 32] = hex::decode(s).ok()?.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let h = TxHash::new([0xab; 32]);
        let parsed = TxHash::from_hex(&h.to_string());
        assert_eq!(parsed, Some(h));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(TxHash::from_hex("abcd").is_none());
        assert!(TxHash::from_hex(&"zz".repeat(32)).is_none());
    }

    #[test]
    fn zero_is_zero() {
        assert!(TxHash::ZERO.is_zero());
        assert!(!TxHash::new([1; 32]).is_zero());
    }
}
