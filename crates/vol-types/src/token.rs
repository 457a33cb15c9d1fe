use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::TypeError;

/// Size in bytes of every [`Token`], independent of the connector.
pub const TOKEN_SIZE: usize = 16;

/// Opaque, fixed-size identity of one object within one open container.
///
/// The bytes are connector-defined. Callers may copy, store, and compare
/// tokens but must never interpret their contents. Tokens from different
/// containers are not comparable in any meaningful way.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Token([u8; TOKEN_SIZE]);

impl Token {
    /// The all-zero token.
    pub const fn zeroed() -> Self {
        Self([0u8; TOKEN_SIZE])
    }

    pub const fn from_bytes(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.0
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; TOKEN_SIZE] {
        &mut self.0
    }

    /// Reinterpret the leading bytes as a little-endian in-memory address.
    ///
    /// This is the lossy identity conversion used for flat legacy records:
    /// tokens built from container addresses keep their unused high-order
    /// bytes zero, so the leading eight bytes are the address itself.
    pub fn leading_address(&self) -> Address {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&self.0[..8]);
        Address::new(u64::from_le_bytes(raw))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 32-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != TOKEN_SIZE {
            return Err(TypeError::InvalidLength {
                expected: TOKEN_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; TOKEN_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.to_hex())
    }
}

impl From<[u8; TOKEN_SIZE]> for Token {
    fn from(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_is_default() {
        assert_eq!(Token::zeroed(), Token::default());
        assert_eq!(Token::zeroed().as_bytes(), &[0u8; TOKEN_SIZE]);
    }

    #[test]
    fn leading_address_reads_little_endian() {
        let mut bytes = [0u8; TOKEN_SIZE];
        bytes[0] = 0x20;
        bytes[1] = 0x01;
        let token = Token::from_bytes(bytes);
        assert_eq!(token.leading_address(), Address::new(0x0120));
    }

    #[test]
    fn hex_roundtrip() {
        let mut bytes = [0u8; TOKEN_SIZE];
        bytes[3] = 0xab;
        let token = Token::from_bytes(bytes);
        let parsed = Token::from_hex(&token.to_hex()).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Token::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: TOKEN_SIZE,
                actual: 2
            }
        );
        assert!(matches!(Token::from_hex("zz"), Err(TypeError::InvalidHex(_))));
    }
}
