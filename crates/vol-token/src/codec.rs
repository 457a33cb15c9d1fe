use std::cmp::Ordering;

use vol_types::{Address, AddressWidth, Token, TOKEN_SIZE};

use crate::error::{TokenError, TokenResult};
use crate::text::{parse_address, render_address};

/// Converts between addresses and tokens for one container.
///
/// A codec is tagged with the address width of the container it was built
/// for. Tokens produced by codecs of different widths must not be mixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenCodec {
    width: AddressWidth,
}

impl TokenCodec {
    pub fn new(width: AddressWidth) -> Self {
        Self { width }
    }

    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Encode an address: its low `width` bytes, zero-filled to token size.
    ///
    /// Bytes of the address above `width` are not copied, so an address
    /// outside the width's range comes back truncated.
    pub fn encode(&self, addr: Address) -> Token {
        let n = self.width.bytes();
        let mut bytes = [0u8; TOKEN_SIZE];
        bytes[..n].copy_from_slice(&addr.get().to_le_bytes()[..n]);
        Token::from_bytes(bytes)
    }

    /// Decode a token: exactly `width` bytes, zero-extended.
    ///
    /// Bytes past `width` are ignored, not validated.
    pub fn decode(&self, token: &Token) -> Address {
        let n = self.width.bytes();
        let mut raw = [0u8; 8];
        raw[..n].copy_from_slice(&token.as_bytes()[..n]);
        Address::new(u64::from_le_bytes(raw))
    }

    /// Render a token as the decimal text of its address.
    pub fn to_text(&self, token: &Token) -> String {
        render_address(self.decode(token))
    }

    /// Parse decimal text back into a token for this container.
    pub fn from_text(&self, text: &str) -> TokenResult<Token> {
        let addr = parse_address(text)?;
        if !self.width.fits(addr) {
            return Err(TokenError::AddressOutOfRange {
                addr,
                width: self.width,
            });
        }
        Ok(self.encode(addr))
    }
}

/// Compare two tokens over the full buffer, zero padding included.
///
/// Only `Equal` carries meaning ("same object", within one container); the
/// direction of an inequality is an artifact of byte order.
pub fn compare(a: &Token, b: &Token) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}
