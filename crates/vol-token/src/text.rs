//! Decimal text form of container addresses.

use vol_types::Address;

use crate::error::{TokenError, TokenResult};

/// Number of decimal digits needed to print `value` (zero prints as "0").
pub fn decimal_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    (value.ilog10() + 1) as usize
}

/// Render an address as decimal text, [`decimal_len`] digits long.
pub fn render_address(addr: Address) -> String {
    addr.get().to_string()
}

/// Parse decimal text produced by [`render_address`].
///
/// Only ASCII digits are accepted; signs, whitespace, and other radixes
/// are rejected.
pub fn parse_address(text: &str) -> TokenResult<Address> {
    if text.is_empty() {
        return Err(TokenError::EmptyText);
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::InvalidText {
            text: text.to_string(),
            reason: "expected decimal digits only".into(),
        });
    }
    text.parse::<u64>()
        .map(Address::new)
        .map_err(|e| TokenError::InvalidText {
            text: text.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decimal_len_boundaries() {
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(9), 1);
        assert_eq!(decimal_len(10), 2);
        assert_eq!(decimal_len(99_999), 5);
        assert_eq!(decimal_len(100_000), 6);
        assert_eq!(decimal_len(u64::MAX), 20);
    }

    #[test]
    fn render_zero() {
        assert_eq!(render_address(Address::new(0)), "0");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_address(""), Err(TokenError::EmptyText));
        assert!(parse_address("-1").is_err());
        assert!(parse_address(" 12").is_err());
        assert!(parse_address("0x10").is_err());
        assert!(parse_address("18446744073709551616").is_err());
    }

    proptest! {
        #[test]
        fn rendered_length_matches_digit_count(raw in any::<u64>()) {
            let text = render_address(Address::new(raw));
            prop_assert_eq!(text.len(), decimal_len(raw));
            prop_assert_eq!(parse_address(&text).unwrap(), Address::new(raw));
        }
    }
}
