use vol_types::{Address, AddressWidth};

/// Errors from token encoding and decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token text was empty.
    #[error("token string cannot be empty")]
    EmptyText,

    /// Token text was not a decimal number that fits in an address.
    #[error("invalid token string {text:?}: {reason}")]
    InvalidText { text: String, reason: String },

    /// The parsed address does not fit the container's address width.
    #[error("address {addr} does not fit in {width}-byte container addresses")]
    AddressOutOfRange { addr: Address, width: AddressWidth },
}

/// Result alias for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
