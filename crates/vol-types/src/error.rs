use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid address width: {0} bytes (must be 2..=8)")]
    InvalidAddressWidth(usize),

    #[error("invalid index type specified: {0}")]
    InvalidIndexType(i32),

    #[error("invalid iteration order specified: {0}")]
    InvalidIterOrder(i32),

    #[error("invalid fields mask: {0:#x}")]
    InvalidFields(u32),
}
