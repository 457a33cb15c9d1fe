//! Object token codec for the virtual object layer.
//!
//! A container addresses its objects with byte offsets whose encoded width is
//! fixed per container (commonly 4 or 8 bytes). Connector-agnostic code never
//! sees those addresses: it sees fixed-size [`Token`]s. This crate converts
//! between the two, and between a token and its stable decimal text form.
//!
//! # Encoding
//!
//! The low `width` bytes of the address are stored little-endian at the
//! start of the token; every remaining byte is zero. Decoding reads exactly
//! `width` bytes back and ignores the rest.
//!
//! # Text form
//!
//! The decimal rendering of the decoded address. It does not depend on the
//! width, so it is the form external tooling persists.
//!
//! [`Token`]: vol_types::Token

pub mod codec;
pub mod error;
pub mod text;

pub use codec::{compare, TokenCodec};
pub use error::{TokenError, TokenResult};
pub use text::{decimal_len, parse_address, render_address};
