//! Foundation types for the virtual object layer (VOL).
//!
//! This crate provides the identity, addressing, and metadata types shared by
//! every VOL crate. Connectors, the dispatcher, and the compatibility layer all
//! speak in terms of these types.
//!
//! # Key Types
//!
//! - [`Handle`] / [`HandleKind`]: Caller-facing identifiers for live objects
//! - [`Address`] / [`AddressWidth`]: Container-internal byte offsets and their encoded width
//! - [`Token`]: Fixed-size, connector-agnostic object identity
//! - [`IndexType`] / [`IterOrder`]: Link index selection for iteration and visitation
//! - [`InfoFields`]: Field-selection mask for object info queries
//! - [`ObjectInfo`] / [`NativeInfo`]: Current (two-part) object metadata
//! - [`LegacyObjectInfo`]: Flat object metadata for older call sites

pub mod address;
pub mod error;
pub mod fields;
pub mod handle;
pub mod info;
pub mod iter;
pub mod token;

pub use address::{Address, AddressWidth};
pub use error::TypeError;
pub use fields::InfoFields;
pub use handle::{Handle, HandleKind};
pub use info::{
    HeaderInfo, HeaderMessages, HeaderSpace, IndexHeapInfo, LegacyObjectInfo, MetaSize,
    NativeInfo, ObjectInfo, ObjectType,
};
pub use iter::{IndexType, IterOrder};
pub use token::{Token, TOKEN_SIZE};
