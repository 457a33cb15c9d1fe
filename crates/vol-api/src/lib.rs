//! Object-level API for the virtual object layer.
//!
//! [`ObjectApi`] wraps a [`Vol`] dispatcher with the entry points callers
//! use directly: object info queries, recursive visitation, and token text
//! conversion. Two generations of object info are served:
//!
//! - **Current**: [`ObjectInfo`] carries only the cheap common fields;
//!   native header statistics come from a separate query
//!   ([`ObjectApi::get_native_info`]).
//! - **Legacy**: [`LegacyObjectInfo`] is one flat record with an address
//!   instead of a token and the native fields merged in. The `*1` and `*2`
//!   entry points build it from the current generation.
//!
//! [`Session`] bundles a dispatcher with the native connector already
//! registered.
//!
//! [`Vol`]: vol_connector::Vol
//! [`ObjectInfo`]: vol_types::ObjectInfo
//! [`LegacyObjectInfo`]: vol_types::LegacyObjectInfo

pub mod api;
pub mod legacy;
pub mod objects;
pub mod session;
pub mod tokens;
pub mod visit;

pub use api::{ObjectApi, Traversal};
pub use session::Session;

pub use vol_connector::{VolError, VolResult};
pub use vol_types::{
    Handle, IndexType, InfoFields, IterOrder, LegacyObjectInfo, NativeInfo, ObjectInfo,
};
