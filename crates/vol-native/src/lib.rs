//! The native connector.
//!
//! An in-memory backend for the virtual object layer. Containers live in a
//! [`NativeStore`], keyed by name, each with its own file number, address
//! width and allocator. [`NativeConnector`] fills in a capability table
//! whose slots run against that store.
//!
//! # Modules
//!
//! - [`config`]: [`NativeConfig`], loadable from TOML
//! - [`container`]: Containers, object headers, groups and links
//! - [`header`]: Derived header statistics (native info)
//! - [`info`]: Common and native object info
//! - [`store`]: [`NativeStore`] and path resolution
//! - [`visit`]: Recursive visitation and link iteration
//! - [`opcode`]: Optional opcodes the connector understands
//! - [`connector`]: The descriptor and its slots
//! - [`width`]: Address width lookup for any handle
//!
//! # Example
//!
//! ```
//! use vol_connector::Vol;
//! use vol_native::{file_address_width, NativeConnector};
//!
//! let mut vol = Vol::new();
//! let native = NativeConnector::default().register(vol.registry_mut()).unwrap();
//! let file = vol.file_create(native, "demo.h5", None, None).unwrap();
//! let group = vol.group_create(file, "g", None).unwrap();
//! assert_eq!(file_address_width(&vol, group).unwrap().bytes(), 8);
//! ```

pub mod config;
pub mod connector;
pub mod container;
pub mod error;
pub mod header;
pub mod info;
pub mod object;
pub mod opcode;
mod ops;
pub mod store;
pub mod visit;
pub mod width;

pub use config::NativeConfig;
pub use connector::{
    transient_datatype, NativeConnector, NATIVE_NAME, NATIVE_VALUE, NATIVE_VERSION,
};
pub use container::FileRef;
pub use error::{ConfigError, ConfigResult};
pub use object::NativeObject;
pub use store::NativeStore;
pub use width::{addr_to_token, file_address_width, token_to_addr};
