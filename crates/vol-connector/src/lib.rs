//! Connector dispatch for the virtual object layer.
//!
//! Every object operation (create, open, read, write, get, specific,
//! optional, close on files, groups, datasets, datatypes, attributes,
//! links, and generic objects) reaches storage through a *connector*. A
//! connector describes itself with a [`ConnectorClass`]: identity, lifecycle
//! callbacks, and a [`CapabilityTable`] of operation slots grouped by
//! [`Subsystem`]. A slot left `None` means the connector does not support
//! that operation; invoking it yields [`VolError::Unsupported`].
//!
//! # Flow
//!
//! 1. A caller hands [`Vol`] a [`Handle`] and, where relevant, a
//!    [`Location`] describing how to reach the target from it.
//! 2. The location is validated and resolved into a
//!    `(connector, kind, LocationParams)` triple ([`Resolved`]).
//! 3. The dispatcher maps the handle kind to a subsystem, picks the slot
//!    for the requested operation, and invokes it.
//!
//! # Modules
//!
//! - [`class`]: Connector descriptor ([`ConnectorClass`], [`CapFlags`])
//! - [`table`]: Per-subsystem slot tables ([`CapabilityTable`])
//! - [`request`]: Arguments and replies for get/specific/optional slots
//! - [`location`]: [`Location`] descriptors and argument validation
//! - [`props`]: Access and creation property lists
//! - [`registry`]: [`ConnectorRegistry`] with idempotent registration
//! - [`handles`]: [`HandleTable`] mapping handles to connector objects
//! - [`dispatch`]: The [`Vol`] dispatcher
//!
//! [`Handle`]: vol_types::Handle

pub mod class;
pub mod dispatch;
pub mod error;
pub mod handles;
pub mod location;
pub mod props;
pub mod registry;
pub mod request;
pub mod subsystem;
pub mod table;

pub use class::{CapFlags, ConnectorClass, ConnectorLevel, ConnectorValue, LifecycleFn};
pub use dispatch::{Resolved, Vol};
pub use error::{ErrorClass, VolError, VolResult};
pub use handles::{HandleEntry, HandleGuard, HandleTable};
pub use location::{Location, LocationKind, LocationParams};
pub use props::{PropertyClass, PropertyList};
pub use registry::{ConnectorId, ConnectorRegistry};
pub use request::{
    BlobId, BlobSpecific, GetRequest, GetResponse, LinkInfo, LinkKind, LinkTarget, LinkValue,
    Opcode, OptionalArgs, OptionalRequest, OptionalResponse, RequestId, RequestStatus,
    SpecificRequest, SpecificResponse,
};
pub use subsystem::{Operation, Subsystem};
pub use table::CapabilityTable;
