//! The connector descriptor.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::VolResult;
use crate::table::CapabilityTable;

/// Stable numeric identifier of a connector implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorValue(pub i32);

impl fmt::Display for ConnectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability flags a connector advertises about itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapFlags(u64);

impl CapFlags {
    pub const NONE: CapFlags = CapFlags(0);
    /// Operations may complete asynchronously through request slots.
    pub const ASYNC: CapFlags = CapFlags(0x1);
    /// The connector forwards to another connector beneath it.
    pub const PASSTHROUGH: CapFlags = CapFlags(0x2);
    /// Slots may be called concurrently from several threads.
    pub const THREADSAFE: CapFlags = CapFlags(0x4);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, other: CapFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for CapFlags {
    type Output = CapFlags;

    fn bitor(self, rhs: CapFlags) -> CapFlags {
        CapFlags(self.0 | rhs.0)
    }
}

/// Which class to report when a connector is queried about itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorLevel {
    /// The connector the handle was opened through.
    Current,
    /// The terminal connector at the bottom of a pass-through stack.
    Terminal,
}

/// Lifecycle hook run at registration or termination.
pub type LifecycleFn = Arc<dyn Fn() -> VolResult<()> + Send + Sync>;

/// A connector descriptor: identity, lifecycle hooks, and capability table.
#[derive(Clone)]
pub struct ConnectorClass<O> {
    /// Version of the descriptor layout the connector was built against.
    pub version: u32,
    pub value: ConnectorValue,
    pub name: String,
    pub cap_flags: CapFlags,
    pub initialize: Option<LifecycleFn>,
    pub terminate: Option<LifecycleFn>,
    pub table: CapabilityTable<O>,
}

impl<O> ConnectorClass<O> {
    /// A descriptor with no hooks and an empty table.
    pub fn new(value: ConnectorValue, name: impl Into<String>) -> Self {
        Self {
            version: 0,
            value,
            name: name.into(),
            cap_flags: CapFlags::NONE,
            initialize: None,
            terminate: None,
            table: CapabilityTable::default(),
        }
    }
}

impl<O> fmt::Debug for ConnectorClass<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorClass")
            .field("version", &self.version)
            .field("value", &self.value)
            .field("name", &self.name)
            .field("cap_flags", &self.cap_flags)
            .field("initialize", &self.initialize.is_some())
            .field("terminate", &self.terminate.is_some())
            .field("slots", &self.table.set_slots().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_class_is_bare() {
        let class: ConnectorClass<()> = ConnectorClass::new(ConnectorValue(42), "test");
        assert_eq!(class.name, "test");
        assert!(class.cap_flags.is_empty());
        assert!(class.initialize.is_none());
        assert!(class.terminate.is_none());
    }

    #[test]
    fn cap_flags_combine() {
        let flags = CapFlags::ASYNC | CapFlags::THREADSAFE;
        assert!(flags.contains(CapFlags::ASYNC));
        assert!(!flags.contains(CapFlags::PASSTHROUGH));
        assert_eq!(flags.bits(), 0x5);
    }

    #[test]
    fn debug_hides_callbacks() {
        let class: ConnectorClass<()> = ConnectorClass::new(ConnectorValue(1), "dbg");
        let text = format!("{class:?}");
        assert!(text.contains("\"dbg\""));
        assert!(text.contains("initialize: false"));
    }
}
