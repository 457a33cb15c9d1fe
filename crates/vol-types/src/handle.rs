use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of object a [`Handle`] refers to.
///
/// Only the first six kinds can act as the starting point of an object
/// operation; the rest are bookkeeping kinds that share the handle space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    File,
    Group,
    Datatype,
    Dataset,
    Attribute,
    Map,
    Dataspace,
    PropertyList,
    Connector,
}

impl HandleKind {
    /// Returns `true` if a handle of this kind may be used as a location.
    pub fn is_location(self) -> bool {
        matches!(
            self,
            Self::File | Self::Group | Self::Datatype | Self::Dataset | Self::Attribute | Self::Map
        )
    }

    /// Lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Group => "group",
            Self::Datatype => "datatype",
            Self::Dataset => "dataset",
            Self::Attribute => "attribute",
            Self::Map => "map",
            Self::Dataspace => "dataspace",
            Self::PropertyList => "property list",
            Self::Connector => "connector",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque identifier for a live object, issued by a handle table.
///
/// Handles are never reused within one table, so a stale handle resolves to
/// "invalid" rather than to an unrelated object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    /// The invalid handle. Never issued by a table.
    pub const INVALID: Handle = Handle(0);

    /// Wrap a raw handle value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` unless this is [`Handle::INVALID`].
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_handle_is_not_valid() {
        assert!(!Handle::INVALID.is_valid());
        assert!(Handle::from_raw(7).is_valid());
    }

    #[test]
    fn location_kinds() {
        assert!(HandleKind::File.is_location());
        assert!(HandleKind::Attribute.is_location());
        assert!(HandleKind::Map.is_location());
        assert!(!HandleKind::Dataspace.is_location());
        assert!(!HandleKind::PropertyList.is_location());
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", Handle::from_raw(42)), "#42");
        assert_eq!(HandleKind::Dataset.to_string(), "dataset");
    }
}
