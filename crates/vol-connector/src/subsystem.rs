//! Subsystems and operations that index a capability table.

use std::fmt;

use serde::{Deserialize, Serialize};
use vol_types::HandleKind;

/// A group of related operation slots in a [`CapabilityTable`].
///
/// [`CapabilityTable`]: crate::table::CapabilityTable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subsystem {
    Attribute,
    Dataset,
    Datatype,
    File,
    Group,
    Link,
    Object,
    Introspect,
    Request,
    Blob,
    Token,
}

impl Subsystem {
    /// Every subsystem, in table order.
    pub const ALL: [Subsystem; 11] = [
        Self::Attribute,
        Self::Dataset,
        Self::Datatype,
        Self::File,
        Self::Group,
        Self::Link,
        Self::Object,
        Self::Introspect,
        Self::Request,
        Self::Blob,
        Self::Token,
    ];

    /// The subsystem whose slots serve handles of `kind`, if any.
    ///
    /// Maps have no subsystem here: no connector in this layer implements
    /// them, so they are rejected before reaching a slot.
    pub fn for_kind(kind: HandleKind) -> Option<Subsystem> {
        match kind {
            HandleKind::File => Some(Self::File),
            HandleKind::Group => Some(Self::Group),
            HandleKind::Datatype => Some(Self::Datatype),
            HandleKind::Dataset => Some(Self::Dataset),
            HandleKind::Attribute => Some(Self::Attribute),
            _ => None,
        }
    }

    /// The operations a table may provide for this subsystem.
    pub fn operations(self) -> &'static [Operation] {
        use Operation::*;
        match self {
            Self::Attribute | Self::Dataset => {
                &[Create, Open, Read, Write, Get, Specific, Optional, Close]
            }
            Self::Datatype => &[Commit, Open, Get, Specific, Optional, Close],
            Self::File | Self::Group => &[Create, Open, Get, Specific, Optional, Close],
            Self::Link => &[Create, Copy, Move, Get, Specific, Optional],
            Self::Object => &[Open, Copy, Get, Specific, Optional],
            Self::Introspect => &[GetConnectorClass, OptQuery],
            Self::Request => &[Wait, Notify, Cancel, Specific, Optional, Free],
            Self::Blob => &[Put, Get, Specific, Optional],
            Self::Token => &[Compare, ToString, FromString],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attribute => "attribute",
            Self::Dataset => "dataset",
            Self::Datatype => "datatype",
            Self::File => "file",
            Self::Group => "group",
            Self::Link => "link",
            Self::Object => "object",
            Self::Introspect => "introspect",
            Self::Request => "request",
            Self::Blob => "blob",
            Self::Token => "token",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation slot within a subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Open,
    Read,
    Write,
    Get,
    Specific,
    Optional,
    Close,
    Commit,
    Copy,
    Move,
    GetConnectorClass,
    OptQuery,
    Wait,
    Notify,
    Cancel,
    Free,
    Put,
    Compare,
    ToString,
    FromString,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Get => "get",
            Self::Specific => "specific",
            Self::Optional => "optional",
            Self::Close => "close",
            Self::Commit => "commit",
            Self::Copy => "copy",
            Self::Move => "move",
            Self::GetConnectorClass => "get_conn_cls",
            Self::OptQuery => "opt_query",
            Self::Wait => "wait",
            Self::Notify => "notify",
            Self::Cancel => "cancel",
            Self::Free => "free",
            Self::Put => "put",
            Self::Compare => "cmp",
            Self::ToString => "to_str",
            Self::FromString => "from_str",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_kinds_map_to_subsystems() {
        assert_eq!(Subsystem::for_kind(HandleKind::File), Some(Subsystem::File));
        assert_eq!(
            Subsystem::for_kind(HandleKind::Attribute),
            Some(Subsystem::Attribute)
        );
        assert_eq!(Subsystem::for_kind(HandleKind::Map), None);
        assert_eq!(Subsystem::for_kind(HandleKind::Dataspace), None);
    }

    #[test]
    fn datatype_commits_instead_of_creating() {
        let ops = Subsystem::Datatype.operations();
        assert!(ops.contains(&Operation::Commit));
        assert!(!ops.contains(&Operation::Create));
    }

    #[test]
    fn token_subsystem_has_no_free_slot() {
        assert_eq!(
            Subsystem::Token.operations(),
            &[Operation::Compare, Operation::ToString, Operation::FromString]
        );
    }
}
