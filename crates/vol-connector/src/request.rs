//! Arguments and replies for the get, specific, and optional slots.

use std::fmt;

use serde::{Deserialize, Serialize};
use vol_types::{
    AddressWidth, HandleKind, IndexType, InfoFields, IterOrder, NativeInfo, ObjectInfo,
    ObjectType, Token,
};

use crate::error::{VolError, VolResult};
use crate::location::LocationParams;

/// A query answered by a `get` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GetRequest {
    /// Container name for files, object path otherwise.
    Name,
    FileNo,
    AddressWidth,
    /// Common object info, restricted to the given fields.
    Info(InfoFields),
    /// Link count for groups, attribute count for other objects.
    Count,
    /// Metadata about the link the location names.
    LinkInfo,
    /// Target of the soft or external link the location names.
    LinkValue,
    /// Description of a datatype.
    Description,
    ObjectType,
}

/// Reply from a `get` slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GetResponse {
    Name(String),
    FileNo(u64),
    AddressWidth(AddressWidth),
    Info(ObjectInfo),
    Count(u64),
    LinkInfo(LinkInfo),
    LinkValue(LinkValue),
    Description(String),
    ObjectType(ObjectType),
}

fn unexpected<T>(wanted: &str, got: &GetResponse) -> VolResult<T> {
    Err(VolError::Backend(format!(
        "connector answered a {wanted} query with {got:?}"
    )))
}

impl GetResponse {
    pub fn into_name(self) -> VolResult<String> {
        match self {
            Self::Name(name) => Ok(name),
            other => unexpected("name", &other),
        }
    }

    pub fn into_fileno(self) -> VolResult<u64> {
        match self {
            Self::FileNo(n) => Ok(n),
            other => unexpected("fileno", &other),
        }
    }

    pub fn into_address_width(self) -> VolResult<AddressWidth> {
        match self {
            Self::AddressWidth(w) => Ok(w),
            other => unexpected("address width", &other),
        }
    }

    pub fn into_info(self) -> VolResult<ObjectInfo> {
        match self {
            Self::Info(info) => Ok(info),
            other => unexpected("info", &other),
        }
    }

    pub fn into_count(self) -> VolResult<u64> {
        match self {
            Self::Count(n) => Ok(n),
            other => unexpected("count", &other),
        }
    }

    pub fn into_link_info(self) -> VolResult<LinkInfo> {
        match self {
            Self::LinkInfo(info) => Ok(info),
            other => unexpected("link info", &other),
        }
    }

    pub fn into_link_value(self) -> VolResult<LinkValue> {
        match self {
            Self::LinkValue(value) => Ok(value),
            other => unexpected("link value", &other),
        }
    }

    pub fn into_description(self) -> VolResult<String> {
        match self {
            Self::Description(d) => Ok(d),
            other => unexpected("description", &other),
        }
    }

    pub fn into_object_type(self) -> VolResult<ObjectType> {
        match self {
            Self::ObjectType(t) => Ok(t),
            other => unexpected("object type", &other),
        }
    }
}

/// How a link reaches its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Hard,
    Soft,
    External,
}

/// Metadata about one link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub kind: LinkKind,
    /// Target token, for hard links.
    pub token: Option<Token>,
    /// Creation order, if the group tracks it.
    pub corder: Option<i64>,
    /// Size of the stored link value, for soft and external links.
    pub value_size: usize,
}

/// Stored target of a soft or external link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkValue {
    Soft(String),
    External { file: String, path: String },
}

/// What a new link points at.
pub enum LinkTarget<'a, O> {
    /// An existing object, reached from `object` through `location`.
    Hard {
        object: &'a O,
        location: &'a LocationParams,
    },
    Soft {
        path: &'a str,
    },
    External {
        file: &'a str,
        path: &'a str,
    },
}

/// Callback for recursive visitation.
///
/// Receives the visited object, its kind, its path relative to the start
/// (`"."` for the start itself), and its common info. Returns `0` to
/// continue, a positive value to stop early with that value, or a negative
/// value to fail.
pub type VisitFn<'a, O> = dyn FnMut(&O, HandleKind, &str, &ObjectInfo) -> VolResult<i32> + 'a;

/// Callback for single-group link iteration. Same status convention as
/// [`VisitFn`].
pub type LinkIterFn<'a> = dyn FnMut(&str, &LinkInfo) -> VolResult<i32> + 'a;

/// A request answered by a `specific` slot.
pub enum SpecificRequest<'a, O> {
    /// Whether a link (or attribute, for the attribute subsystem) exists.
    Exists { name: &'a str },
    /// Remove a link (or attribute).
    Delete { name: &'a str },
    /// Iterate the links of one group without recursing.
    IterateLinks {
        idx_type: IndexType,
        order: IterOrder,
        op: &'a mut LinkIterFn<'a>,
    },
    /// Recursively visit every object reachable by hard links.
    Visit {
        idx_type: IndexType,
        order: IterOrder,
        fields: InfoFields,
        op: &'a mut VisitFn<'a, O>,
    },
    Flush,
}

impl<O> SpecificRequest<'_, O> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exists { .. } => "exists",
            Self::Delete { .. } => "delete",
            Self::IterateLinks { .. } => "iterate",
            Self::Visit { .. } => "visit",
            Self::Flush => "flush",
        }
    }
}

impl<O> fmt::Debug for SpecificRequest<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpecificRequest::{}", self.name())
    }
}

/// Reply from a `specific` slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecificResponse {
    Done,
    Exists(bool),
    /// Terminating status of an iteration or visitation.
    Status(i32),
}

impl SpecificResponse {
    pub fn into_exists(self) -> VolResult<bool> {
        match self {
            Self::Exists(b) => Ok(b),
            other => Err(VolError::Backend(format!(
                "connector answered an exists query with {other:?}"
            ))),
        }
    }

    pub fn into_status(self) -> VolResult<i32> {
        match self {
            Self::Status(s) => Ok(s),
            other => Err(VolError::Backend(format!(
                "connector answered a traversal with {other:?}"
            ))),
        }
    }
}

/// Connector-defined opcode for `optional` slots.
///
/// The dispatcher never interprets opcodes; only the connector that
/// defined one knows what it means.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Opcode(pub u32);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opcode {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionalArgs {
    None,
    Fields(InfoFields),
    Text(String),
}

/// A connector-specific request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionalRequest {
    pub opcode: Opcode,
    pub args: OptionalArgs,
}

impl OptionalRequest {
    pub fn new(opcode: Opcode, args: OptionalArgs) -> Self {
        Self { opcode, args }
    }

    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, OptionalArgs::None)
    }
}

/// Reply from an `optional` slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionalResponse {
    Done,
    NativeInfo(NativeInfo),
    Text(Option<String>),
    Value(u64),
}

impl OptionalResponse {
    pub fn into_native_info(self) -> VolResult<NativeInfo> {
        match self {
            Self::NativeInfo(info) => Ok(info),
            other => Err(VolError::Backend(format!(
                "expected native info, got {other:?}"
            ))),
        }
    }

    pub fn into_value(self) -> VolResult<u64> {
        match self {
            Self::Value(v) => Ok(v),
            other => Err(VolError::Backend(format!("expected a value, got {other:?}"))),
        }
    }

    pub fn into_text(self) -> VolResult<Option<String>> {
        match self {
            Self::Text(t) => Ok(t),
            other => Err(VolError::Backend(format!("expected text, got {other:?}"))),
        }
    }
}

/// Identifier of an asynchronous request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

/// Identifier of a stored blob, as returned by a blob `put` slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobId(pub Vec<u8>);

impl BlobId {
    /// Returns `true` for an empty or all-zero id.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobSpecific {
    IsNull,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_response_is_backend_error() {
        let err = GetResponse::Count(3).into_info().unwrap_err();
        assert!(matches!(err, VolError::Backend(_)));
        assert_eq!(GetResponse::Count(3).into_count().unwrap(), 3);
    }

    #[test]
    fn blob_id_null() {
        assert!(BlobId::default().is_null());
        assert!(BlobId(vec![0, 0, 0]).is_null());
        assert!(!BlobId(vec![0, 1]).is_null());
    }

    #[test]
    fn specific_request_debug_names_variant() {
        let req: SpecificRequest<'_, ()> = SpecificRequest::Flush;
        assert_eq!(format!("{req:?}"), "SpecificRequest::flush");
    }
}
