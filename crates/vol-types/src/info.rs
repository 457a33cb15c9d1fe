//! Object metadata records in their two generations.
//!
//! The current generation is split in two: [`ObjectInfo`] carries the common
//! fields every connector can report without extra work, while
//! [`NativeInfo`] carries storage-layout statistics that need a dedicated
//! backend query. Older call sites consume the flat [`LegacyObjectInfo`],
//! which merges both and identifies the object by address instead of token.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::handle::HandleKind;
use crate::token::Token;

/// The kind of a stored object, as reported by info queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    Unknown,
    Group,
    Dataset,
    NamedDatatype,
    Map,
}

impl ObjectType {
    /// The handle kind an opened object of this type is registered under.
    pub fn handle_kind(self) -> Option<HandleKind> {
        match self {
            Self::Group => Some(HandleKind::Group),
            Self::Dataset => Some(HandleKind::Dataset),
            Self::NamedDatatype => Some(HandleKind::Datatype),
            Self::Map => Some(HandleKind::Map),
            Self::Unknown => None,
        }
    }
}

/// Common object metadata (current generation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Number identifying the owning container within the process.
    pub fileno: u64,
    pub token: Token,
    pub obj_type: ObjectType,
    /// Number of hard links pointing at the object.
    pub rc: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub btime: i64,
    pub num_attrs: u64,
}

/// Space usage inside an object header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSpace {
    pub total: u64,
    pub meta: u64,
    pub mesg: u64,
    pub free: u64,
}

/// Bitsets of message types present in an object header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMessages {
    pub present: u64,
    pub shared: u64,
}

/// Object header layout statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub version: u32,
    pub nmesgs: u32,
    pub nchunks: u32,
    pub flags: u32,
    pub space: HeaderSpace,
    pub mesg: HeaderMessages,
}

/// Storage used by one index plus its backing heap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeapInfo {
    pub index_size: u64,
    pub heap_size: u64,
}

/// Index storage for an object's links and attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSize {
    /// Link index storage (groups only).
    pub obj: IndexHeapInfo,
    /// Attribute index storage.
    pub attr: IndexHeapInfo,
}

/// Native-only object metadata (current generation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeInfo {
    pub hdr: HeaderInfo,
    pub meta_size: MetaSize,
}

/// Flat object metadata as consumed by older call sites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyObjectInfo {
    pub fileno: u64,
    /// Object address. The only field that differs in representation from
    /// the current generation, which uses a [`Token`].
    pub addr: Address,
    pub obj_type: ObjectType,
    pub rc: u32,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
    pub btime: i64,
    pub num_attrs: u64,
    pub hdr: HeaderInfo,
    pub meta_size: MetaSize,
}

impl LegacyObjectInfo {
    /// Build a legacy record from a current-generation pair.
    ///
    /// Every common field is copied verbatim; the token is narrowed to an
    /// address. When `native` is `None` both native sub-records stay zeroed,
    /// otherwise both are copied. There is no way to populate only one.
    pub fn from_parts(info: &ObjectInfo, native: Option<&NativeInfo>) -> Self {
        let mut legacy = Self {
            fileno: info.fileno,
            // Tokens are written by the width-aware codec, which zero-fills
            // everything past the container's address width. The leading
            // eight bytes therefore hold the whole address for any width.
            addr: info.token.leading_address(),
            obj_type: info.obj_type,
            rc: info.rc,
            atime: info.atime,
            mtime: info.mtime,
            ctime: info.ctime,
            btime: info.btime,
            num_attrs: info.num_attrs,
            ..Self::default()
        };
        if let Some(native) = native {
            legacy.hdr = native.hdr;
            legacy.meta_size = native.meta_size;
        }
        legacy
    }

    /// The native sub-section, if it carries anything.
    pub fn native(&self) -> NativeInfo {
        NativeInfo {
            hdr: self.hdr,
            meta_size: self.meta_size,
        }
    }
}
