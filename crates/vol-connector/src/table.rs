//! Capability tables: one optional slot per (subsystem, operation).
//!
//! A connector fills in the slots it supports and leaves the rest `None`.
//! The table is handed to the registry inside a
//! [`ConnectorClass`](crate::class::ConnectorClass) and never changes
//! afterwards.

use std::cmp::Ordering;
use std::sync::Arc;

use vol_types::{HandleKind, Token};

use crate::error::{VolError, VolResult};
use crate::location::LocationParams;
use crate::props::PropertyList;
use crate::request::{
    BlobId, BlobSpecific, GetRequest, GetResponse, LinkTarget, Opcode, OptionalRequest,
    OptionalResponse, RequestId, RequestStatus, SpecificRequest, SpecificResponse,
};
use crate::subsystem::{Operation, Subsystem};

/// Create a container: `(name, fcpl, fapl)`.
pub type FileCreateFn<O> =
    Arc<dyn Fn(&str, &PropertyList, &PropertyList) -> VolResult<O> + Send + Sync>;
/// Open a container: `(name, fapl)`.
pub type FileOpenFn<O> = Arc<dyn Fn(&str, &PropertyList) -> VolResult<O> + Send + Sync>;
/// Create or open a named object relative to a location.
pub type CreateFn<O> =
    Arc<dyn Fn(&O, &LocationParams, &str, &PropertyList) -> VolResult<O> + Send + Sync>;
pub type OpenFn<O> = CreateFn<O>;
/// Commit a transient datatype under a name. Returns the committed object.
pub type CommitFn<O> = Arc<dyn Fn(&O, &LocationParams, &str, &O) -> VolResult<O> + Send + Sync>;
pub type ReadFn<O> = Arc<dyn Fn(&O) -> VolResult<Vec<u8>> + Send + Sync>;
pub type WriteFn<O> = Arc<dyn Fn(&O, &[u8]) -> VolResult<()> + Send + Sync>;
pub type GetFn<O> =
    Arc<dyn Fn(&O, &LocationParams, GetRequest) -> VolResult<GetResponse> + Send + Sync>;
pub type SpecificFn<O> = Arc<
    dyn Fn(&O, &LocationParams, SpecificRequest<'_, O>) -> VolResult<SpecificResponse>
        + Send
        + Sync,
>;
pub type OptionalFn<O> = Arc<
    dyn Fn(&O, &LocationParams, &OptionalRequest) -> VolResult<OptionalResponse> + Send + Sync,
>;
pub type CloseFn<O> = Arc<dyn Fn(&O) -> VolResult<()> + Send + Sync>;
/// Create a link named by the location, pointing at the target.
pub type LinkCreateFn<O> = Arc<
    dyn Fn(LinkTarget<'_, O>, &O, &LocationParams, &PropertyList) -> VolResult<()> + Send + Sync,
>;
/// Copy or move from a source location to a destination location.
pub type TransferFn<O> = Arc<
    dyn Fn(&O, &LocationParams, &O, &LocationParams, &PropertyList) -> VolResult<()>
        + Send
        + Sync,
>;
pub type ObjectOpenFn<O> =
    Arc<dyn Fn(&O, &LocationParams) -> VolResult<(O, HandleKind)> + Send + Sync>;
/// Whether the connector implements an optional opcode for a subsystem.
pub type OptQueryFn = Arc<dyn Fn(Subsystem, Opcode) -> bool + Send + Sync>;
pub type RequestFn = Arc<dyn Fn(RequestId) -> VolResult<RequestStatus> + Send + Sync>;
pub type BlobPutFn<O> = Arc<dyn Fn(&O, &[u8]) -> VolResult<BlobId> + Send + Sync>;
pub type BlobGetFn<O> = Arc<dyn Fn(&O, &BlobId) -> VolResult<Vec<u8>> + Send + Sync>;
pub type BlobSpecificFn<O> =
    Arc<dyn Fn(&O, &BlobId, BlobSpecific) -> VolResult<SpecificResponse> + Send + Sync>;
pub type BlobOptionalFn<O> =
    Arc<dyn Fn(&O, &BlobId, &OptionalRequest) -> VolResult<OptionalResponse> + Send + Sync>;
pub type TokenCmpFn<O> = Arc<dyn Fn(&O, &Token, &Token) -> VolResult<Ordering> + Send + Sync>;
pub type TokenToStrFn<O> = Arc<dyn Fn(&O, HandleKind, &Token) -> VolResult<String> + Send + Sync>;
pub type TokenFromStrFn<O> =
    Arc<dyn Fn(&O, HandleKind, &str) -> VolResult<Token> + Send + Sync>;

/// Attribute slots.
#[derive(Clone)]
pub struct AttributeClass<O> {
    pub create: Option<CreateFn<O>>,
    pub open: Option<OpenFn<O>>,
    pub read: Option<ReadFn<O>>,
    pub write: Option<WriteFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
    pub close: Option<CloseFn<O>>,
}

impl<O> Default for AttributeClass<O> {
    fn default() -> Self {
        Self {
            create: None,
            open: None,
            read: None,
            write: None,
            get: None,
            specific: None,
            optional: None,
            close: None,
        }
    }
}

/// Dataset slots.
#[derive(Clone)]
pub struct DatasetClass<O> {
    pub create: Option<CreateFn<O>>,
    pub open: Option<OpenFn<O>>,
    pub read: Option<ReadFn<O>>,
    pub write: Option<WriteFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
    pub close: Option<CloseFn<O>>,
}

impl<O> Default for DatasetClass<O> {
    fn default() -> Self {
        Self {
            create: None,
            open: None,
            read: None,
            write: None,
            get: None,
            specific: None,
            optional: None,
            close: None,
        }
    }
}

/// Committed-datatype slots.
#[derive(Clone)]
pub struct DatatypeClass<O> {
    pub commit: Option<CommitFn<O>>,
    pub open: Option<OpenFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
    pub close: Option<CloseFn<O>>,
}

impl<O> Default for DatatypeClass<O> {
    fn default() -> Self {
        Self {
            commit: None,
            open: None,
            get: None,
            specific: None,
            optional: None,
            close: None,
        }
    }
}

/// Container slots.
#[derive(Clone)]
pub struct FileClass<O> {
    pub create: Option<FileCreateFn<O>>,
    pub open: Option<FileOpenFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
    pub close: Option<CloseFn<O>>,
}

impl<O> Default for FileClass<O> {
    fn default() -> Self {
        Self {
            create: None,
            open: None,
            get: None,
            specific: None,
            optional: None,
            close: None,
        }
    }
}

/// Group slots.
#[derive(Clone)]
pub struct GroupClass<O> {
    pub create: Option<CreateFn<O>>,
    pub open: Option<OpenFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
    pub close: Option<CloseFn<O>>,
}

impl<O> Default for GroupClass<O> {
    fn default() -> Self {
        Self {
            create: None,
            open: None,
            get: None,
            specific: None,
            optional: None,
            close: None,
        }
    }
}

/// Link slots.
#[derive(Clone)]
pub struct LinkClass<O> {
    pub create: Option<LinkCreateFn<O>>,
    pub copy: Option<TransferFn<O>>,
    pub move_: Option<TransferFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
}

impl<O> Default for LinkClass<O> {
    fn default() -> Self {
        Self {
            create: None,
            copy: None,
            move_: None,
            get: None,
            specific: None,
            optional: None,
        }
    }
}

/// Generic object slots, usable from any location handle.
#[derive(Clone)]
pub struct ObjectClass<O> {
    pub open: Option<ObjectOpenFn<O>>,
    pub copy: Option<TransferFn<O>>,
    pub get: Option<GetFn<O>>,
    pub specific: Option<SpecificFn<O>>,
    pub optional: Option<OptionalFn<O>>,
}

impl<O> Default for ObjectClass<O> {
    fn default() -> Self {
        Self {
            open: None,
            copy: None,
            get: None,
            specific: None,
            optional: None,
        }
    }
}

/// Introspection slots.
///
/// Looking up a connector's own class needs no slot: the registry answers
/// it from the handle's connector id.
#[derive(Clone, Default)]
pub struct IntrospectClass {
    pub opt_query: Option<OptQueryFn>,
}

/// Asynchronous request slots.
#[derive(Clone, Default)]
pub struct RequestClass {
    pub wait: Option<RequestFn>,
    pub notify: Option<RequestFn>,
    pub cancel: Option<RequestFn>,
    pub specific: Option<RequestFn>,
    pub optional: Option<RequestFn>,
    pub free: Option<RequestFn>,
}

/// Blob slots.
#[derive(Clone)]
pub struct BlobClass<O> {
    pub put: Option<BlobPutFn<O>>,
    pub get: Option<BlobGetFn<O>>,
    pub specific: Option<BlobSpecificFn<O>>,
    pub optional: Option<BlobOptionalFn<O>>,
}

impl<O> Default for BlobClass<O> {
    fn default() -> Self {
        Self {
            put: None,
            get: None,
            specific: None,
            optional: None,
        }
    }
}

/// Token slots.
#[derive(Clone)]
pub struct TokenClass<O> {
    pub cmp: Option<TokenCmpFn<O>>,
    pub to_str: Option<TokenToStrFn<O>>,
    pub from_str: Option<TokenFromStrFn<O>>,
}

impl<O> Default for TokenClass<O> {
    fn default() -> Self {
        Self {
            cmp: None,
            to_str: None,
            from_str: None,
        }
    }
}

/// Every slot a connector can provide, grouped by subsystem.
#[derive(Clone)]
pub struct CapabilityTable<O> {
    pub attribute: AttributeClass<O>,
    pub dataset: DatasetClass<O>,
    pub datatype: DatatypeClass<O>,
    pub file: FileClass<O>,
    pub group: GroupClass<O>,
    pub link: LinkClass<O>,
    pub object: ObjectClass<O>,
    pub introspect: IntrospectClass,
    pub request: RequestClass,
    pub blob: BlobClass<O>,
    pub token: TokenClass<O>,
}

impl<O> Default for CapabilityTable<O> {
    fn default() -> Self {
        Self {
            attribute: AttributeClass::default(),
            dataset: DatasetClass::default(),
            datatype: DatatypeClass::default(),
            file: FileClass::default(),
            group: GroupClass::default(),
            link: LinkClass::default(),
            object: ObjectClass::default(),
            introspect: IntrospectClass::default(),
            request: RequestClass::default(),
            blob: BlobClass::default(),
            token: TokenClass::default(),
        }
    }
}

impl<O> CapabilityTable<O> {
    /// An empty table: every slot unset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the slot for `(subsystem, operation)` is set.
    ///
    /// Pairs that do not name a slot (e.g. `(Token, Read)`) are never set.
    pub fn is_set(&self, subsystem: Subsystem, operation: Operation) -> bool {
        use Operation as Op;
        match subsystem {
            Subsystem::Attribute => {
                let c = &self.attribute;
                match operation {
                    Op::Create => c.create.is_some(),
                    Op::Open => c.open.is_some(),
                    Op::Read => c.read.is_some(),
                    Op::Write => c.write.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Close => c.close.is_some(),
                    _ => false,
                }
            }
            Subsystem::Dataset => {
                let c = &self.dataset;
                match operation {
                    Op::Create => c.create.is_some(),
                    Op::Open => c.open.is_some(),
                    Op::Read => c.read.is_some(),
                    Op::Write => c.write.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Close => c.close.is_some(),
                    _ => false,
                }
            }
            Subsystem::Datatype => {
                let c = &self.datatype;
                match operation {
                    Op::Commit => c.commit.is_some(),
                    Op::Open => c.open.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Close => c.close.is_some(),
                    _ => false,
                }
            }
            Subsystem::File => {
                let c = &self.file;
                match operation {
                    Op::Create => c.create.is_some(),
                    Op::Open => c.open.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Close => c.close.is_some(),
                    _ => false,
                }
            }
            Subsystem::Group => {
                let c = &self.group;
                match operation {
                    Op::Create => c.create.is_some(),
                    Op::Open => c.open.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Close => c.close.is_some(),
                    _ => false,
                }
            }
            Subsystem::Link => {
                let c = &self.link;
                match operation {
                    Op::Create => c.create.is_some(),
                    Op::Copy => c.copy.is_some(),
                    Op::Move => c.move_.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    _ => false,
                }
            }
            Subsystem::Object => {
                let c = &self.object;
                match operation {
                    Op::Open => c.open.is_some(),
                    Op::Copy => c.copy.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    _ => false,
                }
            }
            Subsystem::Introspect => match operation {
                Op::GetConnectorClass => true,
                Op::OptQuery => self.introspect.opt_query.is_some(),
                _ => false,
            },
            Subsystem::Request => {
                let c = &self.request;
                match operation {
                    Op::Wait => c.wait.is_some(),
                    Op::Notify => c.notify.is_some(),
                    Op::Cancel => c.cancel.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    Op::Free => c.free.is_some(),
                    _ => false,
                }
            }
            Subsystem::Blob => {
                let c = &self.blob;
                match operation {
                    Op::Put => c.put.is_some(),
                    Op::Get => c.get.is_some(),
                    Op::Specific => c.specific.is_some(),
                    Op::Optional => c.optional.is_some(),
                    _ => false,
                }
            }
            Subsystem::Token => {
                let c = &self.token;
                match operation {
                    Op::Compare => c.cmp.is_some(),
                    Op::ToString => c.to_str.is_some(),
                    Op::FromString => c.from_str.is_some(),
                    _ => false,
                }
            }
        }
    }

    /// Every set slot, in table order.
    pub fn set_slots(&self) -> Vec<(Subsystem, Operation)> {
        Subsystem::ALL
            .iter()
            .flat_map(|&s| s.operations().iter().map(move |&op| (s, op)))
            .filter(|&(s, op)| self.is_set(s, op))
            .collect()
    }

    /// Every slot the subsystem defines but this table leaves unset.
    pub fn unset_slots(&self) -> Vec<(Subsystem, Operation)> {
        Subsystem::ALL
            .iter()
            .flat_map(|&s| s.operations().iter().map(move |&op| (s, op)))
            .filter(|&(s, op)| !self.is_set(s, op))
            .collect()
    }
}

/// Borrow a slot, or fail with [`VolError::Unsupported`] if it is unset.
pub fn require<'s, T: ?Sized>(
    slot: &'s Option<Arc<T>>,
    connector: &str,
    subsystem: Subsystem,
    operation: Operation,
) -> VolResult<&'s T> {
    require_slot(Some(slot), connector, subsystem, operation)
}

/// Like [`require`], for lookups where the subsystem may not define the
/// operation at all (`None`).
pub fn require_slot<'s, T: ?Sized>(
    slot: Option<&'s Option<Arc<T>>>,
    connector: &str,
    subsystem: Subsystem,
    operation: Operation,
) -> VolResult<&'s T> {
    match slot.and_then(Option::as_ref) {
        Some(f) => Ok(&**f),
        None => {
            tracing::debug!(connector, %subsystem, %operation, "capability slot unset");
            Err(VolError::Unsupported {
                connector: connector.to_string(),
                subsystem,
                operation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_has_no_slots() {
        let table: CapabilityTable<()> = CapabilityTable::empty();
        assert!(table.set_slots().iter().all(|&(s, _)| s == Subsystem::Introspect));
        assert!(!table.is_set(Subsystem::Token, Operation::Compare));
    }

    #[test]
    fn set_slot_is_reported() {
        let mut table: CapabilityTable<()> = CapabilityTable::empty();
        table.group.close = Some(Arc::new(|_: &()| Ok(())));
        assert!(table.is_set(Subsystem::Group, Operation::Close));
        assert!(!table.is_set(Subsystem::Group, Operation::Open));
        assert!(table
            .set_slots()
            .contains(&(Subsystem::Group, Operation::Close)));
    }

    #[test]
    fn non_slot_pairs_are_never_set() {
        let table: CapabilityTable<()> = CapabilityTable::empty();
        assert!(!table.is_set(Subsystem::Token, Operation::Read));
        assert!(!table.is_set(Subsystem::Datatype, Operation::Create));
    }

    #[test]
    fn require_unset_slot_is_unsupported() {
        let slot: Option<CloseFn<()>> = None;
        let err = require(&slot, "test", Subsystem::File, Operation::Close)
            .err()
            .unwrap();
        assert!(err.is_unsupported());
    }

    #[test]
    fn require_set_slot_returns_callable() {
        let slot: Option<CloseFn<()>> = Some(Arc::new(|_: &()| Ok(())));
        let f = require(&slot, "test", Subsystem::File, Operation::Close).unwrap();
        assert!(f(&()).is_ok());
    }
}
