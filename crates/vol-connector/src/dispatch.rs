//! The dispatcher.
//!
//! [`Vol`] owns the connector registry and the handle table. Each entry
//! point resolves the caller's handle to `(connector, kind, object)`,
//! picks the capability slot for the subsystem and operation, and invokes
//! it. All argument and identity checks happen before the slot runs.

use std::cmp::Ordering;

use vol_types::{Handle, HandleKind, Token};

use crate::class::{ConnectorClass, ConnectorLevel};
use crate::error::{VolError, VolResult};
use crate::handles::{HandleEntry, HandleTable};
use crate::location::{validate_name, Location, LocationParams};
use crate::props::{PropertyClass, PropertyList};
use crate::registry::{ConnectorId, ConnectorRegistry};
use crate::request::{
    BlobId, BlobSpecific, GetRequest, GetResponse, LinkTarget, Opcode, OptionalRequest,
    OptionalResponse, RequestId, RequestStatus, SpecificRequest, SpecificResponse,
};
use crate::subsystem::{Operation, Subsystem};
use crate::table::{
    require, require_slot, CapabilityTable, CloseFn, GetFn, OptionalFn, SpecificFn,
};

/// A location resolved against its starting handle.
pub struct Resolved<'a, O> {
    pub handle: Handle,
    pub connector: ConnectorId,
    pub class: &'a ConnectorClass<O>,
    pub object: O,
    pub params: LocationParams,
}

/// Registry plus handle table: the context every operation runs in.
pub struct Vol<O> {
    registry: ConnectorRegistry<O>,
    handles: HandleTable<O>,
}

impl<O: Clone + Send + Sync + 'static> Default for Vol<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Clone + Send + Sync + 'static> Vol<O> {
    pub fn new() -> Self {
        Self {
            registry: ConnectorRegistry::new(),
            handles: HandleTable::new(),
        }
    }

    pub fn registry(&self) -> &ConnectorRegistry<O> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConnectorRegistry<O> {
        &mut self.registry
    }

    pub fn handles(&self) -> &HandleTable<O> {
        &self.handles
    }

    /// Look up a handle and the class of the connector it was opened
    /// through.
    pub fn entry(&self, handle: Handle) -> VolResult<(HandleEntry<O>, &ConnectorClass<O>)> {
        let entry = self.handles.get(handle)?;
        let class = self.registry.get_class(entry.connector)?;
        Ok((entry, class))
    }

    /// Validate `location` and bind it to the starting handle.
    ///
    /// Checks run in a fixed order: argument shape, then handle identity,
    /// then the access property list. No connector code runs here.
    pub fn resolve(&self, handle: Handle, location: Location) -> VolResult<Resolved<'_, O>> {
        location.validate()?;
        let (entry, class) = self.entry(handle)?;
        if !entry.kind.is_location() {
            return Err(VolError::WrongKind {
                handle,
                expected: "file or file object",
                actual: entry.kind,
            });
        }
        if let Some(lapl) = location.lapl() {
            lapl.verify(PropertyClass::LinkAccess)?;
            if lapl.collective_metadata_reads() {
                tracing::debug!(%handle, "collective metadata reads requested");
            }
        }
        Ok(Resolved {
            handle,
            connector: entry.connector,
            class,
            object: entry.object,
            params: LocationParams::new(location, entry.kind),
        })
    }

    fn expect_kind(
        &self,
        handle: Handle,
        kind: HandleKind,
    ) -> VolResult<(HandleEntry<O>, &ConnectorClass<O>)> {
        let (entry, class) = self.entry(handle)?;
        if entry.kind != kind {
            return Err(VolError::WrongKind {
                handle,
                expected: kind.as_str(),
                actual: entry.kind,
            });
        }
        Ok((entry, class))
    }

    fn subsystem_for(
        &self,
        handle: Handle,
        entry: &HandleEntry<O>,
        class: &ConnectorClass<O>,
    ) -> VolResult<Subsystem> {
        match Subsystem::for_kind(entry.kind) {
            Some(s) => Ok(s),
            None if entry.kind == HandleKind::Map => Err(VolError::UnsupportedKind {
                kind: entry.kind,
                connector: class.name.clone(),
            }),
            None => Err(VolError::WrongKind {
                handle,
                expected: "file or file object",
                actual: entry.kind,
            }),
        }
    }

    // ----------------------------------------------------------------
    // Kind-dispatched operations
    // ----------------------------------------------------------------

    /// Answer a `get` query through the slot for the handle's kind.
    pub fn get(&self, handle: Handle, request: GetRequest) -> VolResult<GetResponse> {
        let (entry, class) = self.entry(handle)?;
        let subsystem = self.subsystem_for(handle, &entry, class)?;
        let slot = get_slot(&class.table, subsystem);
        let f = require_slot(slot, &class.name, subsystem, Operation::Get)?;
        f(&entry.object, &LocationParams::by_self(entry.kind), request)
    }

    /// Run a `specific` request through the slot for the handle's kind.
    pub fn specific(
        &self,
        handle: Handle,
        request: SpecificRequest<'_, O>,
    ) -> VolResult<SpecificResponse> {
        let (entry, class) = self.entry(handle)?;
        let subsystem = self.subsystem_for(handle, &entry, class)?;
        let slot = specific_slot(&class.table, subsystem);
        let f = require_slot(slot, &class.name, subsystem, Operation::Specific)?;
        f(&entry.object, &LocationParams::by_self(entry.kind), request)
    }

    /// Run a connector-defined request through the slot for the handle's
    /// kind.
    pub fn optional(
        &self,
        handle: Handle,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let (entry, class) = self.entry(handle)?;
        let subsystem = self.subsystem_for(handle, &entry, class)?;
        let slot = optional_slot(&class.table, subsystem);
        let f = require_slot(slot, &class.name, subsystem, Operation::Optional)?;
        f(&entry.object, &LocationParams::by_self(entry.kind), request)
    }

    /// Close the object behind a handle and release the handle.
    pub fn close(&self, handle: Handle) -> VolResult<()> {
        let (entry, class) = self.entry(handle)?;
        let subsystem = self.subsystem_for(handle, &entry, class)?;
        let slot = close_slot(&class.table, subsystem);
        let f = require_slot(slot, &class.name, subsystem, Operation::Close)?;
        f(&entry.object)?;
        self.handles.release(handle)?;
        if entry.kind == HandleKind::File {
            tracing::info!(%handle, "closed container");
        }
        Ok(())
    }

    // ----------------------------------------------------------------
    // Files
    // ----------------------------------------------------------------

    pub fn file_create(
        &self,
        connector: ConnectorId,
        name: &str,
        fcpl: Option<&PropertyList>,
        fapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        validate_name(name, "file name")?;
        let fcpl = PropertyList::resolve(fcpl, PropertyClass::FileCreate)?;
        let fapl = PropertyList::resolve(fapl, PropertyClass::FileAccess)?;
        let class = self.registry.get_class(connector)?;
        let f = require(&class.table.file.create, &class.name, Subsystem::File, Operation::Create)?;
        let object = f(name, &fcpl, &fapl)?;
        let handle = self.handles.register(HandleKind::File, connector, object)?;
        tracing::info!(%handle, name, connector = %class.name, "created container");
        Ok(handle)
    }

    pub fn file_open(
        &self,
        connector: ConnectorId,
        name: &str,
        fapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        validate_name(name, "file name")?;
        let fapl = PropertyList::resolve(fapl, PropertyClass::FileAccess)?;
        let class = self.registry.get_class(connector)?;
        let f = require(&class.table.file.open, &class.name, Subsystem::File, Operation::Open)?;
        let object = f(name, &fapl)?;
        let handle = self.handles.register(HandleKind::File, connector, object)?;
        tracing::info!(%handle, name, connector = %class.name, "opened container");
        Ok(handle)
    }

    // ----------------------------------------------------------------
    // Groups, datasets, datatypes
    // ----------------------------------------------------------------

    pub fn group_create(
        &self,
        handle: Handle,
        name: &str,
        gcpl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        validate_name(name, "name")?;
        let gcpl = PropertyList::resolve(gcpl, PropertyClass::GroupCreate)?;
        let r = self.resolve(handle, Location::BySelf)?;
        let f = require(&r.class.table.group.create, &r.class.name, Subsystem::Group, Operation::Create)?;
        let object = f(&r.object, &r.params, name, &gcpl)?;
        self.handles.register(HandleKind::Group, r.connector, object)
    }

    pub fn group_open(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        self.open_named(handle, name, lapl, Subsystem::Group, HandleKind::Group)
    }

    pub fn dataset_create(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        validate_name(name, "name")?;
        let lapl = PropertyList::resolve(lapl, PropertyClass::LinkAccess)?;
        let r = self.resolve(handle, Location::BySelf)?;
        let f = require(&r.class.table.dataset.create, &r.class.name, Subsystem::Dataset, Operation::Create)?;
        let object = f(&r.object, &r.params, name, &lapl)?;
        self.handles.register(HandleKind::Dataset, r.connector, object)
    }

    pub fn dataset_open(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        self.open_named(handle, name, lapl, Subsystem::Dataset, HandleKind::Dataset)
    }

    pub fn dataset_read(&self, handle: Handle) -> VolResult<Vec<u8>> {
        let (entry, class) = self.expect_kind(handle, HandleKind::Dataset)?;
        let f = require(&class.table.dataset.read, &class.name, Subsystem::Dataset, Operation::Read)?;
        f(&entry.object)
    }

    pub fn dataset_write(&self, handle: Handle, data: &[u8]) -> VolResult<()> {
        let (entry, class) = self.expect_kind(handle, HandleKind::Dataset)?;
        let f = require(&class.table.dataset.write, &class.name, Subsystem::Dataset, Operation::Write)?;
        f(&entry.object, data)
    }

    /// Commit the transient datatype behind `type_handle` under `name`.
    ///
    /// The handle stays valid and refers to the committed type afterwards.
    pub fn datatype_commit(&self, handle: Handle, name: &str, type_handle: Handle) -> VolResult<()> {
        validate_name(name, "name")?;
        let (transient, _) = self.expect_kind(type_handle, HandleKind::Datatype)?;
        let r = self.resolve(handle, Location::BySelf)?;
        let f = require(&r.class.table.datatype.commit, &r.class.name, Subsystem::Datatype, Operation::Commit)?;
        let committed = f(&r.object, &r.params, name, &transient.object)?;
        self.handles.replace(type_handle, HandleKind::Datatype, committed)
    }

    pub fn datatype_open(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
    ) -> VolResult<Handle> {
        self.open_named(handle, name, lapl, Subsystem::Datatype, HandleKind::Datatype)
    }

    fn open_named(
        &self,
        handle: Handle,
        name: &str,
        lapl: Option<&PropertyList>,
        subsystem: Subsystem,
        kind: HandleKind,
    ) -> VolResult<Handle> {
        validate_name(name, "name")?;
        let lapl = PropertyList::resolve(lapl, PropertyClass::LinkAccess)?;
        let r = self.resolve(handle, Location::BySelf)?;
        let slot = match subsystem {
            Subsystem::Group => Some(&r.class.table.group.open),
            Subsystem::Dataset => Some(&r.class.table.dataset.open),
            Subsystem::Datatype => Some(&r.class.table.datatype.open),
            Subsystem::Attribute => Some(&r.class.table.attribute.open),
            _ => None,
        };
        let f = require_slot(slot, &r.class.name, subsystem, Operation::Open)?;
        let object = f(&r.object, &r.params, name, &lapl)?;
        tracing::debug!(%handle, name, %kind, "opened object");
        self.handles.register(kind, r.connector, object)
    }

    // ----------------------------------------------------------------
    // Attributes
    // ----------------------------------------------------------------

    /// Create an attribute on the object `location` names.
    pub fn attr_create(&self, handle: Handle, location: Location, name: &str) -> VolResult<Handle> {
        validate_name(name, "attribute name")?;
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.attribute.create, &r.class.name, Subsystem::Attribute, Operation::Create)?;
        let object = f(&r.object, &r.params, name, &PropertyList::link_access())?;
        self.handles.register(HandleKind::Attribute, r.connector, object)
    }

    pub fn attr_open(&self, handle: Handle, location: Location, name: &str) -> VolResult<Handle> {
        validate_name(name, "attribute name")?;
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.attribute.open, &r.class.name, Subsystem::Attribute, Operation::Open)?;
        let object = f(&r.object, &r.params, name, &PropertyList::link_access())?;
        self.handles.register(HandleKind::Attribute, r.connector, object)
    }

    pub fn attr_read(&self, handle: Handle) -> VolResult<Vec<u8>> {
        let (entry, class) = self.expect_kind(handle, HandleKind::Attribute)?;
        let f = require(&class.table.attribute.read, &class.name, Subsystem::Attribute, Operation::Read)?;
        f(&entry.object)
    }

    pub fn attr_write(&self, handle: Handle, data: &[u8]) -> VolResult<()> {
        let (entry, class) = self.expect_kind(handle, HandleKind::Attribute)?;
        let f = require(&class.table.attribute.write, &class.name, Subsystem::Attribute, Operation::Write)?;
        f(&entry.object, data)
    }

    // ----------------------------------------------------------------
    // Links
    // ----------------------------------------------------------------

    /// Create a hard link at `location` (from `handle`) to the object
    /// `target_location` names (from `target`).
    pub fn link_create_hard(
        &self,
        target: Handle,
        target_location: Location,
        handle: Handle,
        location: Location,
    ) -> VolResult<()> {
        let t = self.resolve(target, target_location)?;
        let r = self.resolve(handle, location)?;
        if t.connector != r.connector {
            return Err(VolError::bad_argument(
                "hard link target is managed by a different connector",
            ));
        }
        let link = LinkTarget::Hard {
            object: &t.object,
            location: &t.params,
        };
        self.link_create(&r, link)
    }

    pub fn link_create_soft(&self, path: &str, handle: Handle, location: Location) -> VolResult<()> {
        validate_name(path, "link target")?;
        let r = self.resolve(handle, location)?;
        self.link_create(&r, LinkTarget::Soft { path })
    }

    pub fn link_create_external(
        &self,
        file: &str,
        path: &str,
        handle: Handle,
        location: Location,
    ) -> VolResult<()> {
        validate_name(file, "external file name")?;
        validate_name(path, "external object path")?;
        let r = self.resolve(handle, location)?;
        self.link_create(&r, LinkTarget::External { file, path })
    }

    fn link_create(&self, r: &Resolved<'_, O>, link: LinkTarget<'_, O>) -> VolResult<()> {
        let f = require(&r.class.table.link.create, &r.class.name, Subsystem::Link, Operation::Create)?;
        f(link, &r.object, &r.params, &PropertyList::link_access())
    }

    pub fn link_copy(
        &self,
        src: Handle,
        src_location: Location,
        dst: Handle,
        dst_location: Location,
    ) -> VolResult<()> {
        self.transfer(src, src_location, dst, dst_location, Subsystem::Link, Operation::Copy)
    }

    pub fn link_move(
        &self,
        src: Handle,
        src_location: Location,
        dst: Handle,
        dst_location: Location,
    ) -> VolResult<()> {
        self.transfer(src, src_location, dst, dst_location, Subsystem::Link, Operation::Move)
    }

    pub fn link_get(
        &self,
        handle: Handle,
        location: Location,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.link.get, &r.class.name, Subsystem::Link, Operation::Get)?;
        f(&r.object, &r.params, request)
    }

    pub fn link_specific(
        &self,
        handle: Handle,
        location: Location,
        request: SpecificRequest<'_, O>,
    ) -> VolResult<SpecificResponse> {
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.link.specific, &r.class.name, Subsystem::Link, Operation::Specific)?;
        f(&r.object, &r.params, request)
    }

    pub fn link_optional(
        &self,
        handle: Handle,
        location: Location,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.link.optional, &r.class.name, Subsystem::Link, Operation::Optional)?;
        f(&r.object, &r.params, request)
    }

    // ----------------------------------------------------------------
    // Generic objects
    // ----------------------------------------------------------------

    /// Open whatever object `location` names and issue a handle of the
    /// matching kind.
    pub fn object_open(&self, handle: Handle, location: Location) -> VolResult<Handle> {
        let r = self.resolve(handle, location)?;
        let f = require(&r.class.table.object.open, &r.class.name, Subsystem::Object, Operation::Open)?;
        let (object, kind) = f(&r.object, &r.params)?;
        tracing::debug!(%handle, location = ?r.params.location.kind(), %kind, "opened object");
        self.handles.register(kind, r.connector, object)
    }

    pub fn object_copy(
        &self,
        src: Handle,
        src_location: Location,
        dst: Handle,
        dst_location: Location,
    ) -> VolResult<()> {
        self.transfer(src, src_location, dst, dst_location, Subsystem::Object, Operation::Copy)
    }

    pub fn object_get(
        &self,
        handle: Handle,
        location: Location,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let r = self.resolve(handle, location)?;
        self.object_get_resolved(&r, request)
    }

    pub fn object_get_resolved(
        &self,
        r: &Resolved<'_, O>,
        request: GetRequest,
    ) -> VolResult<GetResponse> {
        let f = require(&r.class.table.object.get, &r.class.name, Subsystem::Object, Operation::Get)?;
        f(&r.object, &r.params, request)
    }

    pub fn object_specific(
        &self,
        handle: Handle,
        location: Location,
        request: SpecificRequest<'_, O>,
    ) -> VolResult<SpecificResponse> {
        let r = self.resolve(handle, location)?;
        self.object_specific_resolved(&r, request)
    }

    pub fn object_specific_resolved(
        &self,
        r: &Resolved<'_, O>,
        request: SpecificRequest<'_, O>,
    ) -> VolResult<SpecificResponse> {
        let f = require(&r.class.table.object.specific, &r.class.name, Subsystem::Object, Operation::Specific)?;
        f(&r.object, &r.params, request)
    }

    pub fn object_optional(
        &self,
        handle: Handle,
        location: Location,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let r = self.resolve(handle, location)?;
        self.object_optional_resolved(&r, request)
    }

    pub fn object_optional_resolved(
        &self,
        r: &Resolved<'_, O>,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let f = require(&r.class.table.object.optional, &r.class.name, Subsystem::Object, Operation::Optional)?;
        f(&r.object, &r.params, request)
    }

    fn transfer(
        &self,
        src: Handle,
        src_location: Location,
        dst: Handle,
        dst_location: Location,
        subsystem: Subsystem,
        operation: Operation,
    ) -> VolResult<()> {
        let s = self.resolve(src, src_location)?;
        let d = self.resolve(dst, dst_location)?;
        if s.connector != d.connector {
            return Err(VolError::bad_argument(format!(
                "cannot {operation} between objects of different connectors"
            )));
        }
        let table = &s.class.table;
        let (slot, props) = match (subsystem, operation) {
            (Subsystem::Link, Operation::Copy) => (&table.link.copy, PropertyList::link_access()),
            (Subsystem::Link, Operation::Move) => (&table.link.move_, PropertyList::link_access()),
            _ => (&table.object.copy, PropertyList::object_copy()),
        };
        let f = require(slot, &s.class.name, subsystem, operation)?;
        f(&s.object, &s.params, &d.object, &d.params, &props)
    }

    // ----------------------------------------------------------------
    // Introspection
    // ----------------------------------------------------------------

    /// The class of the connector a handle was opened through.
    ///
    /// Connectors registered here are terminal, so both levels report the
    /// same class.
    pub fn connector_class(
        &self,
        handle: Handle,
        level: ConnectorLevel,
    ) -> VolResult<&ConnectorClass<O>> {
        let (_, class) = self.entry(handle)?;
        tracing::trace!(%handle, ?level, name = %class.name, "connector class lookup");
        Ok(class)
    }

    /// Whether the handle's connector implements `opcode` for `subsystem`.
    pub fn opt_query(&self, handle: Handle, subsystem: Subsystem, opcode: Opcode) -> VolResult<bool> {
        let (_, class) = self.entry(handle)?;
        let f = require(&class.table.introspect.opt_query, &class.name, Subsystem::Introspect, Operation::OptQuery)?;
        Ok(f(subsystem, opcode))
    }

    // ----------------------------------------------------------------
    // Asynchronous requests
    // ----------------------------------------------------------------

    pub fn request(
        &self,
        connector: ConnectorId,
        operation: Operation,
        id: RequestId,
    ) -> VolResult<RequestStatus> {
        let class = self.registry.get_class(connector)?;
        let table = &class.table.request;
        let slot = match operation {
            Operation::Wait => &table.wait,
            Operation::Notify => &table.notify,
            Operation::Cancel => &table.cancel,
            Operation::Specific => &table.specific,
            Operation::Optional => &table.optional,
            Operation::Free => &table.free,
            other => {
                return Err(VolError::bad_argument(format!(
                    "{other} is not a request operation"
                )))
            }
        };
        let f = require(slot, &class.name, Subsystem::Request, operation)?;
        f(id)
    }

    // ----------------------------------------------------------------
    // Blobs
    // ----------------------------------------------------------------

    pub fn blob_put(&self, handle: Handle, data: &[u8]) -> VolResult<BlobId> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.blob.put, &class.name, Subsystem::Blob, Operation::Put)?;
        f(&entry.object, data)
    }

    pub fn blob_get(&self, handle: Handle, id: &BlobId) -> VolResult<Vec<u8>> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.blob.get, &class.name, Subsystem::Blob, Operation::Get)?;
        f(&entry.object, id)
    }

    pub fn blob_specific(
        &self,
        handle: Handle,
        id: &BlobId,
        request: BlobSpecific,
    ) -> VolResult<SpecificResponse> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.blob.specific, &class.name, Subsystem::Blob, Operation::Specific)?;
        f(&entry.object, id, request)
    }

    pub fn blob_optional(
        &self,
        handle: Handle,
        id: &BlobId,
        request: &OptionalRequest,
    ) -> VolResult<OptionalResponse> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.blob.optional, &class.name, Subsystem::Blob, Operation::Optional)?;
        f(&entry.object, id, request)
    }

    // ----------------------------------------------------------------
    // Tokens
    // ----------------------------------------------------------------

    /// Compare two tokens through the handle's connector.
    pub fn token_cmp(&self, handle: Handle, a: &Token, b: &Token) -> VolResult<Ordering> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.token.cmp, &class.name, Subsystem::Token, Operation::Compare)?;
        f(&entry.object, a, b)
    }

    pub fn token_to_str(&self, handle: Handle, token: &Token) -> VolResult<String> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.token.to_str, &class.name, Subsystem::Token, Operation::ToString)?;
        f(&entry.object, entry.kind, token)
    }

    pub fn token_from_str(&self, handle: Handle, text: &str) -> VolResult<Token> {
        let (entry, class) = self.entry(handle)?;
        let f = require(&class.table.token.from_str, &class.name, Subsystem::Token, Operation::FromString)?;
        f(&entry.object, entry.kind, text)
    }
}

fn get_slot<O>(table: &CapabilityTable<O>, subsystem: Subsystem) -> Option<&Option<GetFn<O>>> {
    match subsystem {
        Subsystem::File => Some(&table.file.get),
        Subsystem::Group => Some(&table.group.get),
        Subsystem::Dataset => Some(&table.dataset.get),
        Subsystem::Datatype => Some(&table.datatype.get),
        Subsystem::Attribute => Some(&table.attribute.get),
        _ => None,
    }
}

fn specific_slot<O>(table: &CapabilityTable<O>, subsystem: Subsystem) -> Option<&Option<SpecificFn<O>>> {
    match subsystem {
        Subsystem::File => Some(&table.file.specific),
        Subsystem::Group => Some(&table.group.specific),
        Subsystem::Dataset => Some(&table.dataset.specific),
        Subsystem::Datatype => Some(&table.datatype.specific),
        Subsystem::Attribute => Some(&table.attribute.specific),
        _ => None,
    }
}

fn optional_slot<O>(table: &CapabilityTable<O>, subsystem: Subsystem) -> Option<&Option<OptionalFn<O>>> {
    match subsystem {
        Subsystem::File => Some(&table.file.optional),
        Subsystem::Group => Some(&table.group.optional),
        Subsystem::Dataset => Some(&table.dataset.optional),
        Subsystem::Datatype => Some(&table.datatype.optional),
        Subsystem::Attribute => Some(&table.attribute.optional),
        _ => None,
    }
}

fn close_slot<O>(table: &CapabilityTable<O>, subsystem: Subsystem) -> Option<&Option<CloseFn<O>>> {
    match subsystem {
        Subsystem::File => Some(&table.file.close),
        Subsystem::Group => Some(&table.group.close),
        Subsystem::Dataset => Some(&table.dataset.close),
        Subsystem::Datatype => Some(&table.datatype.close),
        Subsystem::Attribute => Some(&table.attribute.close),
        _ => None,
    }
}
