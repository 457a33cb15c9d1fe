//! The native connector descriptor.

use std::sync::Arc;

use vol_connector::table::{
    CloseFn, CreateFn, GetFn, OptionalFn, ReadFn, SpecificFn, TransferFn, WriteFn,
};
use vol_connector::{
    CapFlags, ConnectorClass, ConnectorId, ConnectorRegistry, ConnectorValue, GetRequest,
    GetResponse, LocationParams, OptionalRequest, OptionalResponse, PropertyList,
    SpecificRequest, SpecificResponse, Vol, VolResult,
};
use vol_types::{Handle, HandleKind};

use crate::config::NativeConfig;
use crate::object::NativeObject;
use crate::opcode;
use crate::store::NativeStore;

pub const NATIVE_NAME: &str = "native";
pub const NATIVE_VALUE: ConnectorValue = ConnectorValue(0);
pub const NATIVE_VERSION: u32 = 0;

type Store = Arc<NativeStore>;

fn create(
    store: &Store,
    f: fn(&NativeStore, &NativeObject, &LocationParams, &str, &PropertyList) -> VolResult<NativeObject>,
) -> Option<CreateFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(
        move |o: &NativeObject, l: &LocationParams, name: &str, p: &PropertyList| f(&s, o, l, name, p),
    ))
}

fn read_slot(
    store: &Store,
    f: fn(&NativeStore, &NativeObject) -> VolResult<Vec<u8>>,
) -> Option<ReadFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(move |o: &NativeObject| f(&s, o)))
}

fn write_slot(
    store: &Store,
    f: fn(&NativeStore, &NativeObject, &[u8]) -> VolResult<()>,
) -> Option<WriteFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(move |o: &NativeObject, data: &[u8]| f(&s, o, data)))
}

fn get(
    store: &Store,
    f: fn(&NativeStore, &NativeObject, &LocationParams, GetRequest) -> VolResult<GetResponse>,
) -> Option<GetFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(
        move |o: &NativeObject, l: &LocationParams, r: GetRequest| f(&s, o, l, r),
    ))
}

fn specific(
    store: &Store,
    f: fn(
        &NativeStore,
        &NativeObject,
        &LocationParams,
        SpecificRequest<'_, NativeObject>,
    ) -> VolResult<SpecificResponse>,
) -> Option<SpecificFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(
        move |o: &NativeObject, l: &LocationParams, r: SpecificRequest<'_, NativeObject>| {
            f(&s, o, l, r)
        },
    ))
}

fn optional(
    store: &Store,
    f: fn(&NativeStore, &NativeObject, &LocationParams, &OptionalRequest) -> VolResult<OptionalResponse>,
) -> Option<OptionalFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(
        move |o: &NativeObject, l: &LocationParams, r: &OptionalRequest| f(&s, o, l, r),
    ))
}

fn close(
    store: &Store,
    f: fn(&NativeStore, &NativeObject) -> VolResult<()>,
) -> Option<CloseFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(move |o: &NativeObject| f(&s, o)))
}

fn transfer(
    store: &Store,
    f: fn(
        &NativeStore,
        &NativeObject,
        &LocationParams,
        &NativeObject,
        &LocationParams,
        &PropertyList,
    ) -> VolResult<()>,
) -> Option<TransferFn<NativeObject>> {
    let s = Arc::clone(store);
    Some(Arc::new(
        move |src: &NativeObject,
              sl: &LocationParams,
              dst: &NativeObject,
              dl: &LocationParams,
              p: &PropertyList| f(&s, src, sl, dst, dl, p),
    ))
}

/// The native connector: a [`NativeStore`] plus the capability table that
/// exposes it.
#[derive(Clone, Default)]
pub struct NativeConnector {
    store: Store,
}

impl NativeConnector {
    pub fn new(config: NativeConfig) -> Self {
        Self::with_store(Arc::new(NativeStore::new(config)))
    }

    pub fn with_store(store: Arc<NativeStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<NativeStore> {
        &self.store
    }

    /// Register with `registry`, or return the identity the native
    /// connector already has there.
    pub fn register(&self, registry: &mut ConnectorRegistry<NativeObject>) -> VolResult<ConnectorId> {
        registry.register_with(NATIVE_VALUE, NATIVE_NAME, || self.class())
    }

    /// Build the descriptor.
    ///
    /// The native backend is synchronous, so every request slot stays
    /// unset, as do the datatype, link and blob optional slots.
    pub fn class(&self) -> ConnectorClass<NativeObject> {
        let st = &self.store;
        let mut class = ConnectorClass::new(NATIVE_VALUE, NATIVE_NAME);
        class.version = NATIVE_VERSION;
        class.cap_flags = CapFlags::NONE;
        class.terminate = Some(Arc::new(|| {
            tracing::debug!(connector = NATIVE_NAME, "native connector terminated");
            Ok(())
        }));

        let t = &mut class.table;

        t.attribute.create = create(st, NativeStore::attr_create);
        t.attribute.open = create(st, NativeStore::attr_open);
        t.attribute.read = read_slot(st, NativeStore::attr_read);
        t.attribute.write = write_slot(st, NativeStore::attr_write);
        t.attribute.get = get(st, NativeStore::attr_get);
        t.attribute.specific = specific(st, NativeStore::attr_specific);
        t.attribute.optional = optional(st, NativeStore::attr_optional);
        t.attribute.close = close(st, NativeStore::object_close);

        t.dataset.create = create(st, NativeStore::dataset_create);
        t.dataset.open = create(st, NativeStore::dataset_open);
        t.dataset.read = read_slot(st, NativeStore::dataset_read);
        t.dataset.write = write_slot(st, NativeStore::dataset_write);
        t.dataset.get = get(st, NativeStore::dataset_get);
        t.dataset.specific = specific(st, NativeStore::dataset_specific);
        t.dataset.optional = optional(st, NativeStore::dataset_optional);
        t.dataset.close = close(st, NativeStore::object_close);

        let s = Arc::clone(st);
        t.datatype.commit = Some(Arc::new(
            move |o: &NativeObject, l: &LocationParams, name: &str, ty: &NativeObject| {
                s.datatype_commit(o, l, name, ty)
            },
        ));
        t.datatype.open = create(st, NativeStore::datatype_open);
        t.datatype.get = get(st, NativeStore::datatype_get);
        t.datatype.specific = specific(st, NativeStore::datatype_specific);
        t.datatype.close = close(st, NativeStore::object_close);

        let s = Arc::clone(st);
        t.file.create = Some(Arc::new(
            move |name: &str, fcpl: &PropertyList, fapl: &PropertyList| {
                s.file_create(name, fcpl, fapl)
            },
        ));
        let s = Arc::clone(st);
        t.file.open = Some(Arc::new(move |name: &str, fapl: &PropertyList| {
            s.file_open(name, fapl)
        }));
        t.file.get = get(st, NativeStore::file_get);
        t.file.specific = specific(st, NativeStore::file_specific);
        t.file.optional = optional(st, NativeStore::file_optional);
        t.file.close = close(st, NativeStore::file_close);

        t.group.create = create(st, NativeStore::group_create);
        t.group.open = create(st, NativeStore::group_open);
        t.group.get = get(st, NativeStore::group_get);
        t.group.specific = specific(st, NativeStore::group_specific);
        t.group.optional = optional(st, NativeStore::group_optional);
        t.group.close = close(st, NativeStore::object_close);

        let s = Arc::clone(st);
        t.link.create = Some(Arc::new(
            move |target: vol_connector::LinkTarget<'_, NativeObject>,
                  o: &NativeObject,
                  l: &LocationParams,
                  p: &PropertyList| s.link_create(target, o, l, p),
        ));
        t.link.copy = transfer(st, NativeStore::link_copy);
        t.link.move_ = transfer(st, NativeStore::link_move);
        t.link.get = get(st, NativeStore::link_get);
        t.link.specific = specific(st, NativeStore::link_specific);

        let s = Arc::clone(st);
        t.object.open = Some(Arc::new(move |o: &NativeObject, l: &LocationParams| {
            s.object_open(o, l)
        }));
        t.object.copy = transfer(st, NativeStore::object_copy);
        t.object.get = get(st, NativeStore::object_get);
        t.object.specific = specific(st, NativeStore::object_specific);
        t.object.optional = optional(st, NativeStore::object_optional);

        t.introspect.opt_query = Some(Arc::new(opcode::supports));

        let s = Arc::clone(st);
        t.blob.put = Some(Arc::new(move |o: &NativeObject, data: &[u8]| s.blob_put(o, data)));
        let s = Arc::clone(st);
        t.blob.get = Some(Arc::new(move |o: &NativeObject, id: &vol_connector::BlobId| {
            s.blob_get(o, id)
        }));
        let s = Arc::clone(st);
        t.blob.specific = Some(Arc::new(
            move |o: &NativeObject, id: &vol_connector::BlobId, r: vol_connector::BlobSpecific| {
                s.blob_specific(o, id, r)
            },
        ));

        let s = Arc::clone(st);
        t.token.cmp = Some(Arc::new(
            move |o: &NativeObject, a: &vol_types::Token, b: &vol_types::Token| s.token_cmp(o, a, b),
        ));
        let s = Arc::clone(st);
        t.token.to_str = Some(Arc::new(
            move |o: &NativeObject, kind: HandleKind, token: &vol_types::Token| {
                s.token_to_str(o, kind, token)
            },
        ));
        let s = Arc::clone(st);
        t.token.from_str = Some(Arc::new(
            move |o: &NativeObject, kind: HandleKind, text: &str| {
                s.token_from_str(o, kind, text)
            },
        ));

        class
    }
}

/// Issue a handle for a datatype that lives in no container yet.
///
/// Commit it with [`Vol::datatype_commit`] to store it under a name.
pub fn transient_datatype(
    vol: &Vol<NativeObject>,
    connector: ConnectorId,
    description: &str,
) -> VolResult<Handle> {
    vol.registry().get_class(connector)?;
    vol.handles().register(
        HandleKind::Datatype,
        connector,
        NativeObject::transient(description),
    )
}

#[cfg(test)]
mod tests {
    use vol_connector::{Operation, Subsystem};

    use super::*;

    fn registry() -> ConnectorRegistry<NativeObject> {
        ConnectorRegistry::new()
    }

    #[test]
    fn descriptor_identity() {
        let class = NativeConnector::default().class();
        assert_eq!(class.name, NATIVE_NAME);
        assert_eq!(class.value, NATIVE_VALUE);
        assert_eq!(class.version, NATIVE_VERSION);
        assert!(class.cap_flags.is_empty());
        assert!(class.initialize.is_none());
        assert!(class.terminate.is_some());
    }

    #[test]
    fn unset_slots_match_synchronous_backend() {
        let table = NativeConnector::default().class().table;
        let unset = table.unset_slots();
        for op in [
            Operation::Wait,
            Operation::Notify,
            Operation::Cancel,
            Operation::Specific,
            Operation::Optional,
            Operation::Free,
        ] {
            assert!(unset.contains(&(Subsystem::Request, op)), "{op}");
        }
        assert!(unset.contains(&(Subsystem::Datatype, Operation::Optional)));
        assert!(unset.contains(&(Subsystem::Link, Operation::Optional)));
        assert!(unset.contains(&(Subsystem::Blob, Operation::Optional)));
        assert_eq!(unset.len(), 9);
    }

    #[test]
    fn registering_twice_returns_same_identity() {
        let connector = NativeConnector::default();
        let mut reg = registry();
        let first = connector.register(&mut reg).unwrap();
        let second = connector.register(&mut reg).unwrap();
        assert_eq!(first, second);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn terminate_then_register_gives_new_identity() {
        let connector = NativeConnector::default();
        let mut reg = registry();
        let first = connector.register(&mut reg).unwrap();
        reg.terminate(first).unwrap();
        reg.terminate(first).unwrap();
        assert!(!reg.is_registered(first));
        let second = connector.register(&mut reg).unwrap();
        assert_ne!(first, second);
    }
}
