//! Handle table: maps caller-facing handles to connector objects.
//!
//! [`HandleTable`] keeps entries in a `HashMap` behind a `RwLock`. Entries
//! are cloned out on lookup, so no lock is held while a connector slot runs
//! and slots may register or release handles themselves.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use vol_types::{Handle, HandleKind};

use crate::error::{VolError, VolResult};
use crate::registry::ConnectorId;

/// What a handle refers to.
#[derive(Clone, Debug)]
pub struct HandleEntry<O> {
    pub kind: HandleKind,
    pub connector: ConnectorId,
    pub object: O,
}

/// Issues and resolves handles.
#[derive(Debug)]
pub struct HandleTable<O> {
    entries: RwLock<HashMap<Handle, HandleEntry<O>>>,
    next: AtomicU64,
}

impl<O: Clone> Default for HandleTable<O> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(e: impl std::fmt::Display) -> VolError {
    VolError::Backend(format!("handle table lock poisoned: {e}"))
}

impl<O: Clone> HandleTable<O> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next: AtomicU64::new(1),
        }
    }

    /// Register an object and issue a new handle for it.
    pub fn register(&self, kind: HandleKind, connector: ConnectorId, object: O) -> VolResult<Handle> {
        let handle = Handle::from_raw(self.next.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(
            handle,
            HandleEntry {
                kind,
                connector,
                object,
            },
        );
        tracing::trace!(%handle, %kind, "registered handle");
        Ok(handle)
    }

    /// Register an object and release the handle when the guard drops.
    pub fn register_scoped(
        &self,
        kind: HandleKind,
        connector: ConnectorId,
        object: O,
    ) -> VolResult<HandleGuard<'_, O>> {
        let handle = self.register(kind, connector, object)?;
        Ok(HandleGuard {
            table: self,
            handle,
        })
    }

    pub fn get(&self, handle: Handle) -> VolResult<HandleEntry<O>> {
        let entries = self.entries.read().map_err(poisoned)?;
        entries
            .get(&handle)
            .cloned()
            .ok_or(VolError::InvalidHandle(handle))
    }

    pub fn kind(&self, handle: Handle) -> VolResult<HandleKind> {
        let entries = self.entries.read().map_err(poisoned)?;
        entries
            .get(&handle)
            .map(|e| e.kind)
            .ok_or(VolError::InvalidHandle(handle))
    }

    /// Swap the object behind a live handle, e.g. when a transient
    /// datatype is committed in place.
    pub fn replace(&self, handle: Handle, kind: HandleKind, object: O) -> VolResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries
            .get_mut(&handle)
            .ok_or(VolError::InvalidHandle(handle))?;
        entry.kind = kind;
        entry.object = object;
        Ok(())
    }

    pub fn release(&self, handle: Handle) -> VolResult<HandleEntry<O>> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries
            .remove(&handle)
            .ok_or(VolError::InvalidHandle(handle))?;
        tracing::trace!(%handle, kind = %entry.kind, "released handle");
        Ok(entry)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(&handle))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases its handle on drop.
pub struct HandleGuard<'a, O: Clone> {
    table: &'a HandleTable<O>,
    handle: Handle,
}

impl<O: Clone> HandleGuard<'_, O> {
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

impl<O: Clone> Drop for HandleGuard<'_, O> {
    fn drop(&mut self) {
        if let Err(err) = self.table.release(self.handle) {
            tracing::warn!(handle = %self.handle, error = %err, "failed to release scoped handle");
        }
    }
}
