//! Connector registration.
//!
//! Registering the same connector twice hands back the identity issued the
//! first time. Termination removes the entry; a later registration issues a
//! fresh identity. Identities are never reused.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::class::{ConnectorClass, ConnectorValue};
use crate::error::{VolError, VolResult};

/// Identity issued to a registered connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectorId(u64);

impl ConnectorId {
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connector#{}", self.0)
    }
}

/// The set of registered connectors.
pub struct ConnectorRegistry<O> {
    classes: BTreeMap<ConnectorId, ConnectorClass<O>>,
    next_id: u64,
}

impl<O> Default for ConnectorRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> ConnectorRegistry<O> {
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a connector, or return the identity it already has.
    ///
    /// A connector matches an existing entry when both its value and name
    /// match. Reusing one without the other is an error.
    pub fn register(&mut self, class: ConnectorClass<O>) -> VolResult<ConnectorId> {
        if let Some(id) = self.existing(class.value, &class.name)? {
            tracing::debug!(%id, name = %class.name, "connector already registered");
            return Ok(id);
        }
        self.insert(class)
    }

    /// Like [`register`](Self::register), but only builds the descriptor
    /// when the connector is not registered yet.
    pub fn register_with<F>(
        &mut self,
        value: ConnectorValue,
        name: &str,
        build: F,
    ) -> VolResult<ConnectorId>
    where
        F: FnOnce() -> ConnectorClass<O>,
    {
        if let Some(id) = self.existing(value, name)? {
            tracing::debug!(%id, name, "connector already registered");
            return Ok(id);
        }
        let class = build();
        if class.value != value || class.name != name {
            return Err(VolError::bad_argument(format!(
                "connector descriptor '{}' ({}) does not match requested '{name}' ({value})",
                class.name, class.value
            )));
        }
        self.insert(class)
    }

    fn existing(&self, value: ConnectorValue, name: &str) -> VolResult<Option<ConnectorId>> {
        for (&id, class) in &self.classes {
            let same_value = class.value == value;
            let same_name = class.name == name;
            if same_value && same_name {
                return Ok(Some(id));
            }
            if same_value || same_name {
                return Err(VolError::bad_argument(format!(
                    "connector '{name}' ({value}) conflicts with registered '{}' ({})",
                    class.name, class.value
                )));
            }
        }
        Ok(None)
    }

    fn insert(&mut self, class: ConnectorClass<O>) -> VolResult<ConnectorId> {
        if let Some(init) = &class.initialize {
            init()?;
        }
        let id = ConnectorId(self.next_id);
        self.next_id += 1;
        tracing::info!(%id, name = %class.name, value = %class.value, "registered connector");
        self.classes.insert(id, class);
        Ok(id)
    }

    /// Unregister a connector, running its terminate hook.
    ///
    /// Terminating an identity that is not registered is a no-op.
    pub fn terminate(&mut self, id: ConnectorId) -> VolResult<()> {
        let Some(class) = self.classes.remove(&id) else {
            tracing::debug!(%id, "terminate on unregistered connector");
            return Ok(());
        };
        tracing::info!(%id, name = %class.name, "terminating connector");
        match &class.terminate {
            Some(term) => term(),
            None => Ok(()),
        }
    }

    /// Terminate every registered connector. Hook failures are logged.
    pub fn terminate_all(&mut self) {
        let ids: Vec<ConnectorId> = self.classes.keys().copied().collect();
        for id in ids {
            if let Err(err) = self.terminate(id) {
                tracing::warn!(%id, error = %err, "connector terminate hook failed");
            }
        }
    }

    pub fn get_class(&self, id: ConnectorId) -> VolResult<&ConnectorClass<O>> {
        self.classes.get(&id).ok_or(VolError::InvalidConnector(id))
    }

    pub fn is_registered(&self, id: ConnectorId) -> bool {
        self.classes.contains_key(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ConnectorId> {
        self.classes
            .iter()
            .find(|(_, class)| class.name == name)
            .map(|(&id, _)| id)
    }

    pub fn find_by_value(&self, value: ConnectorValue) -> Option<ConnectorId> {
        self.classes
            .iter()
            .find(|(_, class)| class.value == value)
            .map(|(&id, _)| id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ConnectorId> + '_ {
        self.classes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
