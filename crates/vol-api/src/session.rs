//! A dispatcher with the native connector registered.

use vol_connector::{ConnectorId, Vol, VolResult};
use vol_native::{NativeConfig, NativeConnector, NativeObject};

use crate::api::ObjectApi;

/// Process-scoped context: one dispatcher, the native connector registered
/// in it.
pub struct Session {
    vol: Vol<NativeObject>,
    connector: NativeConnector,
    native: ConnectorId,
}

impl Session {
    pub fn new(config: NativeConfig) -> VolResult<Self> {
        let connector = NativeConnector::new(config);
        let mut vol = Vol::new();
        let native = connector.register(vol.registry_mut())?;
        Ok(Self {
            vol,
            connector,
            native,
        })
    }

    pub fn vol(&self) -> &Vol<NativeObject> {
        &self.vol
    }

    pub fn connector(&self) -> &NativeConnector {
        &self.connector
    }

    /// Identity of the native connector in this session's registry.
    pub fn native(&self) -> ConnectorId {
        self.native
    }

    pub fn api(&self) -> ObjectApi<'_, NativeObject> {
        ObjectApi::new(&self.vol)
    }

    /// Register the native connector again, returning its identity.
    ///
    /// Registration is idempotent; this returns [`native`](Self::native)
    /// unless the connector was terminated in between.
    pub fn register_native(&mut self) -> VolResult<ConnectorId> {
        self.native = self.connector.register(self.vol.registry_mut())?;
        Ok(self.native)
    }

    /// Terminate every registered connector.
    pub fn terminate(&mut self) {
        self.vol.registry_mut().terminate_all();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}
