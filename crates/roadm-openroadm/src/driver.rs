//! OpenROADM driver handle.

use crate::cache::ConnectionCacheManager;
use crate::ports::line_ports;
use roadm_driver_common::{
    DefaultOperation, DeviceInventory, Document, DriverConfig, DriverError, DriverResult,
    NetconfSession, SessionProvider,
};
use roadm_types::{DeviceId, Port, PortNumber};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Provider of NETCONF sessions.
pub type NetconfSessionProvider = dyn SessionProvider<dyn NetconfSession>;

/// Driver bound to one OpenROADM device.
///
/// The connection cache manager is shared between all drivers of a
/// controller; everything else is per device.
#[derive(Clone)]
pub struct OpenRoadmDriver {
    device_id: DeviceId,
    config: Arc<DriverConfig>,
    sessions: Arc<NetconfSessionProvider>,
    inventory: Arc<dyn DeviceInventory>,
    caches: Arc<ConnectionCacheManager>,
}

impl OpenRoadmDriver {
    pub fn new(
        device_id: DeviceId,
        config: Arc<DriverConfig>,
        sessions: Arc<NetconfSessionProvider>,
        inventory: Arc<dyn DeviceInventory>,
        caches: Arc<ConnectionCacheManager>,
    ) -> Self {
        Self {
            device_id,
            config,
            sessions,
            inventory,
            caches,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn caches(&self) -> &Arc<ConnectionCacheManager> {
        &self.caches
    }

    pub(crate) fn session(&self) -> DriverResult<Arc<dyn NetconfSession>> {
        self.sessions.acquire_session(&self.device_id).map_err(|e| {
            error!(device = %self.device_id, "NETCONF session not found");
            e
        })
    }

    pub(crate) fn ports(&self) -> Vec<Port> {
        self.inventory.ports(&self.device_id)
    }

    pub(crate) fn port(&self, number: PortNumber) -> DriverResult<Port> {
        self.inventory
            .port(&self.device_id, number)
            .ok_or_else(|| DriverError::PortNotFound {
                device: self.device_id.clone(),
                port: number,
            })
    }

    /// Recomputed on every call; port metadata may change.
    pub(crate) fn line_ports(&self) -> BTreeSet<PortNumber> {
        let lines = line_ports(&self.ports(), &self.config.line_port_marker);
        debug!(device = %self.device_id, ?lines, "detected degree ports");
        lines
    }

    /// Sends one edit-config; a negative reply is a transport failure.
    pub(crate) fn edit(
        &self,
        session: &dyn NetconfSession,
        step: &str,
        doc: &Document,
    ) -> DriverResult<()> {
        debug!(device = %self.device_id, step, document = %doc, "edit-config");
        match session.edit_config(self.config.datastore, DefaultOperation::Merge, doc) {
            Ok(true) => Ok(()),
            Ok(false) => {
                error!(device = %self.device_id, step, document = %doc, "edit-config rejected");
                Err(DriverError::transport(step, "device rejected edit-config"))
            }
            Err(e) => {
                error!(device = %self.device_id, step, error = %e, "edit-config failed");
                Err(e)
            }
        }
    }
}

impl fmt::Debug for OpenRoadmDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRoadmDriver")
            .field("device_id", &self.device_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
