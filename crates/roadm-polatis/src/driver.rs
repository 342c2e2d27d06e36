//! Fiber-switch driver handle.

use roadm_driver_common::transport::is_success_status;
use roadm_driver_common::{
    DriverConfig, DriverError, DriverResult, FlowRuleStore, PolatisConfig, RestSession,
    SessionProvider,
};
use roadm_types::DeviceId;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Provider of REST sessions.
pub type RestSessionProvider = dyn SessionProvider<dyn RestSession>;

/// Driver bound to one fiber switch.
#[derive(Clone)]
pub struct PolatisDriver {
    device_id: DeviceId,
    config: Arc<DriverConfig>,
    sessions: Arc<RestSessionProvider>,
    flow_store: Arc<dyn FlowRuleStore>,
}

impl PolatisDriver {
    pub fn new(
        device_id: DeviceId,
        config: Arc<DriverConfig>,
        sessions: Arc<RestSessionProvider>,
        flow_store: Arc<dyn FlowRuleStore>,
    ) -> Self {
        Self {
            device_id,
            config,
            sessions,
            flow_store,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub(crate) fn settings(&self) -> &PolatisConfig {
        &self.config.polatis
    }

    pub(crate) fn flow_store(&self) -> &dyn FlowRuleStore {
        self.flow_store.as_ref()
    }

    pub(crate) fn session(&self) -> DriverResult<Arc<dyn RestSession>> {
        self.sessions.acquire_session(&self.device_id).map_err(|e| {
            error!(device = %self.device_id, "REST session not found");
            e
        })
    }

    /// PATCHes `body` to the connections resource; non-2xx is a transport failure.
    pub(crate) fn patch_connections(
        &self,
        session: &dyn RestSession,
        step: &str,
        body: &serde_json::Value,
    ) -> DriverResult<()> {
        let path = &self.settings().connections_path;
        let body = body.clone().into();
        let status = session.patch(path, &body)?;
        debug!(device = %self.device_id, step, path = %path, body = %body, status, "PATCH");
        if is_success_status(status) {
            Ok(())
        } else {
            error!(device = %self.device_id, step, status, "PATCH rejected");
            Err(DriverError::transport(step, format!("HTTP {}", status)))
        }
    }
}

impl fmt::Debug for PolatisDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolatisDriver")
            .field("device_id", &self.device_id)
            .field("polatis", &self.config.polatis)
            .finish_non_exhaustive()
    }
}
