//! Device-model registry.
//!
//! A device is bound to one model when its session comes up; every later
//! call dispatches on the bound [`DeviceDriver`] variant.

use dashmap::DashMap;
use roadm_driver_common::{
    DeviceDescription, DeviceDiscovery, DeviceInventory, DriverConfig, DriverError, DriverResult,
    FlowRuleProgrammable, FlowRuleStore, LambdaQuery, PowerConfig,
};
use roadm_openroadm::{ConnectionCacheManager, NetconfSessionProvider, OpenRoadmDriver};
use roadm_polatis::{PolatisDriver, RestSessionProvider};
use roadm_types::{DeviceId, FlowEntry, FlowRule, OchSignal, Port, PortNumber};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Supported device models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceModel {
    OpenRoadm,
    Polatis,
}

impl DeviceModel {
    pub const fn tag(&self) -> &'static str {
        match self {
            DeviceModel::OpenRoadm => "openroadm",
            DeviceModel::Polatis => "polatis",
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DeviceModel {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openroadm" => Ok(DeviceModel::OpenRoadm),
            "polatis" => Ok(DeviceModel::Polatis),
            other => Err(DriverError::unsupported(format!(
                "unknown device model '{}'",
                other
            ))),
        }
    }
}

/// A driver bound to one device.
#[derive(Debug, Clone)]
pub enum DeviceDriver {
    OpenRoadm(OpenRoadmDriver),
    Polatis(PolatisDriver),
}

impl DeviceDriver {
    pub fn model(&self) -> DeviceModel {
        match self {
            DeviceDriver::OpenRoadm(_) => DeviceModel::OpenRoadm,
            DeviceDriver::Polatis(_) => DeviceModel::Polatis,
        }
    }

    pub fn device_id(&self) -> &DeviceId {
        match self {
            DeviceDriver::OpenRoadm(d) => d.device_id(),
            DeviceDriver::Polatis(d) => d.device_id(),
        }
    }

    /// Power configuration, when the model supports it.
    pub fn power(&self) -> Option<&dyn PowerConfig> {
        match self {
            DeviceDriver::OpenRoadm(d) => Some(d as &dyn PowerConfig),
            DeviceDriver::Polatis(_) => None,
        }
    }

    pub fn as_openroadm(&self) -> Option<&OpenRoadmDriver> {
        match self {
            DeviceDriver::OpenRoadm(d) => Some(d),
            DeviceDriver::Polatis(_) => None,
        }
    }

    pub fn as_polatis(&self) -> Option<&PolatisDriver> {
        match self {
            DeviceDriver::Polatis(d) => Some(d),
            DeviceDriver::OpenRoadm(_) => None,
        }
    }
}

impl FlowRuleProgrammable for DeviceDriver {
    fn get_flow_entries(&self) -> Vec<FlowEntry> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.get_flow_entries(),
            DeviceDriver::Polatis(d) => d.get_flow_entries(),
        }
    }

    fn apply_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.apply_flow_rules(rules),
            DeviceDriver::Polatis(d) => d.apply_flow_rules(rules),
        }
    }

    fn remove_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.remove_flow_rules(rules),
            DeviceDriver::Polatis(d) => d.remove_flow_rules(rules),
        }
    }
}

impl DeviceDiscovery for DeviceDriver {
    fn discover_device_details(&self) -> DriverResult<DeviceDescription> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.discover_device_details(),
            DeviceDriver::Polatis(d) => d.discover_device_details(),
        }
    }

    fn discover_port_details(&self) -> Vec<Port> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.discover_port_details(),
            DeviceDriver::Polatis(d) => d.discover_port_details(),
        }
    }
}

impl LambdaQuery for DeviceDriver {
    fn query_lambdas(&self, port: PortNumber) -> Vec<OchSignal> {
        match self {
            DeviceDriver::OpenRoadm(d) => d.query_lambdas(port),
            DeviceDriver::Polatis(d) => d.query_lambdas(port),
        }
    }
}

/// Collaborators shared by every driver the registry creates.
#[derive(Clone)]
pub struct DriverContext {
    pub config: Arc<DriverConfig>,
    pub netconf: Arc<NetconfSessionProvider>,
    pub rest: Arc<RestSessionProvider>,
    pub inventory: Arc<dyn DeviceInventory>,
    pub flow_store: Arc<dyn FlowRuleStore>,
}

/// Binds devices to device models.
pub struct DriverRegistry {
    context: DriverContext,
    caches: Arc<ConnectionCacheManager>,
    bound: DashMap<DeviceId, DeviceDriver>,
}

impl DriverRegistry {
    pub fn new(context: DriverContext) -> Self {
        Self {
            context,
            caches: Arc::new(ConnectionCacheManager::new()),
            bound: DashMap::new(),
        }
    }

    /// Binds `device_id` to the model named by `tag`.
    ///
    /// Binding is resolved once: a device already bound keeps its driver
    /// whatever `tag` says.
    pub fn bind(&self, device_id: DeviceId, tag: &str) -> DriverResult<DeviceDriver> {
        if let Some(existing) = self.bound.get(&device_id) {
            debug!(device = %device_id, model = %existing.model(), "already bound");
            return Ok(existing.clone());
        }

        let model: DeviceModel = tag.parse()?;
        let ctx = &self.context;
        let driver = match model {
            DeviceModel::OpenRoadm => DeviceDriver::OpenRoadm(OpenRoadmDriver::new(
                device_id.clone(),
                Arc::clone(&ctx.config),
                Arc::clone(&ctx.netconf),
                Arc::clone(&ctx.inventory),
                Arc::clone(&self.caches),
            )),
            DeviceModel::Polatis => DeviceDriver::Polatis(PolatisDriver::new(
                device_id.clone(),
                Arc::clone(&ctx.config),
                Arc::clone(&ctx.rest),
                Arc::clone(&ctx.flow_store),
            )),
        };

        let driver = self
            .bound
            .entry(device_id.clone())
            .or_insert(driver)
            .clone();
        info!(device = %device_id, model = %driver.model(), "device bound");
        Ok(driver)
    }

    pub fn driver(&self, device_id: &DeviceId) -> Option<DeviceDriver> {
        self.bound.get(device_id).map(|d| d.clone())
    }

    /// Drops the binding; cached connections of the device are kept.
    pub fn unbind(&self, device_id: &DeviceId) -> Option<DeviceDriver> {
        let removed = self.bound.remove(device_id).map(|(_, d)| d);
        if removed.is_some() {
            info!(device = %device_id, "device unbound");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    pub fn caches(&self) -> &Arc<ConnectionCacheManager> {
        &self.caches
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("bound", &self.bound.len())
            .field("caches", &self.caches)
            .finish()
    }
}
