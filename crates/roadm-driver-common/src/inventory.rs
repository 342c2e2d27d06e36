//! Controller-side collaborators: port inventory and flow-rule intent.

use roadm_types::{DeviceId, FlowRule, Port, PortNumber};

/// Read-only view of the ports the controller knows for each device.
pub trait DeviceInventory: Send + Sync {
    /// Returns every port of `device`.
    fn ports(&self, device: &DeviceId) -> Vec<Port>;

    /// Returns one port of `device`.
    fn port(&self, device: &DeviceId, number: PortNumber) -> Option<Port> {
        self.ports(device).into_iter().find(|p| p.number == number)
    }
}

/// The flow rules the controller intends to be installed on each device.
pub trait FlowRuleStore: Send + Sync {
    fn flow_rules(&self, device: &DeviceId) -> Vec<FlowRule>;
}
