//! Device and port discovery.

use crate::driver::PolatisDriver;
use roadm_driver_common::behaviour::{C_BAND_START, C_BAND_STOP};
use roadm_driver_common::document::list_in;
use roadm_driver_common::{
    DeviceDescription, DeviceDiscovery, DeviceType, Document, DriverResult,
};
use roadm_types::{annotation_keys, ChannelSpacing, Port, PortKind, PortNumber};
use tracing::{error, info, instrument, warn};

const VENDOR: &str = "HPN";
const HW_VERSION: &str = "0.1";
const SW_VERSION: &str = "0.1";
const SERIAL_NUMBER: &str = "1111";
const CHASSIS_ID: &str = "1111";

/// Switch port `n`: a full C-band OMS port named `port-<n>`.
fn switch_port(number: PortNumber) -> Port {
    Port::new(
        number,
        PortKind::Oms {
            min_frequency: C_BAND_START,
            max_frequency: C_BAND_STOP,
            grid: ChannelSpacing::Chl50Ghz.frequency(),
        },
    )
    .with_annotation(annotation_keys::PORT_NAME, format!("port-{}", number))
}

/// Decodes `{"input_ports": [..], "output_ports": [..]}`, inputs first.
pub fn parse_ports(reply: &Document) -> Vec<Port> {
    ["input_ports", "output_ports"]
        .iter()
        .flat_map(|key| list_in(reply.as_value(), key))
        .filter_map(|value| match value.as_u64() {
            Some(n) => Some(switch_port(PortNumber::new(n))),
            None => {
                warn!(value = %value, "skipping port");
                None
            }
        })
        .collect()
}

impl DeviceDiscovery for PolatisDriver {
    /// The switch has no inventory resource; its identity is fixed.
    fn discover_device_details(&self) -> DriverResult<DeviceDescription> {
        Ok(DeviceDescription {
            device_type: DeviceType::FiberSwitch,
            vendor: VENDOR.to_string(),
            hw_version: HW_VERSION.to_string(),
            sw_version: SW_VERSION.to_string(),
            serial_number: SERIAL_NUMBER.to_string(),
            chassis_id: CHASSIS_ID.to_string(),
            latitude: None,
            longitude: None,
        })
    }

    #[instrument(skip(self), fields(device = %self.device_id()))]
    fn discover_port_details(&self) -> Vec<Port> {
        let reply = self
            .session()
            .and_then(|session| session.get(&self.settings().ports_path));
        match reply {
            Ok(reply) => {
                let ports = parse_ports(&reply);
                info!(device = %self.device_id(), count = ports.len(), "ports discovered");
                ports
            }
            Err(e) => {
                error!(device = %self.device_id(), error = %e, "port discovery failed");
                Vec::new()
            }
        }
    }
}
