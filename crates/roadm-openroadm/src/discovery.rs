//! Device and port discovery.

use crate::driver::OpenRoadmDriver;
use crate::templates::{self, CIRCUIT_PACKS_PATH, INFO_PATH};
use once_cell::sync::Lazy;
use regex::Regex;
use roadm_driver_common::behaviour::{C_BAND_START, C_BAND_STOP};
use roadm_driver_common::document::{list_in, str_at};
use roadm_driver_common::{
    Datastore, DeviceDescription, DeviceDiscovery, DeviceType, Document, DriverError,
    DriverResult,
};
use roadm_types::{
    annotation_keys, ChannelSpacing, OchSignal, Port, PortKind, PortNumber,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

const NOT_LOADED: &str = "not loaded";
const ROADM_NODE_TYPE: &str = "rdm";
const EXTERNAL_PORT_QUAL: &str = "roadm-external";
const WAVELENGTH_PORT_TYPE: &str = "wavelength";

/// `ext-txN`, `ext-rxN`, `int-txN`, `int-rxN` or `N-M`.
static PORT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(ext|int)-(tx|rx)(\d+)|(\d+)-(\d+))$").expect("Invalid regex pattern")
});

/// Derives a numeric port from a device port name.
///
/// | name | number |
/// |------|--------|
/// | `ext-txN` | 300+N |
/// | `ext-rxN` | 400+N |
/// | `int-txN` | 500+N |
/// | `int-rxN` | 600+N |
/// | `N-M` | N*100+M |
pub fn port_number_from_name(name: &str) -> DriverResult<PortNumber> {
    let invalid = || DriverError::InvalidPortName {
        name: name.to_string(),
    };
    let caps = PORT_NAME_RE.captures(name).ok_or_else(invalid)?;
    let num = |i: usize| -> DriverResult<u64> {
        caps.get(i)
            .ok_or_else(invalid)?
            .as_str()
            .parse::<u64>()
            .map_err(|_| invalid())
    };

    let number = match (caps.get(1).map(|m| m.as_str()), caps.get(2).map(|m| m.as_str())) {
        (Some(place), Some(dir)) => {
            let base = match (place, dir) {
                ("ext", "tx") => 300,
                ("ext", "rx") => 400,
                ("int", "tx") => 500,
                _ => 600,
            };
            num(3)?.checked_add(base)
        }
        _ => num(4)?
            .checked_mul(100)
            .and_then(|n| n.checked_add(num(5).ok()?)),
    };
    number.map(PortNumber::new).ok_or_else(invalid)
}

impl OpenRoadmDriver {
    fn read_ports(&self) -> DriverResult<Vec<Port>> {
        let session = self.session()?;
        let reply = session.get(&templates::circuit_packs_filter())?;
        Ok(parse_circuit_packs(&reply))
    }
}

/// Extracts external ports from a `circuit-packs` reply.
pub fn parse_circuit_packs(reply: &Document) -> Vec<Port> {
    reply
        .list_at(CIRCUIT_PACKS_PATH)
        .into_iter()
        .flat_map(|cp| {
            let cp_name = str_at(cp, "circuit-pack-name").unwrap_or_default();
            list_in(cp, "ports")
                .into_iter()
                .filter_map(move |p| parse_port(p, &cp_name))
        })
        .collect()
}

fn parse_port(node: &Value, cp_name: &str) -> Option<Port> {
    if str_at(node, "port-qual").as_deref() != Some(EXTERNAL_PORT_QUAL) {
        return None;
    }
    let name = str_at(node, "port-name").unwrap_or_else(|| "unnamed".to_string());
    let number = match port_number_from_name(&name) {
        Ok(n) => n,
        Err(e) => {
            warn!(circuit_pack = cp_name, port = %name, error = %e, "skipping port");
            return None;
        }
    };
    let lcp = str_at(node, "logical-connection-point").unwrap_or_default();
    let wavelength_type =
        str_at(node, "port-wavelength-type").unwrap_or_else(|| WAVELENGTH_PORT_TYPE.to_string());

    let kind = if wavelength_type == WAVELENGTH_PORT_TYPE {
        // Tunable; the signal is a placeholder
        PortKind::Och {
            signal: OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, 1),
            tunable: true,
        }
    } else {
        PortKind::Oms {
            min_frequency: C_BAND_START,
            max_frequency: C_BAND_STOP,
            grid: ChannelSpacing::Chl50Ghz.frequency(),
        }
    };

    debug!(circuit_pack = cp_name, port = %name, number = %number, lcp = %lcp, "discovered port");
    Some(
        Port::new(number, kind)
            .with_annotation(annotation_keys::CIRCUIT_PACK, cp_name)
            .with_annotation(annotation_keys::PORT_NAME, name)
            .with_annotation(annotation_keys::LOGICAL_CONNECTION_POINT, lcp),
    )
}

impl DeviceDiscovery for OpenRoadmDriver {
    #[instrument(skip(self), fields(device = %self.device_id()))]
    fn discover_device_details(&self) -> DriverResult<DeviceDescription> {
        let session = self.session()?;

        if self.config().reset_running_on_discovery {
            info!(device = %self.device_id(), "resetting running from startup");
            match session.copy_config(Datastore::Running, Datastore::Startup) {
                Ok(true) => info!(device = %self.device_id(), "copy-config ok"),
                Ok(false) => warn!(device = %self.device_id(), "copy-config rejected"),
                Err(e) => warn!(device = %self.device_id(), error = %e, "copy-config failed"),
            }
        }

        let reply = session.get(&templates::info_filter())?;
        let leaf = |name: &str| reply.get_str(&format!("{}.{}", INFO_PATH, name));
        let or_default = |v: Option<String>| v.unwrap_or_else(|| NOT_LOADED.to_string());

        let node_type = leaf("node-type").unwrap_or_default();
        if node_type != ROADM_NODE_TYPE {
            error!(device = %self.device_id(), node_type = %node_type, "wrong node-type");
        }

        let (latitude, longitude) = match (leaf("geoLocation.latitude"), leaf("geoLocation.longitude")) {
            (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
            _ => (None, None),
        };

        let description = DeviceDescription {
            device_type: DeviceType::Roadm,
            vendor: or_default(leaf("vendor")),
            hw_version: or_default(leaf("model")),
            sw_version: or_default(leaf("softwareVersion")),
            serial_number: or_default(leaf("serial-id")),
            chassis_id: or_default(leaf("node-number")),
            latitude,
            longitude,
        };
        info!(
            device = %self.device_id(),
            vendor = %description.vendor,
            hw = %description.hw_version,
            sw = %description.sw_version,
            serial = %description.serial_number,
            chassis = %description.chassis_id,
            "device discovered"
        );
        Ok(description)
    }

    #[instrument(skip(self), fields(device = %self.device_id()))]
    fn discover_port_details(&self) -> Vec<Port> {
        match self.read_ports() {
            Ok(ports) => {
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
