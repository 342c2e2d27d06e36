//! YAML port inventory.
//!
//! ```yaml
//! device: netconf:10.0.0.1:830
//! ports:
//!   - port-name: ext-tx1
//!     logical-connection-point: DEG1-TTP-TX
//!     circuit-pack: 1/0
//!   - number: 101
//!     port-name: 1-1
//!     logical-connection-point: SRG1-PP1-TX
//!     circuit-pack: 4/0
//! ```
//!
//! A port without `number` gets the number discovery would synthesise
//! from its `port-name`.

use roadm_driver_common::behaviour::{C_BAND_START, C_BAND_STOP};
use roadm_driver_common::{DeviceInventory, DriverError, DriverResult};
use roadm_openroadm::port_number_from_name;
use roadm_types::{annotation_keys, ChannelSpacing, DeviceId, Port, PortKind, PortNumber};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One port entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortEntry {
    #[serde(default)]
    pub number: Option<u64>,
    pub port_name: String,
    pub logical_connection_point: String,
    pub circuit_pack: String,
}

impl PortEntry {
    fn to_port(&self) -> DriverResult<Port> {
        let number = match self.number {
            Some(n) => PortNumber::new(n),
            None => port_number_from_name(&self.port_name)?,
        };
        Ok(Port::new(
            number,
            PortKind::Oms {
                min_frequency: C_BAND_START,
                max_frequency: C_BAND_STOP,
                grid: ChannelSpacing::Chl50Ghz.frequency(),
            },
        )
        .with_annotation(annotation_keys::PORT_NAME, self.port_name.as_str())
        .with_annotation(
            annotation_keys::LOGICAL_CONNECTION_POINT,
            self.logical_connection_point.as_str(),
        )
        .with_annotation(annotation_keys::CIRCUIT_PACK, self.circuit_pack.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct InventoryFile {
    device: String,
    #[serde(default)]
    ports: Vec<PortEntry>,
}

/// Ports of a single device, loaded from YAML.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInventory {
    device: DeviceId,
    ports: Vec<Port>,
}

impl FileInventory {
    pub fn from_yaml_str(yaml: &str) -> DriverResult<Self> {
        let file: InventoryFile = serde_yaml::from_str(yaml)
            .map_err(|e| DriverError::invalid_config("inventory", e.to_string()))?;
        let ports = file
            .ports
            .iter()
            .map(PortEntry::to_port)
            .collect::<DriverResult<Vec<_>>>()?;
        Ok(Self {
            device: DeviceId::new(file.device),
            ports,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            DriverError::invalid_config("inventory", format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }
}

impl DeviceInventory for FileInventory {
    fn ports(&self, device: &DeviceId) -> Vec<Port> {
        if device == &self.device {
            self.ports.clone()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const YAML: &str = r#"
device: netconf:10.0.0.1:830
ports:
  - port-name: ext-rx1
    logical-connection-point: DEG1-TTP-RX
    circuit-pack: 1/0
  - number: 7
    port-name: custom
    logical-connection-point: SRG1-PP1-TX
    circuit-pack: 4/0
"#;

    #[test]
    fn test_from_yaml() {
        let inv = FileInventory::from_yaml_str(YAML).unwrap();
        let ports = inv.ports(&DeviceId::from("netconf:10.0.0.1:830"));
        let numbers: Vec<u64> = ports.iter().map(|p| p.number.as_u64()).collect();
        assert_eq!(numbers, vec![401, 7]);
        assert_eq!(ports[0].logical_connection_point(), Some("DEG1-TTP-RX"));
        assert_eq!(ports[1].circuit_pack(), Some("4/0"));
        assert!(inv.ports(&DeviceId::from("other")).is_empty());
    }

    #[test]
    fn test_unnumbered_bad_name() {
        let yaml = "device: d\nports:\n  - port-name: weird\n    logical-connection-point: X\n    circuit-pack: c\n";
        assert!(matches!(
            FileInventory::from_yaml_str(yaml).unwrap_err(),
            DriverError::InvalidPortName { .. }
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();
        let inv = FileInventory::load(file.path()).unwrap();
        assert_eq!(inv.device().as_str(), "netconf:10.0.0.1:830");

        assert!(matches!(
            FileInventory::load("/nonexistent/inventory.yaml").unwrap_err(),
            DriverError::InvalidConfig { .. }
        ));
    }
}
