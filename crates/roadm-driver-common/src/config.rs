//! Driver configuration.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration.

use crate::error::{DriverError, DriverResult};
use crate::transport::Datastore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Upper bound on live connections per device.
pub const DEFAULT_MAX_CONNECTIONS: usize = 100;

/// Configuration shared by the drivers of one controller instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DriverConfig {
    /// Admission limit for the per-device connection cache.
    pub max_connections: usize,
    /// Substring of a logical connection point marking a line (degree) port.
    pub line_port_marker: String,
    /// Substring of a logical connection point marking a client (SRG) port.
    pub client_port_marker: String,
    /// `opticalControlMode` written on new connections.
    pub optical_control_mode: String,
    /// `target-output-power` written on new connections (dBm).
    pub target_output_power: f64,
    /// Datastore targeted by edit-config and get-config.
    pub datastore: Datastore,
    /// Copy startup over running before device discovery.
    pub reset_running_on_discovery: bool,
    /// Reported power range (dBm) for TX and RX ports.
    pub power_range_dbm: [f64; 2],
    /// Fiber-switch settings.
    pub polatis: PolatisConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            line_port_marker: "DEG".to_string(),
            client_port_marker: "SRG".to_string(),
            optical_control_mode: "off".to_string(),
            target_output_power: 0.0,
            datastore: Datastore::Running,
            reset_running_on_discovery: false,
            power_range_dbm: [-60.0, 60.0],
            polatis: PolatisConfig::default(),
        }
    }
}

/// Settings for the REST fiber-switch model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PolatisConfig {
    /// Priority assigned to flow entries read back from the switch.
    pub default_priority: u32,
    /// Resource holding the in-to-out port mapping.
    pub connections_path: String,
    /// Resource listing input and output ports.
    pub ports_path: String,
}

impl Default for PolatisConfig {
    fn default() -> Self {
        Self {
            default_priority: 88,
            connections_path: "/connections/".to_string(),
            ports_path: "/ports/".to_string(),
        }
    }
}

impl DriverConfig {
    /// Parses and validates a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> DriverResult<Self> {
        let config: DriverConfig = serde_yaml::from_str(yaml)
            .map_err(|e| DriverError::invalid_config("yaml", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DriverResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| DriverError::invalid_config(path.display().to_string(), e.to_string()))?;
        let config = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            max_connections = config.max_connections,
            datastore = %config.datastore,
            "driver configuration loaded"
        );
        Ok(config)
    }

    /// Checks field constraints.
    pub fn validate(&self) -> DriverResult<()> {
        if self.max_connections == 0 {
            return Err(DriverError::invalid_config(
                "max-connections",
                "must be greater than zero",
            ));
        }
        if self.line_port_marker.is_empty() {
            return Err(DriverError::invalid_config("line-port-marker", "must not be empty"));
        }
        if self.client_port_marker.is_empty() {
            return Err(DriverError::invalid_config(
                "client-port-marker",
                "must not be empty",
            ));
        }
        let [low, high] = self.power_range_dbm;
        if low.is_nan() || high.is_nan() || low > high {
            return Err(DriverError::invalid_config(
                "power-range-dbm",
                format!("lower bound {} exceeds upper bound {}", low, high),
            ));
        }
        if !self.polatis.connections_path.starts_with('/') {
            return Err(DriverError::invalid_config(
                "polatis.connections-path",
                "must be an absolute resource path",
            ));
        }
        if !self.polatis.ports_path.starts_with('/') {
            return Err(DriverError::invalid_config(
                "polatis.ports-path",
                "must be an absolute resource path",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.max_connections, 100);
        assert_eq!(config.line_port_marker, "DEG");
        assert_eq!(config.optical_control_mode, "off");
        assert_eq!(config.datastore, Datastore::Running);
        assert_eq!(config.polatis.default_priority, 88);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = DriverConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DriverConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "max-connections: 8\npolatis:\n  default-priority: 10\n";
        let config = DriverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.polatis.default_priority, 10);
        assert_eq!(config.polatis.connections_path, "/connections/");
    }

    #[test]
    fn test_validate_rejects() {
        assert!(DriverConfig::from_yaml_str("max-connections: 0").is_err());
        assert!(DriverConfig::from_yaml_str("line-port-marker: ''").is_err());
        assert!(DriverConfig::from_yaml_str("power-range-dbm: [10.0, -10.0]").is_err());
        assert!(DriverConfig::from_yaml_str("polatis:\n  ports-path: ports").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "datastore: candidate").unwrap();
        writeln!(file, "reset-running-on-discovery: true").unwrap();

        let config = DriverConfig::load(file.path()).unwrap();
        assert_eq!(config.datastore, Datastore::Candidate);
        assert!(config.reset_running_on_discovery);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DriverConfig::load("/nonexistent/roadm.yaml").unwrap_err();
        assert!(matches!(err, DriverError::InvalidConfig { .. }));
    }
}
