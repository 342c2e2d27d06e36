//! Error types for ROADM driver operations.
//!
//! All errors implement `std::error::Error` via `thiserror`.

use roadm_types::{DeviceId, Frequency, ParseError, PortNumber};
use thiserror::Error;

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur while programming or querying a device.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Neither port of the rule is a line port.
    #[error("Invalid topology: in-port {in_port} / out-port {out_port} match no link type")]
    InvalidTopology {
        /// Rule in-port.
        in_port: PortNumber,
        /// Rule out-port.
        out_port: PortNumber,
    },

    /// The channel window does not map to a supported grid.
    #[error("Unsupported channel width {width_ghz} GHz (only 50 and 100 GHz are supported)")]
    UnsupportedChannelWidth {
        /// Window width rendered in GHz.
        width_ghz: String,
    },

    /// The per-device connection cache is full.
    #[error("Connection capacity exceeded on {device}: {limit} live connections")]
    CapacityExceeded {
        /// Device the request targeted.
        device: DeviceId,
        /// Configured maximum.
        limit: usize,
    },

    /// A remote operation failed or was rejected by the device.
    #[error("Transport operation failed: {operation}: {message}")]
    Transport {
        /// The operation that failed (e.g. "edit-config", "get").
        operation: String,
        /// Error message.
        message: String,
    },

    /// Controller cache and device state disagree.
    #[error("Cache inconsistency on {device}: {message}")]
    CacheInconsistency {
        /// Device whose cache was consulted.
        device: DeviceId,
        /// Error message.
        message: String,
    },

    /// No transport session is available for the device.
    #[error("No session available for device {device}")]
    NoSession {
        /// The device.
        device: DeviceId,
    },

    /// The flow rule lacks a criterion needed to program it.
    #[error("Invalid flow rule: {message}")]
    InvalidFlowRule {
        /// Error message.
        message: String,
    },

    /// The inventory has no such port.
    #[error("Port {port} not found on {device}")]
    PortNotFound {
        /// The device.
        device: DeviceId,
        /// The port.
        port: PortNumber,
    },

    /// A port lacks an annotation needed to build device names.
    #[error("Port {port} is missing annotation '{key}'")]
    PortMetadata {
        /// The port.
        port: PortNumber,
        /// The missing annotation key.
        key: String,
    },

    /// A device port name does not match any numbering rule.
    #[error("Unsupported port name '{name}'")]
    InvalidPortName {
        /// The textual port name.
        name: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// The operation is not supported by this device model.
    #[error("Unsupported operation: {message}")]
    Unsupported {
        /// Error message.
        message: String,
    },

    /// A value could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A device document was malformed.
    #[error("Malformed document: {message}")]
    Document {
        /// Error message.
        message: String,
    },
}

impl DriverError {
    /// Creates a transport error.
    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported channel width error.
    pub fn unsupported_width(width: Frequency) -> Self {
        Self::UnsupportedChannelWidth {
            width_ghz: width.as_ghz_string(),
        }
    }

    /// Creates a cache inconsistency error.
    pub fn cache_inconsistency(device: &DeviceId, message: impl Into<String>) -> Self {
        Self::CacheInconsistency {
            device: device.clone(),
            message: message.into(),
        }
    }

    /// Creates an invalid flow rule error.
    pub fn invalid_flow_rule(message: impl Into<String>) -> Self {
        Self::InvalidFlowRule {
            message: message.into(),
        }
    }

    /// Creates a missing port annotation error.
    pub fn port_metadata(port: PortNumber, key: impl Into<String>) -> Self {
        Self::PortMetadata {
            port,
            key: key.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a malformed document error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    ///
    /// Retrying is left to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::Transport { .. } | DriverError::NoSession { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = DriverError::transport("edit-config", "rpc-error: data-exists");
        assert_eq!(
            err.to_string(),
            "Transport operation failed: edit-config: rpc-error: data-exists"
        );
    }

    #[test]
    fn test_unsupported_width() {
        let err = DriverError::unsupported_width(Frequency::from_mhz(37_500));
        assert_eq!(
            err.to_string(),
            "Unsupported channel width 37.5 GHz (only 50 and 100 GHz are supported)"
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = DriverError::CapacityExceeded {
            device: DeviceId::from("rdm-a"),
            limit: 100,
        };
        assert!(err.to_string().contains("rdm-a"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: DriverError = ParseError::InvalidFrequency("x".to_string()).into();
        assert_eq!(err.to_string(), "invalid frequency: x");
    }

    #[test]
    fn test_is_retryable() {
        assert!(DriverError::transport("get", "timeout").is_retryable());
        assert!(DriverError::NoSession {
            device: DeviceId::from("rdm-a")
        }
        .is_retryable());
        assert!(!DriverError::invalid_flow_rule("no out-port").is_retryable());
        assert!(!DriverError::CapacityExceeded {
            device: DeviceId::from("rdm-a"),
            limit: 1
        }
        .is_retryable());
    }
}
