//! Port type definitions for optical devices.

use crate::frequency::Frequency;
use crate::och::OchSignal;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known port annotation keys.
pub mod annotation_keys {
    /// Device-native port name (e.g. `ext-tx3`, `1-2`).
    pub const PORT_NAME: &str = "port-name";
    /// OpenROADM logical connection point (e.g. `DEG1-TTP-TX`, `SRG1-PP1-RX`).
    pub const LOGICAL_CONNECTION_POINT: &str = "logical-connection-point";
    /// Circuit pack hosting the port.
    pub const CIRCUIT_PACK: &str = "circuit-pack";
}

/// Controller-side numeric port identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNumber(u64);

impl PortNumber {
    /// Creates a port number.
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    /// Returns the raw number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PortNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl fmt::Display for PortNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PortNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(PortNumber)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

/// Optical port flavour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum PortKind {
    /// Optical multiplex section port carrying a band of channels.
    Oms {
        min_frequency: Frequency,
        max_frequency: Frequency,
        grid: Frequency,
    },
    /// Optical channel port carrying a single (possibly tunable) channel.
    Och { signal: OchSignal, tunable: bool },
}

/// A device port as reported by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub number: PortNumber,
    pub kind: PortKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

impl Port {
    /// Creates an enabled port without annotations.
    pub fn new(number: PortNumber, kind: PortKind) -> Self {
        Self {
            number,
            kind,
            enabled: true,
            annotations: BTreeMap::new(),
        }
    }

    /// Adds an annotation.
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Returns an annotation value, if present.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    /// Returns the logical connection point label.
    pub fn logical_connection_point(&self) -> Option<&str> {
        self.annotation(annotation_keys::LOGICAL_CONNECTION_POINT)
    }

    /// Returns the hosting circuit pack.
    pub fn circuit_pack(&self) -> Option<&str> {
        self.annotation(annotation_keys::CIRCUIT_PACK)
    }

    /// Returns the device-native port name.
    pub fn port_name(&self) -> Option<&str> {
        self.annotation(annotation_keys::PORT_NAME)
    }
}
