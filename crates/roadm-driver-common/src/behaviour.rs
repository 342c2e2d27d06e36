//! Driver capabilities.
//!
//! Each device model implements the capabilities it supports; the registry
//! in `roadm-drivers` binds a model to a device once per session.

use crate::error::DriverResult;
use roadm_types::{ChannelSpacing, Frequency, FlowEntry, FlowRule, OchSignal, Port, PortNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First center frequency of the C-band lambda profile (channel C1).
pub const C_BAND_START: Frequency = Frequency::from_ghz(191_350);

/// Last center frequency of the C-band lambda profile (channel C96).
pub const C_BAND_STOP: Frequency = Frequency::from_ghz(196_100);

/// Number of channels in the C-band lambda profile.
pub const C_BAND_LAMBDA_COUNT: i32 = 96;

/// Slot granularity of the C-band lambda profile.
pub const C_BAND_SLOT_GRANULARITY: u32 = 4;

/// Device type reported by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Roadm,
    FiberSwitch,
}

/// Identity of a discovered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceDescription {
    pub device_type: DeviceType,
    pub vendor: String,
    pub hw_version: String,
    pub sw_version: String,
    pub serial_number: String,
    pub chassis_id: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// A closed range of optical power in dBm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerRange {
    pub min_dbm: f64,
    pub max_dbm: f64,
}

impl PowerRange {
    pub const fn new(min_dbm: f64, max_dbm: f64) -> Self {
        Self { min_dbm, max_dbm }
    }

    pub fn contains(&self, dbm: f64) -> bool {
        self.min_dbm <= dbm && dbm <= self.max_dbm
    }
}

impl fmt::Display for PowerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] dBm", self.min_dbm, self.max_dbm)
    }
}

/// Programs optical cross-connects from flow rules.
///
/// `apply_flow_rules` and `remove_flow_rules` return only the rules that
/// succeeded; a failed rule never aborts the batch.
pub trait FlowRuleProgrammable {
    /// Reads the cross-connects currently installed on the device.
    fn get_flow_entries(&self) -> Vec<FlowEntry>;

    fn apply_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule>;

    fn remove_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule>;
}

/// Device and port discovery.
pub trait DeviceDiscovery {
    fn discover_device_details(&self) -> DriverResult<DeviceDescription>;

    /// Returns the device ports, or an empty list when discovery fails.
    fn discover_port_details(&self) -> Vec<Port>;
}

/// Optical power configuration.
pub trait PowerConfig {
    /// Target output power of a port or of one channel on it.
    fn target_power(&self, port: PortNumber, channel: Option<&OchSignal>) -> Option<f64>;

    fn set_target_power(
        &self,
        port: PortNumber,
        channel: Option<&OchSignal>,
        dbm: f64,
    ) -> DriverResult<()>;

    /// Settable range of the target power; `None` when the port is not an output.
    fn target_power_range(&self, port: PortNumber, channel: Option<&OchSignal>)
        -> Option<PowerRange>;

    /// Acceptable input power; `None` when the port is not an input.
    fn input_power_range(&self, port: PortNumber, channel: Option<&OchSignal>)
        -> Option<PowerRange>;
}

/// Lambdas a port can carry.
pub trait LambdaQuery {
    fn query_lambdas(&self, port: PortNumber) -> Vec<OchSignal>;
}

/// The fixed C-band profile: 96 channels on the 50 GHz DWDM grid,
/// 191.35 THz to 196.10 THz.
pub fn c_band_lambdas() -> Vec<OchSignal> {
    let spacing = ChannelSpacing::Chl50Ghz;
    let reference = roadm_types::CENTER_FREQUENCY.as_hz();
    let steps = (reference - C_BAND_START.as_hz()) / spacing.frequency().as_hz();
    let start = -(steps as i32);
    (start..start + C_BAND_LAMBDA_COUNT)
        .map(|m| OchSignal::new(roadm_types::GridType::Dwdm, spacing, m, C_BAND_SLOT_GRANULARITY))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_c_band_profile() {
        let lambdas = c_band_lambdas();
        assert_eq!(lambdas.len(), 96);
        assert_eq!(lambdas[0].spacing_multiplier, -35);
        assert_eq!(lambdas[0].center_frequency(), C_BAND_START);
        assert_eq!(lambdas[95].spacing_multiplier, 60);
        assert_eq!(lambdas[95].center_frequency(), C_BAND_STOP);
        assert!(lambdas.iter().all(|l| l.slot_granularity == 4));
    }

    #[test]
    fn test_power_range() {
        let range = PowerRange::new(-60.0, 60.0);
        assert!(range.contains(0.0));
        assert!(range.contains(-60.0));
        assert!(!range.contains(60.5));
        assert_eq!(range.to_string(), "[-60, 60] dBm");
    }
}
