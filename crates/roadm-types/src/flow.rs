//! Abstract cross-connect requests.

use crate::device::DeviceId;
use crate::och::{OchSignal, OchSignalType};
use crate::port::PortNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to connect `in_port` to `out_port`, optionally restricted to
/// one optical channel.
///
/// A rule whose `out_port` is absent cannot be programmed; drivers reject it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRule {
    pub device_id: DeviceId,
    pub in_port: PortNumber,
    #[serde(default)]
    pub out_port: Option<PortNumber>,
    #[serde(default)]
    pub och_signal: Option<OchSignal>,
    #[serde(default)]
    pub signal_type: Option<OchSignalType>,
    pub priority: u32,
    #[serde(default)]
    pub cookie: u64,
}

impl FlowRule {
    /// Creates a port-to-port rule with no channel constraint.
    pub fn new(device_id: DeviceId, in_port: PortNumber, out_port: PortNumber) -> Self {
        Self {
            device_id,
            in_port,
            out_port: Some(out_port),
            och_signal: None,
            signal_type: None,
            priority: 0,
            cookie: 0,
        }
    }

    /// Restricts the rule to a fixed-grid channel.
    pub fn with_och_signal(mut self, signal: OchSignal) -> Self {
        self.och_signal = Some(signal);
        self.signal_type = Some(OchSignalType::FixedGrid);
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cookie(mut self, cookie: u64) -> Self {
        self.cookie = cookie;
        self
    }

    /// Returns true when both rules describe the same cross-connect.
    ///
    /// Cookies and the device id are ignored.
    pub fn same_intent(&self, other: &FlowRule) -> bool {
        self.in_port == other.in_port
            && self.out_port == other.out_port
            && self.och_signal == other.och_signal
            && self.priority == other.priority
    }
}

impl fmt::Display for FlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}->", self.device_id, self.in_port)?;
        match self.out_port {
            Some(out) => write!(f, "{}", out)?,
            None => f.write_str("?")?,
        }
        if let Some(sig) = &self.och_signal {
            write!(f, " [{}]", sig)?;
        }
        Ok(())
    }
}

/// Lifecycle state of a flow entry reported by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEntryState {
    PendingAdd,
    Added,
    PendingRemove,
}

/// A flow rule as observed on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEntry {
    pub rule: FlowRule,
    pub state: FlowEntryState,
}

impl FlowEntry {
    /// Wraps a rule read back from the device.
    pub fn added(rule: FlowRule) -> Self {
        Self {
            rule,
            state: FlowEntryState::Added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::och::ChannelSpacing;
    use pretty_assertions::assert_eq;

    fn rule() -> FlowRule {
        FlowRule::new(DeviceId::from("rdm-a"), PortNumber::new(301), PortNumber::new(402))
    }

    #[test]
    fn test_same_intent_ignores_cookie() {
        let a = rule().with_priority(88).with_cookie(1);
        let b = rule().with_priority(88).with_cookie(2);
        assert!(a.same_intent(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_intent_channel_differs() {
        let sig = OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, 0);
        let a = rule().with_och_signal(sig);
        let b = rule();
        assert!(!a.same_intent(&b));
        assert_eq!(a.signal_type, Some(OchSignalType::FixedGrid));
    }

    #[test]
    fn test_display() {
        let mut r = rule();
        assert_eq!(r.to_string(), "rdm-a:301->402");
        r.out_port = None;
        assert_eq!(r.to_string(), "rdm-a:301->?");
    }
}
