//! Link-type resolution for OpenROADM cross-connects.

use roadm_driver_common::{DriverError, DriverResult};
use roadm_types::{FlowRule, OchSignal, PortNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Topology of a cross-connect through the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkType {
    /// Line port to line port.
    Express,
    /// Client port to line port.
    Add,
    /// Line port to client port.
    Drop,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkType::Express => "EXPRESS",
            LinkType::Add => "ADD",
            LinkType::Drop => "DROP",
        };
        f.write_str(s)
    }
}

/// Classifies a cross-connect from the roles of its ports.
pub fn resolve(
    in_port: PortNumber,
    out_port: PortNumber,
    line_ports: &BTreeSet<PortNumber>,
) -> DriverResult<LinkType> {
    match (line_ports.contains(&in_port), line_ports.contains(&out_port)) {
        (true, true) => Ok(LinkType::Express),
        (false, true) => Ok(LinkType::Add),
        (true, false) => Ok(LinkType::Drop),
        (false, false) => Err(DriverError::InvalidTopology { in_port, out_port }),
    }
}

/// A flow rule checked to carry everything an OpenROADM connection needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRoadmFlowRule {
    pub rule: FlowRule,
    pub link_type: LinkType,
    pub in_port: PortNumber,
    pub out_port: PortNumber,
    pub och_signal: OchSignal,
}

impl OpenRoadmFlowRule {
    /// Validates `rule` and resolves its link type against `line_ports`.
    pub fn new(rule: &FlowRule, line_ports: &BTreeSet<PortNumber>) -> DriverResult<Self> {
        let out_port = rule
            .out_port
            .ok_or_else(|| DriverError::invalid_flow_rule(format!("{}: missing out-port", rule)))?;
        let och_signal = rule
            .och_signal
            .ok_or_else(|| DriverError::invalid_flow_rule(format!("{}: missing lambda", rule)))?;
        let link_type = resolve(rule.in_port, out_port, line_ports)?;

        Ok(Self {
            rule: rule.clone(),
            link_type,
            in_port: rule.in_port,
            out_port,
            och_signal,
        })
    }
}

impl fmt::Display for OpenRoadmFlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} @ {}",
            self.link_type,
            self.in_port,
            self.out_port,
            self.och_signal.center_frequency()
        )
    }
}
