//! Port role classification.

use roadm_types::{Port, PortNumber};
use std::collections::BTreeSet;

/// Returns the ports whose logical connection point contains `line_marker`.
///
/// Ports without the annotation are not line ports; an unconfigured device
/// yields an empty set.
pub fn line_ports(ports: &[Port], line_marker: &str) -> BTreeSet<PortNumber> {
    ports
        .iter()
        .filter(|p| {
            p.logical_connection_point()
                .is_some_and(|lcp| lcp.contains(line_marker))
        })
        .map(|p| p.number)
        .collect()
}

/// Output (transmit) port.
pub fn is_tx_port(port: &Port) -> bool {
    port.logical_connection_point()
        .is_some_and(|lcp| lcp.contains("TX"))
}

/// Input (receive) port.
pub fn is_rx_port(port: &Port) -> bool {
    port.logical_connection_point()
        .is_some_and(|lcp| lcp.contains("RX"))
}
