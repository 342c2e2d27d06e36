//! Canned devices, rules and device replies.

use roadm_driver_common::behaviour::{C_BAND_START, C_BAND_STOP};
use roadm_driver_common::Document;
use roadm_types::{
    annotation_keys, ChannelSpacing, DeviceId, FlowRule, OchSignal, Port, PortKind, PortNumber,
};
use serde_json::{json, Map, Value};

/// Device id used by the OpenROADM fixtures.
pub const ROADM_DEVICE: &str = "netconf:10.0.0.1:830";

/// Device id used by the fiber-switch fixtures.
pub const SWITCH_DEVICE: &str = "rest:10.0.0.2:8008";

pub fn roadm_device() -> DeviceId {
    DeviceId::from(ROADM_DEVICE)
}

pub fn switch_device() -> DeviceId {
    DeviceId::from(SWITCH_DEVICE)
}

/// 50 GHz DWDM channel `multiplier` steps away from 193.1 THz.
///
/// 58 is 196.0 THz, -35 is 191.35 THz (C1).
pub fn och_signal(multiplier: i32) -> OchSignal {
    OchSignal::new_dwdm_slot(ChannelSpacing::Chl50Ghz, multiplier)
}

/// A cross-connect of one 50 GHz channel on the OpenROADM fixture device.
pub fn cross_connect(in_port: PortNumber, out_port: PortNumber, multiplier: i32) -> FlowRule {
    FlowRule::new(roadm_device(), in_port, out_port).with_och_signal(och_signal(multiplier))
}

/// A port-to-port rule on the fiber-switch fixture device.
pub fn fiber_rule(in_port: u64, out_port: u64) -> FlowRule {
    FlowRule::new(switch_device(), PortNumber::new(in_port), PortNumber::new(out_port))
        .with_priority(88)
}

/// Ports of a three-degree ROADM with one SRG.
///
/// Degree ports follow the `ext-txN`/`ext-rxN` naming, add/drop ports the
/// `N-M` naming, so their numbers match what discovery would synthesise.
pub mod roadm_ports {
    use super::*;

    pub const DEG1_TX: PortNumber = PortNumber::new(301);
    pub const DEG1_RX: PortNumber = PortNumber::new(401);
    pub const DEG2_TX: PortNumber = PortNumber::new(302);
    pub const DEG2_RX: PortNumber = PortNumber::new(402);
    pub const DEG3_TX: PortNumber = PortNumber::new(303);
    pub const DEG3_RX: PortNumber = PortNumber::new(403);
    pub const SRG1_PP1_TX: PortNumber = PortNumber::new(101);
    pub const SRG1_PP2_RX: PortNumber = PortNumber::new(102);

    /// (number, logical connection point, circuit pack, port name)
    const LAYOUT: [(PortNumber, &str, &str, &str); 8] = [
        (DEG1_TX, "DEG1-TTP-TX", "1/0", "ext-tx1"),
        (DEG1_RX, "DEG1-TTP-RX", "1/0", "ext-rx1"),
        (DEG2_TX, "DEG2-TTP-TX", "2/0", "ext-tx2"),
        (DEG2_RX, "DEG2-TTP-RX", "2/0", "ext-rx2"),
        (DEG3_TX, "DEG3-TTP-TX", "3/0", "ext-tx3"),
        (DEG3_RX, "DEG3-TTP-RX", "3/0", "ext-rx3"),
        (SRG1_PP1_TX, "SRG1-PP1-TX", "4/0", "1-1"),
        (SRG1_PP2_RX, "SRG1-PP2-RX", "4/0", "1-2"),
    ];

    /// Annotated OMS port.
    pub fn port(number: PortNumber, lcp: &str, circuit_pack: &str, name: &str) -> Port {
        Port::new(
            number,
            PortKind::Oms {
                min_frequency: C_BAND_START,
                max_frequency: C_BAND_STOP,
                grid: ChannelSpacing::Chl50Ghz.frequency(),
            },
        )
        .with_annotation(annotation_keys::LOGICAL_CONNECTION_POINT, lcp)
        .with_annotation(annotation_keys::CIRCUIT_PACK, circuit_pack)
        .with_annotation(annotation_keys::PORT_NAME, name)
    }

    pub fn all() -> Vec<Port> {
        LAYOUT
            .iter()
            .map(|(n, lcp, cp, name)| port(*n, lcp, cp, name))
            .collect()
    }

    /// Same ports with no annotations at all.
    pub fn unannotated() -> Vec<Port> {
        all()
            .into_iter()
            .map(|mut p| {
                p.annotations.clear();
                p
            })
            .collect()
    }

    /// Logical connection point of a fixture port.
    pub fn lcp(number: PortNumber) -> Option<&'static str> {
        LAYOUT
            .iter()
            .find(|(n, ..)| *n == number)
            .map(|(_, lcp, ..)| *lcp)
    }
}

/// Device replies.
pub mod replies {
    use super::*;

    fn device(body: Value) -> Document {
        Document::new(json!({ "data": { "org-openroadm-device": body } }))
    }

    /// A get-config reply listing the named connections.
    pub fn connections(names: &[&str]) -> Document {
        let list: Vec<Value> = names
            .iter()
            .map(|name| {
                json!({
                    "connection-name": name,
                    "opticalControlMode": "off",
                    "target-output-power": 0.0,
                })
            })
            .collect();
        device(json!({ "roadm-connections": list }))
    }

    /// A get reply for the info container.
    pub fn info(leaves: &[(&str, &str)]) -> Document {
        let mut info = Map::new();
        for (key, value) in leaves {
            info.insert((*key).to_string(), json!(value));
        }
        device(json!({ "info": info }))
    }

    /// A fully populated ROADM info container.
    pub fn roadm_info() -> Document {
        let mut doc = info(&[
            ("node-type", "rdm"),
            ("vendor", "vendorA"),
            ("model", "model-2"),
            ("softwareVersion", "7.1"),
            ("serial-id", "SN0001"),
            ("node-number", "42"),
        ])
        .into_value();
        doc["data"]["org-openroadm-device"]["info"]["geoLocation"] =
            json!({ "latitude": "41.39", "longitude": "2.11" });
        Document::new(doc)
    }

    /// One circuit pack; ports are (port-name, port-qual, lcp, wavelength-type).
    pub fn circuit_pack(name: &str, ports: &[(&str, &str, &str, Option<&str>)]) -> Value {
        let ports: Vec<Value> = ports
            .iter()
            .map(|(port, qual, lcp, wl)| {
                let mut node = Map::new();
                node.insert("port-name".into(), json!(port));
                node.insert("port-qual".into(), json!(qual));
                node.insert("logical-connection-point".into(), json!(lcp));
                if let Some(wl) = wl {
                    node.insert("port-wavelength-type".into(), json!(wl));
                }
                Value::Object(node)
            })
            .collect();
        json!({ "circuit-pack-name": name, "ports": ports })
    }

    /// A get reply for the circuit-packs list.
    pub fn circuit_packs(packs: Vec<Value>) -> Document {
        device(json!({ "circuit-packs": packs }))
    }

    /// Fiber-switch port inventory.
    pub fn switch_ports(inputs: &[u64], outputs: &[u64]) -> Document {
        Document::new(json!({ "input_ports": inputs, "output_ports": outputs }))
    }

    /// Fiber-switch connection map.
    pub fn switch_connections(pairs: &[(u64, u64)]) -> Document {
        let map: Map<String, Value> = pairs
            .iter()
            .map(|(i, o)| (i.to_string(), json!(o)))
            .collect();
        Document::new(Value::Object(map))
    }
}
