//! OpenROADM configuration documents.
//!
//! Every create/delete request is rendered from a [`Connection`] by one
//! renderer per object kind. What differs between link types is only which
//! sides carry a Media-Channel, see [`mc_sides`].

use crate::connection::{Connection, MediaChannel, NetworkMediaChannel, Side};
use crate::flow_rule::LinkType;
use roadm_driver_common::document::{OPERATION_DELETE, OPERATION_KEY};
use roadm_driver_common::Document;
use serde_json::{json, Map, Value};

/// Root container of the device model.
pub const DEVICE_ROOT: &str = "org-openroadm-device";

/// Path of the connection list in a get-config reply.
pub const CONNECTIONS_PATH: &str = "data.org-openroadm-device.roadm-connections";

/// Path of the device info container in a get reply.
pub const INFO_PATH: &str = "data.org-openroadm-device.info";

/// Path of the circuit-pack list in a get reply.
pub const CIRCUIT_PACKS_PATH: &str = "data.org-openroadm-device.circuit-packs";

const MC_DESCRIPTION: &str = "Media-Channel";
const MC_TYPE: &str = "openROADM-if:mediaChannelTrailTerminationPoint";
const NMC_DESCRIPTION: &str = "Network-Media-Channel";
const NMC_TYPE: &str = "openROADM-if:networkMediaChannelConnectionTerminationPoint";
const ADMIN_STATE_IN_SERVICE: &str = "inService";

/// Sides carrying a Media-Channel for `link_type`.
///
/// Network-Media-Channels exist on both sides of every link.
pub fn mc_sides(link_type: LinkType) -> &'static [Side] {
    match link_type {
        LinkType::Express => &[Side::Source, Side::Destination],
        LinkType::Add => &[Side::Destination],
        LinkType::Drop => &[Side::Source],
    }
}

fn device(body: Value) -> Document {
    Document::new(json!({ DEVICE_ROOT: body }))
}

fn interface(
    name: &str,
    description: &str,
    type_tag: &str,
    circuit_pack: &str,
    port: &str,
    supporting_interface: Option<&str>,
    payload: (&str, Value),
) -> Value {
    let mut node = Map::new();
    node.insert("name".into(), json!(name));
    node.insert("description".into(), json!(description));
    node.insert("type".into(), json!(type_tag));
    node.insert("administrative-state".into(), json!(ADMIN_STATE_IN_SERVICE));
    node.insert("supporting-circuit-pack-name".into(), json!(circuit_pack));
    node.insert("supporting-port".into(), json!(port));
    if let Some(support) = supporting_interface {
        node.insert("supporting-interface".into(), json!(support));
    }
    node.insert(payload.0.into(), payload.1);
    Value::Object(node)
}

fn mc_interface(mc: &MediaChannel) -> Value {
    interface(
        &mc.name,
        MC_DESCRIPTION,
        MC_TYPE,
        &mc.supporting_circuit_pack,
        &mc.supporting_port,
        Some(&mc.supporting_interface),
        (
            "mc-ttp",
            json!({
                "min-freq": mc.min_frequency.as_thz_string(),
                "max-freq": mc.max_frequency.as_thz_string(),
            }),
        ),
    )
}

fn nmc_interface(nmc: &NetworkMediaChannel) -> Value {
    interface(
        &nmc.name,
        NMC_DESCRIPTION,
        NMC_TYPE,
        &nmc.supporting_circuit_pack,
        &nmc.supporting_port,
        nmc.supporting_interface.as_deref(),
        (
            "nmc-ctp",
            json!({
                "frequency": nmc.frequency.as_thz_string(),
                "width": nmc.width.as_ghz_string(),
            }),
        ),
    )
}

/// Creates the Media-Channel interface(s) of `conn`.
pub fn create_media_channels(conn: &Connection) -> Document {
    let interfaces: Vec<Value> = mc_sides(conn.link_type)
        .iter()
        .filter_map(|side| conn.mc(*side))
        .map(mc_interface)
        .collect();
    device(json!({ "interface": interfaces }))
}

/// Creates the Network-Media-Channel interfaces of `conn`.
pub fn create_network_media_channels(conn: &Connection) -> Document {
    let interfaces: Vec<Value> = [Side::Source, Side::Destination]
        .iter()
        .map(|side| nmc_interface(conn.nmc(*side)))
        .collect();
    device(json!({ "interface": interfaces }))
}

/// Creates the `roadm-connections` entry of `conn`.
pub fn create_connection(conn: &Connection) -> Document {
    device(json!({
        "roadm-connections": {
            "connection-name": conn.name,
            "opticalControlMode": conn.optical_control_mode,
            "target-output-power": conn.target_output_power,
            "source": { "src-if": conn.src_nmc.name },
            "destination": { "dst-if": conn.dst_nmc.name },
        }
    }))
}

/// Deletes the connection named `name`.
pub fn delete_connection(name: &str) -> Document {
    device(json!({
        "roadm-connections": {
            OPERATION_KEY: OPERATION_DELETE,
            "connection-name": name,
        }
    }))
}

/// Deletes the named interfaces in one request.
pub fn delete_interfaces(names: &[String]) -> Document {
    let interfaces: Vec<Value> = names
        .iter()
        .map(|name| json!({ OPERATION_KEY: OPERATION_DELETE, "name": name }))
        .collect();
    device(json!({ "interface": interfaces }))
}

/// Rewrites the target output power of a live connection.
pub fn connection_target_power(name: &str, dbm: f64) -> Document {
    device(json!({
        "roadm-connections": {
            "connection-name": name,
            "target-output-power": dbm,
        }
    }))
}

/// Filter selecting every connection.
pub fn connections_filter() -> Document {
    device(json!({ "roadm-connections": {} }))
}

/// Filter selecting the device info container.
pub fn info_filter() -> Document {
    device(json!({ "info": {} }))
}

/// Filter selecting every circuit pack.
pub fn circuit_packs_filter() -> Document {
    device(json!({ "circuit-packs": {} }))
}
