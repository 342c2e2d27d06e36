//! OpenROADM connection model.
//!
//! A [`Connection`] holds everything needed to create, read back and delete
//! one cross-connect on the device: the Network-Media-Channel (NMC)
//! interfaces on both sides, the Media-Channel (MC) interfaces on the line
//! side(s), and the `roadm-connections` entry joining the two NMCs.
//!
//! Names are built from each port's logical connection point and the center
//! frequency rendered by [`Frequency::as_thz_string`], so rebuilding a
//! connection from the same rule always yields byte-identical names.

use crate::codec::{center_width_to_window, min_max_to_slot};
use crate::flow_rule::{LinkType, OpenRoadmFlowRule};
use roadm_driver_common::{DriverConfig, DriverError, DriverResult};
use roadm_types::{annotation_keys, DeviceId, Frequency, OchSignal, Port, PortNumber};
use serde::Serialize;

pub const NMC_PREFIX: &str = "NMC-CTP-";
pub const MC_PREFIX: &str = "MC-TTP-";
pub const OMS_PREFIX: &str = "OMS-";
pub const CONNECTION_JOIN: &str = "-to-";

/// One end of a cross-connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Destination,
}

/// Media-Channel trail termination point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaChannel {
    pub name: String,
    pub supporting_circuit_pack: String,
    pub supporting_port: String,
    pub supporting_interface: String,
    pub min_frequency: Frequency,
    pub max_frequency: Frequency,
}

/// Network-Media-Channel connection termination point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkMediaChannel {
    pub name: String,
    pub supporting_circuit_pack: String,
    pub supporting_port: String,
    /// The MC on line sides; client sides have none.
    pub supporting_interface: Option<String>,
    pub frequency: Frequency,
    pub width: Frequency,
}

/// A cross-connect as realised on the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub name: String,
    pub device_id: DeviceId,
    pub link_type: LinkType,
    pub in_port: PortNumber,
    pub out_port: PortNumber,
    pub och_signal: OchSignal,
    pub priority: u32,
    pub cookie: u64,
    pub optical_control_mode: String,
    pub target_output_power: f64,
    pub src_nmc: NetworkMediaChannel,
    pub dst_nmc: NetworkMediaChannel,
    pub src_mc: Option<MediaChannel>,
    pub dst_mc: Option<MediaChannel>,
}

/// Name of the MC on `lcp` at `center`.
pub fn mc_name(lcp: &str, center: Frequency) -> String {
    format!("{}{}-{}", MC_PREFIX, lcp, center.as_thz_string())
}

/// Name of the NMC on `lcp` at `center`; client-side NMCs carry no prefix.
pub fn nmc_name(lcp: &str, center: Frequency, line_side: bool) -> String {
    let prefix = if line_side { NMC_PREFIX } else { "" };
    format!("{}{}-{}", prefix, lcp, center.as_thz_string())
}

/// Name of the connection joining two NMCs.
pub fn connection_name(src_nmc: &str, dst_nmc: &str) -> String {
    format!("{}{}{}", src_nmc, CONNECTION_JOIN, dst_nmc)
}

/// Name of the OMS interface supporting an MC on `lcp`.
pub fn oms_interface_name(lcp: &str) -> String {
    format!("{}{}", OMS_PREFIX, lcp)
}

impl LinkType {
    /// Whether `side` of this link type terminates on a line port.
    pub fn is_line_side(&self, side: Side) -> bool {
        match (self, side) {
            (LinkType::Express, _) => true,
            (LinkType::Add, Side::Destination) => true,
            (LinkType::Drop, Side::Source) => true,
            _ => false,
        }
    }
}

/// Port annotations needed to name interfaces on one side.
struct PortLabels<'a> {
    lcp: &'a str,
    circuit_pack: &'a str,
    port_name: &'a str,
}

impl<'a> PortLabels<'a> {
    fn from_port(port: &'a Port) -> DriverResult<Self> {
        let require = |key: &str| {
            port.annotation(key)
                .ok_or_else(|| DriverError::port_metadata(port.number, key))
        };
        Ok(Self {
            lcp: require(annotation_keys::LOGICAL_CONNECTION_POINT)?,
            circuit_pack: require(annotation_keys::CIRCUIT_PACK)?,
            port_name: require(annotation_keys::PORT_NAME)?,
        })
    }
}

impl Connection {
    /// Builds the connection model for a resolved rule.
    ///
    /// Pure: performs no I/O. Channels whose window does not encode on the
    /// fixed grid fail with [`DriverError::UnsupportedChannelWidth`].
    pub fn build(
        xc: &OpenRoadmFlowRule,
        src_port: &Port,
        dst_port: &Port,
        config: &DriverConfig,
    ) -> DriverResult<Self> {
        let center = xc.och_signal.center_frequency();
        let width = xc.och_signal.channel_width();
        let (min, max) = center_width_to_window(center, width);
        // only 50/100 GHz windows are written
        min_max_to_slot(min, max)?;

        let src = PortLabels::from_port(src_port)?;
        let dst = PortLabels::from_port(dst_port)?;

        let media_channel = |labels: &PortLabels<'_>| MediaChannel {
            name: mc_name(labels.lcp, center),
            supporting_circuit_pack: labels.circuit_pack.to_string(),
            supporting_port: labels.port_name.to_string(),
            supporting_interface: oms_interface_name(labels.lcp),
            min_frequency: min,
            max_frequency: max,
        };

        let src_mc = xc
            .link_type
            .is_line_side(Side::Source)
            .then(|| media_channel(&src));
        let dst_mc = xc
            .link_type
            .is_line_side(Side::Destination)
            .then(|| media_channel(&dst));

        let network_media_channel =
            |labels: &PortLabels<'_>, mc: &Option<MediaChannel>| NetworkMediaChannel {
                name: nmc_name(labels.lcp, center, mc.is_some()),
                supporting_circuit_pack: labels.circuit_pack.to_string(),
                supporting_port: labels.port_name.to_string(),
                supporting_interface: mc.as_ref().map(|m| m.name.clone()),
                frequency: center,
                width,
            };

        let src_nmc = network_media_channel(&src, &src_mc);
        let dst_nmc = network_media_channel(&dst, &dst_mc);

        Ok(Self {
            name: connection_name(&src_nmc.name, &dst_nmc.name),
            device_id: xc.rule.device_id.clone(),
            link_type: xc.link_type,
            in_port: xc.in_port,
            out_port: xc.out_port,
            och_signal: xc.och_signal,
            priority: xc.rule.priority,
            cookie: xc.rule.cookie,
            optical_control_mode: config.optical_control_mode.clone(),
            target_output_power: config.target_output_power,
            src_nmc,
            dst_nmc,
            src_mc,
            dst_mc,
        })
    }

    /// Returns the NMC on `side`.
    pub fn nmc(&self, side: Side) -> &NetworkMediaChannel {
        match side {
            Side::Source => &self.src_nmc,
            Side::Destination => &self.dst_nmc,
        }
    }

    /// Returns the MC on `side`, if that side has one.
    pub fn mc(&self, side: Side) -> Option<&MediaChannel> {
        match side {
            Side::Source => self.src_mc.as_ref(),
            Side::Destination => self.dst_mc.as_ref(),
        }
    }

    /// Interface names derived from this connection, in delete order.
    pub fn parts(&self) -> ConnectionNameParts {
        ConnectionNameParts {
            connection: self.name.clone(),
            src_nmc: self.src_nmc.name.clone(),
            dst_nmc: self.dst_nmc.name.clone(),
            src_mc: self.src_mc.as_ref().map(|m| m.name.clone()),
            dst_mc: self.dst_mc.as_ref().map(|m| m.name.clone()),
        }
    }
}

/// Interface names recoverable from a connection name alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionNameParts {
    pub connection: String,
    pub src_nmc: String,
    pub dst_nmc: String,
    pub src_mc: Option<String>,
    pub dst_mc: Option<String>,
}

impl ConnectionNameParts {
    /// Splits `name` at the first join marker.
    ///
    /// An MC is derived only for NMC names carrying the line-side prefix;
    /// client-side NMCs have no MC.
    pub fn parse(name: &str) -> Option<Self> {
        let (src, dst) = name.split_once(CONNECTION_JOIN)?;
        if src.is_empty() || dst.is_empty() {
            return None;
        }
        let mc_for = |nmc: &str| {
            nmc.strip_prefix(NMC_PREFIX)
                .map(|rest| format!("{}{}", MC_PREFIX, rest))
        };
        Some(Self {
            connection: name.to_string(),
            src_nmc: src.to_string(),
            dst_nmc: dst.to_string(),
            src_mc: mc_for(src),
            dst_mc: mc_for(dst),
        })
    }

    pub fn nmc_names(&self) -> Vec<String> {
        vec![self.src_nmc.clone(), self.dst_nmc.clone()]
    }

    pub fn mc_names(&self) -> Vec<String> {
        self.src_mc.iter().chain(self.dst_mc.iter()).cloned().collect()
    }
}
