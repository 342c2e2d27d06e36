//! OpenROADM device model.
//!
//! Translates abstract optical flow rules into OpenROADM
//! `interface`/`roadm-connections` configuration over NETCONF and keeps a
//! per-device connection cache in lockstep with the device.
//!
//! - [`codec`]: (center, width) / window / grid-slot conversions
//! - [`ports`]: line vs. client port classification
//! - [`flow_rule`]: EXPRESS / ADD / DROP resolution
//! - [`connection`]: connection model and naming grammar
//! - [`cache`]: per-device connection cache and its manager
//! - [`templates`]: configuration document rendering
//! - [`OpenRoadmDriver`]: apply / release / reconcile, discovery, power, lambdas

pub mod cache;
pub mod codec;
pub mod connection;
pub mod discovery;
mod driver;
pub mod flow_rule;
mod lambda;
pub mod ports;
mod power;
mod programmable;
pub mod templates;

pub use cache::{ConnectionCache, ConnectionCacheManager};
pub use connection::{Connection, ConnectionNameParts, MediaChannel, NetworkMediaChannel, Side};
pub use discovery::port_number_from_name;
pub use driver::{NetconfSessionProvider, OpenRoadmDriver};
pub use flow_rule::{LinkType, OpenRoadmFlowRule};
