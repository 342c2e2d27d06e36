//! Common infrastructure for ROADM southbound drivers.
//!
//! This crate provides the pieces shared by every device model:
//!
//! - [`error`]: the driver error taxonomy
//! - [`config`]: YAML-backed driver configuration
//! - [`document`]: tree-structured configuration documents
//! - [`transport`]: NETCONF/REST session collaborators
//! - [`inventory`]: controller port inventory and flow-rule intent
//! - [`behaviour`]: capability traits implemented by device models

pub mod behaviour;
pub mod config;
pub mod document;
pub mod error;
pub mod inventory;
pub mod transport;

// Re-export commonly used items at crate root
pub use behaviour::{
    c_band_lambdas, DeviceDescription, DeviceDiscovery, DeviceType, FlowRuleProgrammable,
    LambdaQuery, PowerConfig, PowerRange,
};
pub use config::{DriverConfig, PolatisConfig, DEFAULT_MAX_CONNECTIONS};
pub use document::Document;
pub use error::{DriverError, DriverResult};
pub use inventory::{DeviceInventory, FlowRuleStore};
pub use transport::{
    Datastore, DefaultOperation, NetconfSession, RestSession, SessionProvider, SessionRegistry,
};
