//! ROADM driver registry.
//!
//! Binds devices to one of the supported device models and dispatches the
//! capability traits to the bound driver. Also hosts the pieces the
//! `roadmctl` tool needs: a YAML port inventory and a dry-run session.

pub mod dry_run;
pub mod inventory;
pub mod registry;

pub use dry_run::DryRunSession;
pub use inventory::{FileInventory, PortEntry};
pub use registry::{DeviceDriver, DeviceModel, DriverContext, DriverRegistry};
