//! Common optical types for ROADM device drivers.
//!
//! This crate provides type-safe representations of the vendor-neutral
//! primitives exchanged between the controller and the southbound drivers:
//!
//! - [`Frequency`]: exact integer-Hz optical frequencies
//! - [`OchSignal`]: fixed-grid optical channel (grid, spacing, multiplier, slots)
//! - [`Port`] / [`PortNumber`]: device ports and their annotations
//! - [`FlowRule`]: an abstract optical cross-connect request
//! - [`DeviceId`]: device identity

mod device;
mod flow;
mod frequency;
mod och;
mod port;

pub use device::DeviceId;
pub use flow::{FlowEntry, FlowEntryState, FlowRule};
pub use frequency::Frequency;
pub use och::{ChannelSpacing, GridType, OchSignal, OchSignalType, CENTER_FREQUENCY};
pub use port::{annotation_keys, Port, PortKind, PortNumber};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("invalid channel spacing: {0}")]
    InvalidChannelSpacing(String),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),
}
