//! Test infrastructure for the ROADM drivers.
//!
//! Provides recording transport fakes, static controller collaborators,
//! canned device layouts and replies, and helpers to inspect recorded
//! configuration documents.

pub mod fixtures;
mod mock;
mod verification;

pub use fixtures::*;
pub use mock::*;
pub use verification::*;
