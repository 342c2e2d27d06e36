//! Fiber-switch device model.
//!
//! A transparent port-to-port switch driven over JSON/REST. It carries
//! whole fibers, so flow rules that select an optical channel do not apply.

pub mod discovery;
mod driver;
mod programmable;

pub use discovery::parse_ports;
pub use driver::{PolatisDriver, RestSessionProvider};
pub use programmable::ApplyOutcome;

use roadm_driver_common::{c_band_lambdas, LambdaQuery};
use roadm_types::{OchSignal, PortNumber};

impl LambdaQuery for PolatisDriver {
    fn query_lambdas(&self, _port: PortNumber) -> Vec<OchSignal> {
        c_band_lambdas()
    }
}
