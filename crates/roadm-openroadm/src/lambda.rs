use crate::driver::OpenRoadmDriver;
use roadm_driver_common::{c_band_lambdas, LambdaQuery};
use roadm_types::{OchSignal, PortNumber};
use tracing::debug;

impl LambdaQuery for OpenRoadmDriver {
    /// Every port supports the 96-channel C-band profile.
    fn query_lambdas(&self, port: PortNumber) -> Vec<OchSignal> {
        debug!(device = %self.device_id(), port = %port, "lambda query");
        c_band_lambdas()
    }
}
