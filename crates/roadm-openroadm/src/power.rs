//! Optical power configuration.
//!
//! Per-channel target power lives on the `roadm-connections` entry, so it is
//! read from and written through the connection cache. Port-level power is
//! not configurable on this device model.

use crate::cache::lock_cache;
use crate::connection::Connection;
use crate::driver::OpenRoadmDriver;
use crate::ports::{is_rx_port, is_tx_port};
use crate::templates;
use roadm_driver_common::{DriverError, DriverResult, PowerConfig, PowerRange};
use roadm_types::{OchSignal, PortNumber};
use tracing::{debug, info, instrument};

fn carries(conn: &Connection, port: PortNumber, channel: &OchSignal) -> bool {
    (conn.in_port == port || conn.out_port == port)
        && conn.och_signal.center_frequency() == channel.center_frequency()
}

impl OpenRoadmDriver {
    fn power_range(&self) -> PowerRange {
        let [min, max] = self.config().power_range_dbm;
        PowerRange::new(min, max)
    }
}

impl PowerConfig for OpenRoadmDriver {
    fn target_power(&self, port: PortNumber, channel: Option<&OchSignal>) -> Option<f64> {
        let channel = channel?;
        let cache = self.caches().get(self.device_id())?;
        let cache = lock_cache(&cache);
        let power = cache
            .iter()
            .find(|conn| carries(conn, port, channel))
            .map(|conn| conn.target_output_power);
        debug!(device = %self.device_id(), port = %port, ?power, "target power");
        power
    }

    #[instrument(skip(self), fields(device = %self.device_id()))]
    fn set_target_power(
        &self,
        port: PortNumber,
        channel: Option<&OchSignal>,
        dbm: f64,
    ) -> DriverResult<()> {
        let channel = channel.ok_or_else(|| {
            DriverError::unsupported(format!("port-level target power on port {}", port))
        })?;

        let range = self.power_range();
        if !range.contains(dbm) {
            return Err(DriverError::invalid_config(
                "target-output-power",
                format!("{} dBm outside {}", dbm, range),
            ));
        }

        let cache = self.caches().cache_for(self.device_id());
        let mut cache = lock_cache(&cache);
        let name = cache
            .iter()
            .find(|conn| carries(conn, port, channel))
            .map(|conn| conn.name.clone())
            .ok_or_else(|| {
                DriverError::cache_inconsistency(
                    self.device_id(),
                    format!("no connection on port {} for {}", port, channel),
                )
            })?;

        let session = self.session()?;
        self.edit(
            session.as_ref(),
            "set target-output-power",
            &templates::connection_target_power(&name, dbm),
        )?;

        if let Some(conn) = cache.get_mut(&name) {
            conn.target_output_power = dbm;
        }
        info!(device = %self.device_id(), connection = %name, dbm, "target power set");
        Ok(())
    }

    fn target_power_range(
        &self,
        port: PortNumber,
        _channel: Option<&OchSignal>,
    ) -> Option<PowerRange> {
        let port = self.port(port).ok()?;
        is_tx_port(&port).then(|| self.power_range())
    }

    fn input_power_range(
        &self,
        port: PortNumber,
        _channel: Option<&OchSignal>,
    ) -> Option<PowerRange> {
        let port = self.port(port).ok()?;
        is_rx_port(&port).then(|| self.power_range())
    }
}
