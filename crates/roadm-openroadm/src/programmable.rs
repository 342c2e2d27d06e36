//! Cross-connect programming and cache-backed read-back.
//!
//! Create order: Media-Channel(s), Network-Media-Channels, connection; the
//! cache entry is added only once the connection exists. Delete order is the
//! reverse, and the cache entry is dropped right after the connection
//! object is deleted. A failed step aborts the sequence; earlier steps are
//! not rolled back and nothing is retried here.

use crate::cache::lock_cache;
use crate::codec::to_och_signal_center_width;
use crate::connection::{Connection, ConnectionNameParts};
use crate::driver::OpenRoadmDriver;
use crate::flow_rule::OpenRoadmFlowRule;
use crate::templates::{self, mc_sides, CONNECTIONS_PATH};
use roadm_driver_common::document::str_at;
use roadm_driver_common::{
    DriverError, DriverResult, FlowRuleProgrammable, NetconfSession,
};
use roadm_types::{FlowEntry, FlowRule};
use tracing::{debug, error, info, instrument, warn};

impl OpenRoadmDriver {
    /// Creates the cross-connect for `rule` and records it in the cache.
    #[instrument(skip(self, rule), fields(device = %self.device_id(), rule = %rule))]
    pub fn apply(&self, rule: &FlowRule) -> DriverResult<Connection> {
        let xc = OpenRoadmFlowRule::new(rule, &self.line_ports())?;
        info!(device = %self.device_id(), xc = %xc, "applying cross-connect");

        let cache = self.caches().cache_for(self.device_id());
        let mut cache = lock_cache(&cache);

        let limit = self.config().max_connections;
        if cache.size() >= limit {
            error!(device = %self.device_id(), limit, "connection limit reached");
            return Err(DriverError::CapacityExceeded {
                device: self.device_id().clone(),
                limit,
            });
        }

        let src = self.port(xc.in_port)?;
        let dst = self.port(xc.out_port)?;
        let conn = Connection::build(&xc, &src, &dst, self.config())?;

        let session = self.session()?;
        self.edit(
            session.as_ref(),
            "create media-channel",
            &templates::create_media_channels(&conn),
        )?;
        self.edit(
            session.as_ref(),
            "create network-media-channel",
            &templates::create_network_media_channels(&conn),
        )?;
        self.edit(
            session.as_ref(),
            "create connection",
            &templates::create_connection(&conn),
        )?;

        cache.add(conn.clone());
        info!(device = %self.device_id(), connection = %conn.name, "connection created");
        Ok(conn)
    }

    /// Tears down the cross-connect for `rule`.
    ///
    /// Fails with [`DriverError::CacheInconsistency`] when the connection is
    /// not cached; the device may then hold state the controller cannot
    /// describe.
    #[instrument(skip(self, rule), fields(device = %self.device_id(), rule = %rule))]
    pub fn release(&self, rule: &FlowRule) -> DriverResult<Connection> {
        let xc = OpenRoadmFlowRule::new(rule, &self.line_ports())?;
        let src = self.port(xc.in_port)?;
        let dst = self.port(xc.out_port)?;
        let name = Connection::build(&xc, &src, &dst, self.config())?.name;

        let cache = self.caches().cache_for(self.device_id());
        let mut cache = lock_cache(&cache);

        let conn = match cache.get(&name) {
            Some(conn) => conn.clone(),
            None => {
                error!(device = %self.device_id(), connection = %name, "connection not found in cache");
                return Err(DriverError::cache_inconsistency(
                    self.device_id(),
                    format!("release of unknown connection {}", name),
                ));
            }
        };
        info!(device = %self.device_id(), connection = %name, link_type = %conn.link_type, "releasing");

        let session = self.session()?;
        self.edit(
            session.as_ref(),
            "delete connection",
            &templates::delete_connection(&conn.name),
        )?;

        cache.remove(&conn.name);

        let parts = conn.parts();
        self.edit(
            session.as_ref(),
            "delete network-media-channel",
            &templates::delete_interfaces(&parts.nmc_names()),
        )?;

        let mcs: Vec<String> = mc_sides(conn.link_type)
            .iter()
            .filter_map(|side| conn.mc(*side))
            .map(|mc| mc.name.clone())
            .collect();
        if !mcs.is_empty() {
            self.edit(
                session.as_ref(),
                "delete media-channel",
                &templates::delete_interfaces(&mcs),
            )?;
        }

        info!(device = %self.device_id(), connection = %name, "connection deleted");
        Ok(conn)
    }

    /// Reads the device connections and resolves them through the cache.
    ///
    /// Connections missing from the cache are deleted best-effort and not
    /// reported. The cache stays locked for the whole pass so that a
    /// concurrent apply cannot be mistaken for an orphan.
    #[instrument(skip(self), fields(device = %self.device_id()))]
    pub fn reconcile(&self) -> DriverResult<Vec<FlowEntry>> {
        let session = self.session()?;

        let cache = self.caches().cache_for(self.device_id());
        let cache = lock_cache(&cache);

        let reply = session.get_config(self.config().datastore, &templates::connections_filter())?;
        debug!(device = %self.device_id(), reply = %reply, "connections read back");

        let mut entries = Vec::new();
        for node in reply.list_at(CONNECTIONS_PATH) {
            let Some(name) = str_at(node, "connection-name") else {
                error!(device = %self.device_id(), "connection name not retrieved");
                continue;
            };

            match cache.get(&name) {
                Some(conn) => match self.rebuild_rule(conn) {
                    Ok(rule) => entries.push(FlowEntry::added(rule)),
                    Err(e) => {
                        warn!(device = %self.device_id(), connection = %name, error = %e, "cannot rebuild flow rule")
                    }
                },
                None => {
                    error!(
                        device = %self.device_id(),
                        connection = %name,
                        "connection not in cache, deleting"
                    );
                    if let Err(e) = self.delete_named(session.as_ref(), &name) {
                        warn!(device = %self.device_id(), connection = %name, error = %e, "orphan delete failed");
                    }
                }
            }
        }
        Ok(entries)
    }

    /// Deletes a connection and its interfaces knowing only its name.
    ///
    /// A cached entry with that name is dropped as well.
    #[instrument(skip(self), fields(device = %self.device_id()))]
    pub fn delete_by_name(&self, name: &str) -> DriverResult<()> {
        let session = self.session()?;
        let cache = self.caches().cache_for(self.device_id());
        let mut cache = lock_cache(&cache);
        self.delete_named(session.as_ref(), name)?;
        cache.remove(name);
        Ok(())
    }

    fn delete_named(&self, session: &dyn NetconfSession, name: &str) -> DriverResult<()> {
        let parts = ConnectionNameParts::parse(name).ok_or_else(|| {
            DriverError::document(format!("cannot split connection name {}", name))
        })?;
        info!(
            device = %self.device_id(),
            connection = %name,
            nmc_src = %parts.src_nmc,
            nmc_dst = %parts.dst_nmc,
            mc_src = ?parts.src_mc,
            mc_dst = ?parts.dst_mc,
            "deleting by name"
        );

        self.edit(session, "delete connection", &templates::delete_connection(name))?;
        self.edit(
            session,
            "delete network-media-channel",
            &templates::delete_interfaces(&parts.nmc_names()),
        )?;
        let mcs = parts.mc_names();
        if !mcs.is_empty() {
            self.edit(
                session,
                "delete media-channel",
                &templates::delete_interfaces(&mcs),
            )?;
        }
        Ok(())
    }

    fn rebuild_rule(&self, conn: &Connection) -> DriverResult<FlowRule> {
        let signal = to_och_signal_center_width(conn.src_nmc.frequency, conn.src_nmc.width)?;
        Ok(
            FlowRule::new(self.device_id().clone(), conn.in_port, conn.out_port)
                .with_och_signal(signal)
                .with_priority(conn.priority)
                .with_cookie(conn.cookie),
        )
    }

    fn dump_cache(&self) {
        if let Some(cache) = self.caches().get(self.device_id()) {
            lock_cache(&cache).dump(self.device_id());
        }
    }
}

impl FlowRuleProgrammable for OpenRoadmDriver {
    fn get_flow_entries(&self) -> Vec<FlowEntry> {
        match self.reconcile() {
            Ok(entries) => entries,
            Err(e) => {
                error!(device = %self.device_id(), error = %e, "failed to read connections");
                Vec::new()
            }
        }
    }

    fn apply_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule> {
        let added = rules
            .iter()
            .filter(|rule| match self.apply(rule) {
                Ok(_) => true,
                Err(e) => {
                    error!(device = %self.device_id(), rule = %rule, error = %e, "apply failed");
                    false
                }
            })
            .cloned()
            .collect();
        self.dump_cache();
        added
    }

    fn remove_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule> {
        let removed = rules
            .iter()
            .filter(|rule| match self.release(rule) {
                Ok(_) => true,
                Err(e) => {
                    error!(device = %self.device_id(), rule = %rule, error = %e, "remove failed");
                    false
                }
            })
            .cloned()
            .collect();
        self.dump_cache();
        removed
    }
}
