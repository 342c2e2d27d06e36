//! Port-to-port connection programming.
//!
//! The switch exposes its whole cross-connect map as one JSON object
//! `{"<in>": <out>}`. Connections are added by PATCHing entries into it and
//! removed by PATCHing them under a `remove` key.

use crate::driver::PolatisDriver;
use roadm_driver_common::{DriverError, DriverResult, FlowRuleProgrammable, RestSession};
use roadm_types::{FlowEntry, FlowRule, PortNumber};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument, warn};

const REMOVE_KEY: &str = "remove";

/// Outcome of pushing one rule to the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Installed,
    /// The rule selects an optical channel, which a fiber switch cannot honour.
    Skipped,
}

fn mapping(rule: &FlowRule) -> DriverResult<Value> {
    let out = rule
        .out_port
        .ok_or_else(|| DriverError::invalid_flow_rule(format!("{} has no out-port", rule)))?;
    let mut map = Map::new();
    map.insert(rule.in_port.to_string(), json!(out.as_u64()));
    Ok(Value::Object(map))
}

fn out_port_of(value: &Value) -> Option<PortNumber> {
    match value {
        Value::Number(n) => n.as_u64().map(PortNumber::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

impl PolatisDriver {
    /// Installs the in-to-out mapping of `rule`.
    #[instrument(skip(self, rule), fields(device = %self.device_id(), rule = %rule))]
    pub fn connect(&self, rule: &FlowRule) -> DriverResult<ApplyOutcome> {
        if rule.och_signal.is_some() {
            debug!(device = %self.device_id(), rule = %rule, "channel rule ignored by fiber switch");
            return Ok(ApplyOutcome::Skipped);
        }
        let body = mapping(rule)?;
        let session = self.session()?;
        self.patch_connections(session.as_ref(), "connect", &body)?;
        info!(device = %self.device_id(), rule = %rule, "connection installed");
        Ok(ApplyOutcome::Installed)
    }

    /// Removes the in-to-out mapping of `rule`.
    #[instrument(skip(self, rule), fields(device = %self.device_id(), rule = %rule))]
    pub fn disconnect(&self, rule: &FlowRule) -> DriverResult<()> {
        let entry = mapping(rule)?;
        let body = json!({ REMOVE_KEY: entry });
        let session = self.session()?;
        self.patch_connections(session.as_ref(), "disconnect", &body)?;
        info!(device = %self.device_id(), rule = %rule, "connection removed");
        Ok(())
    }

    /// Reads the switch's cross-connect map as flow rules.
    pub fn read_connections(&self, session: &dyn RestSession) -> DriverResult<Vec<FlowRule>> {
        let path = &self.settings().connections_path;
        let reply = session.get(path)?;
        let map = reply.as_value().as_object().ok_or_else(|| {
            DriverError::document(format!("{} is not a JSON object", path))
        })?;

        let priority = self.settings().default_priority;
        let mut rules = Vec::with_capacity(map.len());
        for (input, output) in map {
            let in_port = match input.parse::<PortNumber>() {
                Ok(p) => p,
                Err(e) => {
                    warn!(device = %self.device_id(), key = %input, error = %e, "skipping entry");
                    continue;
                }
            };
            let Some(out_port) = out_port_of(output) else {
                warn!(device = %self.device_id(), key = %input, value = %output, "skipping entry");
                continue;
            };
            rules.push(
                FlowRule::new(self.device_id().clone(), in_port, out_port).with_priority(priority),
            );
        }
        Ok(rules)
    }

    /// Reads the switch map and rewrites entries that contradict intent.
    ///
    /// An entry with no matching intended rule is repaired when the
    /// controller intends some mapping for that in-port; otherwise it is
    /// reported as unmanaged and left alone. The switch entries are returned
    /// as read, before any repair.
    #[instrument(skip(self), fields(device = %self.device_id()))]
    pub fn reconcile(&self) -> DriverResult<Vec<FlowEntry>> {
        let session = self.session()?;
        let observed = self.read_connections(session.as_ref())?;
        let intended = self.flow_store().flow_rules(self.device_id());

        for rule in &observed {
            if intended.iter().any(|want| same_mapping(want, rule)) {
                continue;
            }
            let expected = intended
                .iter()
                .find(|want| want.in_port == rule.in_port && want.och_signal.is_none());
            match expected {
                Some(want) => {
                    warn!(
                        device = %self.device_id(),
                        observed = %rule,
                        expected = %want,
                        "switch diverges from intent, repairing"
                    );
                    let repaired = mapping(want)
                        .and_then(|body| self.patch_connections(session.as_ref(), "repair", &body));
                    if let Err(e) = repaired {
                        error!(device = %self.device_id(), rule = %want, error = %e, "repair failed");
                    }
                }
                None => {
                    warn!(device = %self.device_id(), observed = %rule, "unmanaged connection on switch")
                }
            }
        }

        Ok(observed.into_iter().map(FlowEntry::added).collect())
    }
}

/// A switch entry carries only ports; priority and cookie never round-trip.
fn same_mapping(want: &FlowRule, observed: &FlowRule) -> bool {
    want.och_signal.is_none()
        && want.in_port == observed.in_port
        && want.out_port == observed.out_port
}

impl FlowRuleProgrammable for PolatisDriver {
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
        rules
            .iter()
            .filter(|rule| match self.connect(rule) {
                Ok(ApplyOutcome::Installed) => true,
                Ok(ApplyOutcome::Skipped) => false,
                Err(e) => {
                    error!(device = %self.device_id(), rule = %rule, error = %e, "apply failed");
                    false
                }
            })
            .cloned()
            .collect()
    }

    fn remove_flow_rules(&self, rules: &[FlowRule]) -> Vec<FlowRule> {
        rules
            .iter()
            .filter(|rule| match self.disconnect(rule) {
                Ok(()) => true,
                Err(e) => {
                    error!(device = %self.device_id(), rule = %rule, error = %e, "remove failed");
                    false
                }
            })
            .cloned()
            .collect()
    }
}
