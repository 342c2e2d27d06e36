//! In-memory collaborators.
//!
//! Sessions record every request in order and can be told to fail the
//! N-th write, so tests can assert exact request sequences and the
//! partial-failure behaviour of multi-step operations.

use roadm_driver_common::{
    Datastore, DefaultOperation, DeviceInventory, Document, DriverError, DriverResult,
    FlowRuleStore, NetconfSession, RestSession,
};
use roadm_types::{DeviceId, FlowRule, Port};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// A request seen by [`RecordingSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Get(Document),
    GetConfig(Datastore, Document),
    EditConfig(Datastore, DefaultOperation, Document),
    CopyConfig { target: Datastore, source: Datastore },
}

/// How an injected edit-config failure manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditFailure {
    /// The device answers with an error reply.
    Rejected,
    /// The transport fails.
    TransportError,
}

#[derive(Debug, Default)]
struct SessionState {
    ops: Vec<RecordedOp>,
    edits_seen: usize,
    get_reply: Option<Document>,
    get_config_reply: Option<Document>,
    fail_edits: HashMap<usize, EditFailure>,
    copy_result: bool,
    fail_get: bool,
}

/// Fake NETCONF session.
///
/// Accepts every edit-config unless a failure was injected; `get` and
/// `get-config` return the configured replies (`{}` by default).
#[derive(Debug)]
pub struct RecordingSession {
    state: Mutex<SessionState>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                copy_result: true,
                ..SessionState::default()
            }),
        }
    }

    /// Sets the reply to `get`.
    pub fn with_get_reply(self, reply: Document) -> Self {
        lock(&self.state).get_reply = Some(reply);
        self
    }

    /// Sets the reply to `get-config`.
    pub fn with_get_config_reply(self, reply: Document) -> Self {
        self.set_get_config_reply(reply);
        self
    }

    pub fn set_get_config_reply(&self, reply: Document) {
        lock(&self.state).get_config_reply = Some(reply);
    }

    /// Makes the `nth` edit-config (1-based, counted over the session
    /// lifetime) fail.
    pub fn fail_edit_at(&self, nth: usize, failure: EditFailure) {
        lock(&self.state).fail_edits.insert(nth, failure);
    }

    /// Makes `get` and `get-config` fail with a transport error.
    pub fn fail_reads(&self) {
        lock(&self.state).fail_get = true;
    }

    pub fn set_copy_result(&self, ok: bool) {
        lock(&self.state).copy_result = ok;
    }

    /// All requests in order.
    pub fn ops(&self) -> Vec<RecordedOp> {
        lock(&self.state).ops.clone()
    }

    /// Documents of all edit-config requests in order, failed ones included.
    pub fn edits(&self) -> Vec<Document> {
        lock(&self.state)
            .ops
            .iter()
            .filter_map(|op| match op {
                RecordedOp::EditConfig(_, _, doc) => Some(doc.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn edit_count(&self) -> usize {
        lock(&self.state).edits_seen
    }

    /// Forgets recorded requests; injected failures and replies stay.
    pub fn clear(&self) {
        lock(&self.state).ops.clear();
    }
}

impl NetconfSession for RecordingSession {
    fn get(&self, filter: &Document) -> DriverResult<Document> {
        let mut state = lock(&self.state);
        state.ops.push(RecordedOp::Get(filter.clone()));
        if state.fail_get {
            return Err(DriverError::transport("get", "injected failure"));
        }
        Ok(state.get_reply.clone().unwrap_or_else(Document::empty))
    }

    fn get_config(&self, datastore: Datastore, filter: &Document) -> DriverResult<Document> {
        let mut state = lock(&self.state);
        state
            .ops
            .push(RecordedOp::GetConfig(datastore, filter.clone()));
        if state.fail_get {
            return Err(DriverError::transport("get-config", "injected failure"));
        }
        Ok(state.get_config_reply.clone().unwrap_or_else(Document::empty))
    }

    fn edit_config(
        &self,
        datastore: Datastore,
        default_operation: DefaultOperation,
        config: &Document,
    ) -> DriverResult<bool> {
        let mut state = lock(&self.state);
        state.edits_seen += 1;
        let nth = state.edits_seen;
        state
            .ops
            .push(RecordedOp::EditConfig(datastore, default_operation, config.clone()));
        debug!(nth, document = %config, "recorded edit-config");
        match state.fail_edits.get(&nth) {
            Some(EditFailure::Rejected) => Ok(false),
            Some(EditFailure::TransportError) => {
                Err(DriverError::transport("edit-config", "injected failure"))
            }
            None => Ok(true),
        }
    }

    fn copy_config(&self, target: Datastore, source: Datastore) -> DriverResult<bool> {
        let mut state = lock(&self.state);
        state.ops.push(RecordedOp::CopyConfig { target, source });
        Ok(state.copy_result)
    }
}

#[derive(Debug, Default)]
struct RestState {
    responses: HashMap<String, Document>,
    patches: Vec<(String, Document)>,
    gets: Vec<String>,
    patch_status: Option<u16>,
}

/// Fake REST session serving canned GET bodies and recording PATCHes.
#[derive(Debug, Default)]
pub struct MockRestSession {
    state: Mutex<RestState>,
}

impl MockRestSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for GET `path`.
    pub fn with_response(self, path: &str, body: Document) -> Self {
        self.set_response(path, body);
        self
    }

    pub fn set_response(&self, path: &str, body: Document) {
        lock(&self.state).responses.insert(path.to_string(), body);
    }

    /// Status returned to every PATCH (200 by default).
    pub fn set_patch_status(&self, status: u16) {
        lock(&self.state).patch_status = Some(status);
    }

    /// PATCH requests in order.
    pub fn patches(&self) -> Vec<(String, Document)> {
        lock(&self.state).patches.clone()
    }

    /// GET paths in order.
    pub fn gets(&self) -> Vec<String> {
        lock(&self.state).gets.clone()
    }
}

impl RestSession for MockRestSession {
    fn get(&self, path: &str) -> DriverResult<Document> {
        let mut state = lock(&self.state);
        state.gets.push(path.to_string());
        state
            .responses
            .get(path)
            .cloned()
            .ok_or_else(|| DriverError::transport("GET", format!("404 {}", path)))
    }

    fn patch(&self, path: &str, body: &Document) -> DriverResult<u16> {
        let mut state = lock(&self.state);
        state.patches.push((path.to_string(), body.clone()));
        Ok(state.patch_status.unwrap_or(200))
    }
}

/// Inventory backed by a fixed port list per device.
#[derive(Debug, Default)]
pub struct StaticInventory {
    ports: RwLock<HashMap<DeviceId, Vec<Port>>>,
}

impl StaticInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(self, device: DeviceId, ports: Vec<Port>) -> Self {
        self.set_ports(device, ports);
        self
    }

    pub fn set_ports(&self, device: DeviceId, ports: Vec<Port>) {
        self.ports
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(device, ports);
    }
}

impl DeviceInventory for StaticInventory {
    fn ports(&self, device: &DeviceId) -> Vec<Port> {
        self.ports
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(device)
            .cloned()
            .unwrap_or_default()
    }
}

/// Flow-rule intent backed by a fixed rule list per device.
#[derive(Debug, Default)]
pub struct StaticFlowStore {
    rules: RwLock<HashMap<DeviceId, Vec<FlowRule>>>,
}

impl StaticFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(self, device: DeviceId, rules: Vec<FlowRule>) -> Self {
        self.rules
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(device, rules);
        self
    }
}

impl FlowRuleStore for StaticFlowStore {
    fn flow_rules(&self, device: &DeviceId) -> Vec<FlowRule> {
        self.rules
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(device)
            .cloned()
            .unwrap_or_default()
    }
}
