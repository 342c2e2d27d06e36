//! Device transport collaborators.
//!
//! Drivers never open connections themselves. They ask a
//! [`SessionProvider`] for the session bound to a device and issue
//! synchronous request/response operations on it. Timeouts belong to the
//! session implementation and surface as [`DriverError::Transport`].

use crate::document::Document;
use crate::error::{DriverError, DriverResult};
use dashmap::DashMap;
use roadm_types::DeviceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// NETCONF datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    Running,
    Candidate,
    Startup,
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Datastore::Running => "running",
            Datastore::Candidate => "candidate",
            Datastore::Startup => "startup",
        };
        f.write_str(s)
    }
}

/// Default operation of an edit-config request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultOperation {
    Merge,
    Replace,
    None,
}

impl fmt::Display for DefaultOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DefaultOperation::Merge => "merge",
            DefaultOperation::Replace => "replace",
            DefaultOperation::None => "none",
        };
        f.write_str(s)
    }
}

/// A NETCONF session to one device.
pub trait NetconfSession: Send + Sync {
    /// Retrieves state and configuration matching `filter`.
    fn get(&self, filter: &Document) -> DriverResult<Document>;

    /// Retrieves configuration from `datastore` matching `filter`.
    fn get_config(&self, datastore: Datastore, filter: &Document) -> DriverResult<Document>;

    /// Applies `config` to `datastore`. `Ok(false)` means the device
    /// answered with an error reply.
    fn edit_config(
        &self,
        datastore: Datastore,
        default_operation: DefaultOperation,
        config: &Document,
    ) -> DriverResult<bool>;

    /// Copies `source` over `target`.
    fn copy_config(&self, target: Datastore, source: Datastore) -> DriverResult<bool>;
}

/// A JSON-over-HTTP session to one device.
pub trait RestSession: Send + Sync {
    /// GETs `path` and decodes the JSON body.
    fn get(&self, path: &str) -> DriverResult<Document>;

    /// PATCHes `body` to `path`, returning the HTTP status.
    fn patch(&self, path: &str, body: &Document) -> DriverResult<u16>;
}

/// Resolves the session bound to a device.
pub trait SessionProvider<S: ?Sized>: Send + Sync {
    /// Returns the session for `device`, if one is open.
    fn session(&self, device: &DeviceId) -> Option<Arc<S>>;

    /// Returns the session for `device` or [`DriverError::NoSession`].
    fn acquire_session(&self, device: &DeviceId) -> DriverResult<Arc<S>> {
        self.session(device).ok_or_else(|| DriverError::NoSession {
            device: device.clone(),
        })
    }
}

/// In-memory device-to-session table.
pub struct SessionRegistry<S: ?Sized> {
    sessions: DashMap<DeviceId, Arc<S>>,
}

impl<S: ?Sized> SessionRegistry<S> {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Binds `session` to `device`, replacing any previous binding.
    pub fn register(&self, device: DeviceId, session: Arc<S>) {
        let replaced = self.sessions.insert(device.clone(), session).is_some();
        info!(device = %device, replaced, "session registered");
    }

    /// Drops the binding for `device`.
    pub fn unregister(&self, device: &DeviceId) -> Option<Arc<S>> {
        let removed = self.sessions.remove(device).map(|(_, s)| s);
        if removed.is_some() {
            info!(device = %device, "session unregistered");
        } else {
            debug!(device = %device, "no session to unregister");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl<S: ?Sized> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + Send + Sync> SessionProvider<S> for SessionRegistry<S> {
    fn session(&self, device: &DeviceId) -> Option<Arc<S>> {
        self.sessions.get(device).map(|s| Arc::clone(s.value()))
    }
}

impl<S: ?Sized> fmt::Debug for SessionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

/// Returns true for a 2xx HTTP status.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}
