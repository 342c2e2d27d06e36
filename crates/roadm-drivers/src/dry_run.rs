//! NETCONF session that writes every request instead of sending it.

use roadm_driver_common::{
    Datastore, DefaultOperation, Document, DriverError, DriverResult, NetconfSession,
};
use std::io::Write;
use std::sync::Mutex;

/// Accepts every edit and prints it as pretty JSON to the wrapped writer.
///
/// Reads return an empty document, so a reconcile pass sees a device with
/// no connections.
pub struct DryRunSession<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> DryRunSession<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, operation: &str, header: &str, doc: Option<&Document>) -> DriverResult<()> {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let io = |e: std::io::Error| DriverError::transport(operation, e.to_string());
        writeln!(out, "# {}", header).map_err(io)?;
        if let Some(doc) = doc {
            writeln!(out, "{}", doc.to_pretty_string()).map_err(io)?;
        }
        Ok(())
    }
}

impl<W: Write + Send> NetconfSession for DryRunSession<W> {
    fn get(&self, filter: &Document) -> DriverResult<Document> {
        self.emit("get", "get", Some(filter))?;
        Ok(Document::empty())
    }

    fn get_config(&self, datastore: Datastore, filter: &Document) -> DriverResult<Document> {
        self.emit("get-config", &format!("get-config {}", datastore), Some(filter))?;
        Ok(Document::empty())
    }

    fn edit_config(
        &self,
        datastore: Datastore,
        default_operation: DefaultOperation,
        config: &Document,
    ) -> DriverResult<bool> {
        let header = format!(
            "edit-config {} default-operation={}",
            datastore, default_operation
        );
        self.emit("edit-config", &header, Some(config))?;
        Ok(true)
    }

    fn copy_config(&self, target: Datastore, source: Datastore) -> DriverResult<bool> {
        self.emit("copy-config", &format!("copy-config {} <- {}", target, source), None)?;
        Ok(true)
    }
}
