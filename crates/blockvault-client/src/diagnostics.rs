//! Diagnostics sink handed to the client at construction.

use std::sync::Mutex;

/// Receives the client's debug and info messages.
pub trait Diagnostics: Send + Sync {
    fn debug(&self, operation: &str, message: &str);
    fn info(&self, operation: &str, message: &str);
}

/// Forwards to `tracing` with the operation as a structured field.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, operation: &str, message: &str) {
        tracing::debug!(operation, "{message}");
    }

    fn info(&self, operation: &str, message: &str) {
        tracing::info!(operation, "{message}");
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<(Level, String, String)>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(level, operation, message)` triples, oldest first.
    pub fn entries(&self) -> Vec<(Level, String, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    fn record(&self, level: Level, operation: &str, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, operation.to_string(), message.to_string()));
        }
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn debug(&self, operation: &str, message: &str) {
        self.record(Level::Debug, operation, message);
    }

    fn info(&self, operation: &str, message: &str) {
        self.record(Level::Info, operation, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryDiagnostics::new();
        sink.debug("Create Vault", "PUT /v1.0/vaults/v");
        sink.info("Download File", "done");
        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, Level::Debug);
        assert_eq!(entries[1], (Level::Info, "Download File".into(), "done".into()));
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        TracingDiagnostics.debug("op", "message");
        TracingDiagnostics.info("op", "message");
    }
}
