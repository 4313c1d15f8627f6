//! Outbound notification seam.
//!
//! The core modules do NOT depend on any delivery channel (mail, chat,
//! push). They only know this trait; the concrete implementation is
//! injected at startup time.

use crate::ServiceError;

/// Pluggable notifier for reminder broadcasts and follow-up messages.
pub trait Notifier: Send + Sync + 'static {
    /// Deliver a message to the configured channel.
    ///
    /// - `subject`: short summary line
    /// - `body`: full message text
    fn notify(&self, subject: &str, body: &str) -> Result<(), ServiceError>;
}

/// Default notifier: records the message in the service log.
/// Used until a real delivery channel is wired in.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), ServiceError> {
        tracing::info!(subject, body, "broadcast");
        Ok(())
    }
}

/// Test notifier that collects every message in memory.
pub struct MemoryNotifier {
    messages: std::sync::Mutex<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            messages: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all delivered (subject, body) pairs.
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<(), ServiceError> {
        self.messages
            .lock()
            .map_err(|_| ServiceError::Internal("notifier mutex poisoned".into()))?
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}
