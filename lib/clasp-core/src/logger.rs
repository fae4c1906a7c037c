//! Optional warning sink for non-fatal conditions.

use serde_json::{Map, Value};
use tracing::warn;

/// Receives warnings with a structured context.
///
/// Responses without a logger behave identically, minus the notification.
pub trait Logger: Send + Sync {
    /// Report a warning.
    fn warning(&self, message: &str, context: &Map<String, Value>);
}

/// [`Logger`] that forwards to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warning(&self, message: &str, context: &Map<String, Value>) {
        let context = Value::Object(context.clone());
        warn!(%context, "{message}");
    }
}
