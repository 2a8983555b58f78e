//! Logging collaborator injected into the raffle manager.
//!
//! The manager never reaches for a global logger directly: it reports
//! through a [`DrawLog`], so tests can capture or silence the output.

use std::fmt;

/// Sink for the manager's diagnostic messages.
pub trait DrawLog: fmt::Debug + Send + Sync {
    /// Records a debug-level message.
    fn debug(&self, message: &str);
}

/// Default [`DrawLog`] forwarding to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl DrawLog for TracingLog {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "connpass_raffle::raffle", "{message}");
    }
}
