//! Non-fatal reporting of recovered persistence failures.

use std::sync::Mutex;

use super::PersistError;

/// Write-only sink for failures a [`Persisted`](super::Persisted) cell recovered from.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, failure: &PersistError);
}

/// Sink forwarding failures to the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, failure: &PersistError) {
        log::error!("{}", failure);
    }
}

/// Sink keeping failure descriptions in memory.
///
/// Useful for hosts that surface storage problems in their own UI.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptions reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Remove and return the reported descriptions.
    pub fn take(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, failure: &PersistError) {
        log::warn!("{}", failure);
        match self.messages.lock() {
            Ok(mut guard) => guard.push(failure.to_string()),
            Err(poisoned) => poisoned.into_inner().push(failure.to_string()),
        }
    }
}
