//! Wakeup channel for hosts that re-render on change.
//!
//! Components write their observable outputs into [`State`](crate::state::State)
//! or [`Resource`](crate::resource::Resource) cells. When one of those cells
//! changes outside the host's own call stack (a debounce timer firing, a
//! background load finishing), a wakeup signal tells the host to read again.

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sender half of the wakeup channel.
#[derive(Clone, Debug)]
pub struct WakeupSender {
    tx: mpsc::Sender<()>,
}

impl WakeupSender {
    /// Send a wakeup signal.
    ///
    /// Non-blocking. Errors are ignored (full buffer already means a pending
    /// wakeup, dropped receiver means the host is gone).
    pub fn send(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Receiver half of the wakeup channel.
#[derive(Debug)]
pub struct WakeupReceiver {
    rx: mpsc::Receiver<()>,
}

impl WakeupReceiver {
    /// Wait for a wakeup signal.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Check for a wakeup without waiting.
    pub fn try_recv(&mut self) -> bool {
        self.rx.try_recv().is_ok()
    }

    /// Drain all pending wakeup signals.
    ///
    /// Multiple buffered wakeups collapse into a single re-render.
    pub fn drain(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Create a new wakeup channel pair.
pub fn channel() -> (WakeupSender, WakeupReceiver) {
    let (tx, rx) = mpsc::channel(16);
    (WakeupSender { tx }, WakeupReceiver { rx })
}

/// Slot for a wakeup sender that the host installs after construction.
///
/// All clones share the same slot.
#[derive(Debug, Default, Clone)]
pub struct WakeupHandle {
    inner: Arc<Mutex<Option<WakeupSender>>>,
}

impl WakeupHandle {
    /// Create a new empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a wakeup sender.
    pub fn install(&self, sender: WakeupSender) {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(sender);
        }
    }

    /// Send a wakeup signal if a sender is installed.
    pub fn send(&self) {
        if let Ok(guard) = self.inner.lock()
            && let Some(sender) = guard.as_ref()
        {
            sender.send();
        }
    }
}
