//! User activity events and listener registration

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Interaction kinds that count as user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    KeyDown,
    Scroll,
    TouchStart,
    PointerMove,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::PointerDown,
        ActivityKind::KeyDown,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::PointerMove,
    ];
}

/// Fan-out point for activity reports
///
/// Reports are dropped when nobody listens, which is the case whenever the
/// session timer is not armed.
#[derive(Debug)]
pub struct ActivityMonitor {
    tx: broadcast::Sender<ActivityKind>,
    listeners: Arc<AtomicUsize>,
}

impl ActivityMonitor {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            listeners: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report an interaction. Returns whether any listener received it.
    pub fn report(&self, kind: ActivityKind) -> bool {
        match self.tx.send(kind) {
            Ok(_) => true,
            Err(_) => {
                debug!("Activity {:?} dropped, no listener registered", kind);
                false
            }
        }
    }

    /// Register a listener. It stays registered until the returned guard drops.
    pub fn listen(&self) -> ActivityListener {
        self.listeners.fetch_add(1, Ordering::SeqCst);
        ActivityListener {
            rx: self.tx.subscribe(),
            listeners: Arc::clone(&self.listeners),
        }
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

impl Default for ActivityMonitor {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Registered activity listener; deregisters on drop
#[derive(Debug)]
pub struct ActivityListener {
    rx: broadcast::Receiver<ActivityKind>,
    listeners: Arc<AtomicUsize>,
}

impl ActivityListener {
    /// Wait for the next interaction, or `None` once the monitor is gone.
    pub async fn recv(&mut self) -> Option<ActivityKind> {
        loop {
            match self.rx.recv().await {
                Ok(kind) => return Some(kind),
                // Bursts of pointer moves overflow the buffer; any survivor is enough
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Activity listener lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for ActivityListener {
    fn drop(&mut self) {
        self.listeners.fetch_sub(1, Ordering::SeqCst);
    }
}
