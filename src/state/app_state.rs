//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::{ActivityKind, ActivityMonitor, SessionSnapshot};
use crate::{
    error::SessionError,
    services::{Authenticator, SettingsStore},
};

/// Requests handled by the session timer task
#[derive(Debug)]
pub enum SessionCommand {
    /// Re-arm the full timeout window
    Extend { reply: oneshot::Sender<SessionSnapshot> },
    /// End the session on the user's request
    Logout { reply: oneshot::Sender<SessionSnapshot> },
}

/// Shared state between the HTTP handlers and the session timer task
pub struct AppState {
    /// Timeout settings source
    pub settings: SettingsStore,
    /// Authentication collaborator
    pub auth: Arc<dyn Authenticator>,
    /// Activity fan-out; the timer task listens while armed
    pub activity: ActivityMonitor,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    command_tx: mpsc::Sender<SessionCommand>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl AppState {
    /// Create the state together with the command receiver for the timer task
    pub fn new(
        port: u16,
        host: String,
        settings: SettingsStore,
        auth: Arc<dyn Authenticator>,
    ) -> (Self, mpsc::Receiver<SessionCommand>) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::disabled());

        let state = Self {
            settings,
            auth,
            activity: ActivityMonitor::default(),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            command_tx,
            snapshot_tx,
        };
        (state, command_rx)
    }

    /// Record the last action for status reporting
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Forward a user interaction to the timer. Returns whether it was delivered.
    pub fn report_activity(&self, kind: ActivityKind) -> bool {
        self.activity.report(kind)
    }

    /// Ask the timer task to extend the session
    pub async fn extend_session(&self) -> Result<SessionSnapshot, SessionError> {
        self.record_action("extend");
        self.send_command(|reply| SessionCommand::Extend { reply }).await
    }

    /// Ask the timer task to end the session
    pub async fn logout(&self) -> Result<SessionSnapshot, SessionError> {
        self.record_action("logout");
        self.send_command(|reply| SessionCommand::Logout { reply }).await
    }

    async fn send_command<F>(&self, build: F) -> Result<SessionSnapshot, SessionError>
    where
        F: FnOnce(oneshot::Sender<SessionSnapshot>) -> SessionCommand,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| SessionError::TimerUnavailable)?;
        reply_rx.await.map_err(|_| SessionError::TimerUnavailable)
    }

    /// Publish a new timer snapshot
    pub fn publish(&self, snapshot: SessionSnapshot) {
        let changed = self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        if changed {
            debug!("Session snapshot updated");
        }
    }

    /// Latest published timer snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Watch timer snapshots as they change
    pub fn subscribe_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Whether the timer task is still accepting commands
    pub fn timer_running(&self) -> bool {
        let running = !self.command_tx.is_closed();
        if !running {
            warn!("Session timer task is not running");
        }
        running
    }
}
