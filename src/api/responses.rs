//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{ActivityKind, SessionSettings, SessionSnapshot, WarningDialog};

/// API response for session commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, session: SessionSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// Create a success response
    pub fn ok(message: String, session: SessionSnapshot) -> Self {
        Self::new("ok", message, session)
    }
}

/// Body of `POST /activity`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub kind: ActivityKind,
}

/// Response to `POST /activity`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    /// Whether an armed timer was listening
    pub delivered: bool,
    pub timestamp: DateTime<Utc>,
}

/// Response to `POST /login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: u64,
    pub timestamp: DateTime<Utc>,
}

/// Response to the settings endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    /// `None` while the settings source has not loaded yet
    pub settings: Option<SessionSettings>,
    pub loaded: bool,
    /// Whether these settings arm the idle timeout
    pub effective: bool,
    pub timestamp: DateTime<Utc>,
}

impl SettingsResponse {
    pub fn new(settings: Option<SessionSettings>) -> Self {
        Self {
            settings,
            loaded: settings.is_some(),
            effective: settings.and_then(|s| s.timeout()).is_some(),
            timestamp: Utc::now(),
        }
    }
}

/// Props for the warning dialog, with the actions it may call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningResponse {
    #[serde(flatten)]
    pub dialog: WarningDialog,
    pub extend_url: String,
    pub logout_url: String,
}

impl WarningResponse {
    pub fn new(dialog: WarningDialog) -> Self {
        Self {
            dialog,
            extend_url: "/extend".to_string(),
            logout_url: "/logout".to_string(),
        }
    }
}

/// Full status with session and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionSnapshot,
    pub authenticated: bool,
    pub settings: Option<SessionSettings>,
    pub timer_running: bool,
    pub activity_listeners: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
