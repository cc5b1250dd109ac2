//! Error types for session-guard operations

use std::path::PathBuf;

/// Failures reported by the authentication collaborator
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login failed: {0}")]
    Login(String),

    #[error("logout failed: {0}")]
    Logout(String),
}

/// Failures loading timeout settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no settings file configured")]
    NoSource,

    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failures talking to the session timer task
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session timer task is not running")]
    TimerUnavailable,
}
