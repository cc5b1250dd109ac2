//! Session Guard - An activity-driven idle session timer
//!
//! This library enforces an idle-timeout policy on an authenticated session:
//! user activity keeps the session alive, a grace-window warning precedes
//! the cutoff, and a forced logout ends the session when nobody responds.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{AuthError, SessionError, SettingsError};
pub use state::{AppState, SessionPhase, SessionSnapshot, SessionTimer};
pub use utils::signals::shutdown_signal;
