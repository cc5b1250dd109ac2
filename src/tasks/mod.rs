//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod session_timer;
pub mod settings_refresh;

// Re-export main functions
pub use session_timer::session_timer_task;
pub use settings_refresh::settings_refresh_task;
