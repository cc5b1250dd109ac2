//! State management module
//!
//! This module contains the session timer state machine, the observable
//! snapshots it publishes, and the shared application state.

pub mod activity;
pub mod app_state;
pub mod session_timer;
pub mod settings;
pub mod timer_state;

// Re-export main types
pub use activity::{ActivityKind, ActivityListener, ActivityMonitor};
pub use app_state::{AppState, SessionCommand};
pub use session_timer::{
    ActivityOutcome, LogoutReason, SessionId, SessionTimer, TimerKind, ACTIVITY_DEBOUNCE,
    TICK_PERIOD, WARNING_LEAD_TIME,
};
pub use settings::SessionSettings;
pub use timer_state::{SessionPhase, SessionSnapshot, WarningDialog};
