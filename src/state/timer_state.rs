//! Observable session timer state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::format_remaining;

/// Lifecycle phase of the idle session timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Not counting: unauthenticated, timeout disabled, or settings still loading
    Disabled,
    /// Counting down towards the warning (or the deadline), warning hidden
    Idle,
    /// Grace window: dialog visible, counting down to forced logout
    Warning,
    /// Logout has been requested; waiting for a fresh session
    Terminated,
}

impl SessionPhase {
    /// Whether the timer is armed and listening for activity
    pub fn is_armed(&self) -> bool {
        matches!(self, SessionPhase::Idle | SessionPhase::Warning)
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionPhase::Disabled => "disabled",
            SessionPhase::Idle => "idle",
            SessionPhase::Warning => "warning",
            SessionPhase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Props handed to the warning dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningDialog {
    pub open: bool,
    pub remaining_seconds: u64,
    /// Countdown text, `M:SS` from one minute up and `N seconds` below
    pub display: String,
}

impl WarningDialog {
    /// A dialog showing `remaining_seconds` of the grace window
    pub fn visible(remaining_seconds: u64) -> Self {
        Self {
            open: true,
            remaining_seconds,
            display: format_remaining(remaining_seconds),
        }
    }

    /// A closed dialog
    pub fn hidden() -> Self {
        Self {
            open: false,
            remaining_seconds: 0,
            display: String::new(),
        }
    }
}

impl Default for WarningDialog {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Snapshot of the session timer published after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub warning: WarningDialog,
    /// Idle budget the timer is armed with
    pub timeout_seconds: Option<u64>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// Snapshot of a timer that has never been armed
    pub fn disabled() -> Self {
        Self {
            phase: SessionPhase::Disabled,
            warning: WarningDialog::hidden(),
            timeout_seconds: None,
            last_activity_at: None,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_dialog_formats_its_countdown() {
        let dialog = WarningDialog::visible(125);
        assert!(dialog.open);
        assert_eq!(dialog.display, "2:05");
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&SessionPhase::Terminated).unwrap();
        assert_eq!(json, "\"terminated\"");
        assert!(SessionPhase::Warning.is_armed());
        assert!(!SessionPhase::Terminated.is_armed());
    }
}
