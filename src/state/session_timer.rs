//! Activity-driven idle session timer
//!
//! The timer is a plain state machine: callers feed it configuration,
//! activity, commands and timer expiries together with the current instant,
//! and ask it when the next timer is due. It never sleeps or spawns anything
//! itself, so the owning task decides how time passes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::{debug, info};

use super::{
    ActivityKind, SessionPhase, SessionSettings, SessionSnapshot, WarningDialog,
};

/// Grace window shown before the deadline. Not configurable.
pub const WARNING_LEAD_TIME: Duration = Duration::from_secs(120);

/// Countdown tick period while the warning is visible
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Minimum spacing between activity events that reset the clock
pub const ACTIVITY_DEBOUNCE: Duration = Duration::from_secs(1);

/// Identifier of an authenticated session, issued by the auth collaborator
pub type SessionId = u64;

/// Which pending timer fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Absolute deadline, only armed when the warning phase is skipped
    Deadline,
    /// Start of the grace window
    Warning,
    /// One second of the grace window countdown
    Tick,
}

/// Why a logout was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The idle budget ran out
    Expired,
    /// The user asked to end the session
    UserRequested,
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogoutReason::Expired => f.write_str("idle timeout expired"),
            LogoutReason::UserRequested => f.write_str("user requested"),
        }
    }
}

/// What happened to a reported activity event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// The idle clock restarted
    Reset,
    /// Less than [`ACTIVITY_DEBOUNCE`] since the last recorded activity
    Debounced,
    /// The warning is visible; only an explicit extend dismisses it
    IgnoredDuringWarning,
    /// The timer is not armed
    Inactive,
}

/// Handles of the timers the machine may have pending
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct PendingTimers {
    deadline: Option<Instant>,
    warning: Option<Instant>,
    tick: Option<Instant>,
}

impl PendingTimers {
    fn cancel_all(&mut self) {
        *self = Self::default();
    }

    fn count(&self) -> usize {
        [self.deadline, self.warning, self.tick]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }

    fn next(&self) -> Option<(Instant, TimerKind)> {
        [
            (self.deadline, TimerKind::Deadline),
            (self.warning, TimerKind::Warning),
            (self.tick, TimerKind::Tick),
        ]
        .into_iter()
        .filter_map(|(at, kind)| at.map(|at| (at, kind)))
        .min_by_key(|(at, _)| *at)
    }
}

/// The idle session timer state machine
#[derive(Debug)]
pub struct SessionTimer {
    phase: SessionPhase,
    /// Idle budget of the current cycle
    timeout: Option<Duration>,
    /// Latest authenticated session seen, `None` while logged out
    session: Option<SessionId>,
    last_activity_at: Option<Instant>,
    last_activity_wall: Option<DateTime<Utc>>,
    remaining_seconds: u64,
    timers: PendingTimers,
    /// Single-shot guard around the external logout
    logout_requested: bool,
}

impl SessionTimer {
    /// Create a disabled timer
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Disabled,
            timeout: None,
            session: None,
            last_activity_at: None,
            last_activity_wall: None,
            remaining_seconds: 0,
            timers: PendingTimers::default(),
            logout_requested: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Seconds left in the grace window, zero unless the warning is visible
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_warning_visible(&self) -> bool {
        self.phase == SessionPhase::Warning
    }

    pub fn last_activity_at(&self) -> Option<Instant> {
        self.last_activity_at
    }

    /// Number of timers currently pending
    pub fn pending_timers(&self) -> usize {
        self.timers.count()
    }

    /// The earliest pending timer, if any
    pub fn next_timer(&self) -> Option<(Instant, TimerKind)> {
        self.timers.next()
    }

    /// Apply the current authentication and settings inputs.
    ///
    /// `settings` is `None` while the settings source is still loading. Any
    /// change of session or idle budget tears down the schedule and starts a
    /// fresh cycle; unchanged inputs leave a running cycle alone. A terminated
    /// session stays terminated until the session itself changes.
    pub fn configure(
        &mut self,
        session: Option<SessionId>,
        settings: Option<SessionSettings>,
        now: Instant,
    ) {
        let session_changed = self.session != session;
        self.session = session;

        let timeout = match (session, settings.and_then(|s| s.timeout())) {
            (Some(_), Some(timeout)) => timeout,
            _ => {
                if session.is_none() || self.phase != SessionPhase::Terminated {
                    self.disable();
                }
                return;
            }
        };

        match self.phase {
            SessionPhase::Terminated if !session_changed => {
                debug!("Session already terminated, waiting for a new session");
            }
            SessionPhase::Idle | SessionPhase::Warning
                if !session_changed && self.timeout == Some(timeout) =>
            {
                debug!("Session timer configuration unchanged");
            }
            _ => {
                info!(
                    "Arming session timer: {}s idle budget, {}s warning lead",
                    timeout.as_secs(),
                    WARNING_LEAD_TIME.as_secs()
                );
                self.timeout = Some(timeout);
                self.logout_requested = false;
                self.restart(now);
            }
        }
    }

    /// Re-arm the full timeout window from `now`, dismissing any warning.
    ///
    /// Returns `false` when the timer is not armed.
    pub fn extend_session(&mut self, now: Instant) -> bool {
        if !self.phase.is_armed() {
            debug!("Extend ignored in {} phase", self.phase);
            return false;
        }
        info!("Session extended");
        self.restart(now);
        true
    }

    /// Handle a user interaction
    pub fn record_activity(&mut self, kind: ActivityKind, now: Instant) -> ActivityOutcome {
        match self.phase {
            SessionPhase::Idle => {}
            SessionPhase::Warning => return ActivityOutcome::IgnoredDuringWarning,
            SessionPhase::Disabled | SessionPhase::Terminated => return ActivityOutcome::Inactive,
        }

        if let Some(last) = self.last_activity_at {
            if now.saturating_duration_since(last) < ACTIVITY_DEBOUNCE {
                return ActivityOutcome::Debounced;
            }
        }

        debug!("Activity {:?} resets the idle clock", kind);
        self.restart(now);
        ActivityOutcome::Reset
    }

    /// Stop the clock and hide the warning.
    ///
    /// Returns the reason when the caller must perform the external logout;
    /// repeated requests within the same cycle return `None`.
    pub fn request_logout(&mut self, reason: LogoutReason) -> Option<LogoutReason> {
        if self.session.is_none() {
            debug!("Logout ignored, no authenticated session");
            return None;
        }
        self.timers.cancel_all();
        self.remaining_seconds = 0;
        self.phase = SessionPhase::Terminated;

        if self.logout_requested {
            debug!("Logout already requested, ignoring ({})", reason);
            return None;
        }
        info!("Session terminated: {}", reason);
        self.logout_requested = true;
        Some(reason)
    }

    /// Handle an expired timer scheduled for `at`.
    ///
    /// Timers that are no longer pending are ignored. Returns a logout reason
    /// when the expiry ends the session.
    pub fn fire(&mut self, kind: TimerKind, at: Instant) -> Option<LogoutReason> {
        match kind {
            TimerKind::Warning => {
                self.timers.warning?;
                self.timers.cancel_all();
                self.phase = SessionPhase::Warning;
                self.remaining_seconds = WARNING_LEAD_TIME.as_secs();
                self.timers.tick = Some(at + TICK_PERIOD);
                info!(
                    "Session idle, showing warning with {}s remaining",
                    self.remaining_seconds
                );
                None
            }
            TimerKind::Tick => {
                let scheduled = self.timers.tick?;
                if self.remaining_seconds <= 1 {
                    return self.request_logout(LogoutReason::Expired);
                }
                self.remaining_seconds -= 1;
                self.timers.tick = Some(scheduled + TICK_PERIOD);
                debug!("Warning countdown: {}s", self.remaining_seconds);
                None
            }
            TimerKind::Deadline => {
                self.timers.deadline?;
                self.request_logout(LogoutReason::Expired)
            }
        }
    }

    /// Observable state for the presentation layer
    pub fn snapshot(&self) -> SessionSnapshot {
        let warning = if self.is_warning_visible() {
            WarningDialog::visible(self.remaining_seconds)
        } else {
            WarningDialog::hidden()
        };
        SessionSnapshot {
            phase: self.phase,
            warning,
            timeout_seconds: self
                .timeout
                .filter(|_| self.phase != SessionPhase::Disabled)
                .map(|t| t.as_secs()),
            last_activity_at: self.last_activity_wall,
        }
    }

    fn restart(&mut self, now: Instant) {
        self.timers.cancel_all();
        self.phase = SessionPhase::Idle;
        self.remaining_seconds = 0;
        self.last_activity_at = Some(now);
        self.last_activity_wall = Some(Utc::now());

        let Some(timeout) = self.timeout else {
            return;
        };
        match timeout.checked_sub(WARNING_LEAD_TIME) {
            Some(offset) if !offset.is_zero() => {
                self.timers.warning = Some(now + offset);
            }
            _ => {
                // Timeout no longer than the grace window: no warning phase
                self.timers.deadline = Some(now + timeout);
            }
        }
    }

    fn disable(&mut self) {
        if self.phase != SessionPhase::Disabled {
            info!("Session timer disabled (was {})", self.phase);
        }
        self.timers.cancel_all();
        self.phase = SessionPhase::Disabled;
        self.timeout = None;
        self.remaining_seconds = 0;
        self.last_activity_at = None;
        self.last_activity_wall = None;
        self.logout_requested = false;
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}
