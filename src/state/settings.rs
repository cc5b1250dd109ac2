//! Session timeout settings

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Longest idle budget honoured; larger values are clamped to it
pub const MAX_TIMEOUT_MINUTES: i64 = 60 * 24 * 365;

/// Timeout settings as provided by the settings source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Master switch for the idle timeout
    #[serde(rename = "session_timeout_enabled", alias = "enabled")]
    pub enabled: bool,
    /// Idle budget in minutes
    #[serde(rename = "session_timeout_minutes", alias = "timeout_minutes")]
    pub timeout_minutes: i64,
}

impl SessionSettings {
    pub fn new(enabled: bool, timeout_minutes: i64) -> Self {
        Self {
            enabled,
            timeout_minutes,
        }
    }

    /// The idle budget to enforce, or `None` when the timeout is off.
    ///
    /// A non-positive duration never locks anyone out: it is treated the
    /// same as a disabled timeout.
    pub fn timeout(&self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if self.timeout_minutes <= 0 {
            warn!(
                "Session timeout enabled with non-positive duration ({} min), treating as disabled",
                self.timeout_minutes
            );
            return None;
        }
        let minutes = self.timeout_minutes.min(MAX_TIMEOUT_MINUTES) as u64;
        Some(Duration::from_secs(minutes * 60))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(true, 30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_settings_yield_their_duration() {
        let settings = SessionSettings::new(true, 10);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn disabled_or_non_positive_settings_have_no_timeout() {
        assert_eq!(SessionSettings::new(false, 10).timeout(), None);
        assert_eq!(SessionSettings::new(true, 0).timeout(), None);
        assert_eq!(SessionSettings::new(true, -5).timeout(), None);
    }

    #[test]
    fn huge_durations_are_clamped() {
        let settings = SessionSettings::new(true, i64::MAX);
        assert_eq!(
            settings.timeout(),
            Some(Duration::from_secs(MAX_TIMEOUT_MINUTES as u64 * 60))
        );
    }

    #[test]
    fn parses_both_field_spellings() {
        let long: SessionSettings = serde_json::from_str(
            r#"{"session_timeout_enabled": true, "session_timeout_minutes": 15}"#,
        )
        .unwrap();
        let short: SessionSettings =
            serde_json::from_str(r#"{"enabled": true, "timeout_minutes": 15}"#).unwrap();
        assert_eq!(long, short);
        assert_eq!(long.timeout_minutes, 15);
    }
}
