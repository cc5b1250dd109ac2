//! Countdown formatting for the warning dialog

/// Render the grace window countdown.
///
/// From one minute up the text is `M:SS`; below that it is `N seconds`,
/// including `1 seconds`.
pub fn format_remaining(remaining_seconds: u64) -> String {
    if remaining_seconds >= 60 {
        format!("{}:{:02}", remaining_seconds / 60, remaining_seconds % 60)
    } else {
        format!("{} seconds", remaining_seconds)
    }
}
