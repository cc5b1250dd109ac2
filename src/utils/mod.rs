//! Utility functions module
//!
//! Countdown formatting and process signal handling.

pub mod format;
pub mod signals;

// Re-export main functions
pub use format::format_remaining;
pub use signals::shutdown_signal;
