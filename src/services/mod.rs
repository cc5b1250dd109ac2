//! External collaborator module
//!
//! This module contains the authentication backend the timer logs out
//! through and the settings source it reads its timeout from.

pub mod auth;
pub mod settings;

// Re-export main types
pub use auth::{Authenticator, InMemoryAuth};
pub use settings::{load_settings_file, SettingsStore};
