//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{services::SettingsStore, state::SessionSettings};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "session-guard")]
#[command(about = "An activity-driven idle session timer served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Idle timeout in minutes
    #[arg(short, long, default_value = "30")]
    pub timeout_minutes: i64,

    /// Start with the idle timeout switched off
    #[arg(long)]
    pub disabled: bool,

    /// JSON file to read timeout settings from (overrides --timeout-minutes)
    #[arg(long)]
    pub settings_file: Option<PathBuf>,

    /// Seconds between settings file reloads
    #[arg(long, default_value = "60")]
    pub settings_ttl: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Settings given on the command line
    pub fn initial_settings(&self) -> SessionSettings {
        SessionSettings::new(!self.disabled, self.timeout_minutes)
    }

    /// Build the settings source: the file when one is given, else the CLI values
    pub fn settings_store(&self) -> SettingsStore {
        match &self.settings_file {
            Some(path) => SettingsStore::from_file(path),
            None => SettingsStore::loaded(self.initial_settings()),
        }
    }

    /// Reload period for the settings file, at least one second
    pub fn settings_ttl(&self) -> Duration {
        Duration::from_secs(self.settings_ttl.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["session-guard"]).unwrap();
        assert_eq!(config.address(), "0.0.0.0:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.initial_settings(), SessionSettings::new(true, 30));
        assert_eq!(config.settings_store().current(), Some(SessionSettings::new(true, 30)));
    }

    #[test]
    fn disabled_flag_and_timeout() {
        let config =
            Config::try_parse_from(["session-guard", "--disabled", "-t", "5", "-v"]).unwrap();
        assert_eq!(config.initial_settings(), SessionSettings::new(false, 5));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn settings_file_starts_unloaded() {
        let config = Config::try_parse_from([
            "session-guard",
            "--settings-file",
            "/tmp/settings.json",
            "--settings-ttl",
            "0",
        ])
        .unwrap();
        let store = config.settings_store();
        assert_eq!(store.current(), None);
        assert_eq!(config.settings_ttl(), Duration::from_secs(1));
    }
}
