//! Settings collaborator: timeout settings with an optional file source

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::{error::SettingsError, state::SessionSettings};

/// Holds the current timeout settings and publishes changes.
///
/// The published value is `None` until settings are loaded; the session
/// timer stays disabled while it is.
#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<Option<SessionSettings>>,
    source: Option<PathBuf>,
}

impl SettingsStore {
    /// A store with settings available immediately
    pub fn loaded(settings: SessionSettings) -> Self {
        let (tx, _) = watch::channel(Some(settings));
        Self { tx, source: None }
    }

    /// A store that starts unloaded and reads `path` on refresh
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            source: Some(path.into()),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Current settings, `None` while loading
    pub fn current(&self) -> Option<SessionSettings> {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionSettings>> {
        self.tx.subscribe()
    }

    /// Replace the settings. Returns whether anything changed.
    pub fn update(&self, settings: SessionSettings) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == Some(settings) {
                false
            } else {
                *current = Some(settings);
                true
            }
        });
        if changed {
            info!(
                "Session timeout settings updated: enabled={}, minutes={}",
                settings.enabled, settings.timeout_minutes
            );
        }
        changed
    }

    /// Re-read the settings file. Returns whether the settings changed.
    ///
    /// On failure the last good settings stay in place.
    pub async fn refresh(&self) -> Result<bool, SettingsError> {
        let path = self.source.as_deref().ok_or(SettingsError::NoSource)?;
        let settings = load_settings_file(path).await?;
        let changed = self.update(settings);
        if !changed {
            debug!("Settings file {} unchanged", path.display());
        }
        Ok(changed)
    }
}

/// Read timeout settings from a JSON file
pub async fn load_settings_file(path: &Path) -> Result<SessionSettings, SettingsError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&raw).map_err(|source| SettingsError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
