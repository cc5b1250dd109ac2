//! Settings refresh background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::state::AppState;

/// Background task that re-reads the settings file every `period`.
///
/// The first read happens immediately; until it succeeds the settings stay
/// unloaded and the session timer stays disabled.
pub async fn settings_refresh_task(state: Arc<AppState>, period: Duration) {
    let Some(path) = state.settings.source().map(|p| p.display().to_string()) else {
        info!("No settings file configured, settings refresh task not needed");
        return;
    };
    info!("Starting settings refresh task for {} every {:?}", path, period);

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match state.settings.refresh().await {
            Ok(true) => info!("Reloaded session settings from {}", path),
            Ok(false) => {}
            Err(e) => warn!("Failed to refresh session settings: {}", e),
        }
    }
}
