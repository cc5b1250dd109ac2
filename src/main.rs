//! Session Guard - An activity-driven idle session timer
//!
//! This is the main entry point for the session-guard application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use session_guard::{
    api::create_router,
    config::Config,
    services::InMemoryAuth,
    state::AppState,
    tasks::{session_timer_task, settings_refresh_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("session_guard={},tower_http=info", config.log_level()))
        .init();

    info!("Starting session-guard server v{}", env!("CARGO_PKG_VERSION"));
    match &config.settings_file {
        Some(path) => info!(
            "Configuration: host={}, port={}, settings file={} (reload every {}s)",
            config.host,
            config.port,
            path.display(),
            config.settings_ttl().as_secs()
        ),
        None => info!(
            "Configuration: host={}, port={}, timeout={}min, enabled={}",
            config.host, config.port, config.timeout_minutes, !config.disabled
        ),
    }

    let (state, commands) = AppState::new(
        config.port,
        config.host.clone(),
        config.settings_store(),
        Arc::new(InMemoryAuth::new()),
    );
    let state = Arc::new(state);

    // Start the session timer background task
    let timer_task = tokio::spawn(session_timer_task(Arc::clone(&state), commands));

    // Keep file-backed settings fresh
    let refresh_task = tokio::spawn(settings_refresh_task(
        Arc::clone(&state),
        config.settings_ttl(),
    ));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /login     - Start an authenticated session");
    info!("  POST /activity  - Report a user interaction");
    info!("  POST /extend    - Stay logged in");
    info!("  POST /logout    - End the session");
    info!("  GET  /settings  - Show timeout settings");
    info!("  PUT  /settings  - Replace timeout settings");
    info!("  GET  /warning   - Warning dialog state");
    info!("  GET  /status    - Session and server status");
    info!("  GET  /health    - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to install signal handlers: {}", e),
            }
        }
    }

    timer_task.abort();
    refresh_task.abort();

    info!("Server shutdown complete");
    Ok(())
}
