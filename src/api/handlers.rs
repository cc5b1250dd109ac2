//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::state::{AppState, SessionSettings};
use super::responses::{
    ActivityRequest, ActivityResponse, ApiResponse, HealthResponse, LoginResponse,
    SettingsResponse, StatusResponse, WarningResponse,
};

/// Handle POST /login - Start an authenticated session
pub async fn login_handler(State(state): State<Arc<AppState>>) -> Result<Json<LoginResponse>, StatusCode> {
    state.record_action("login");
    match state.auth.login().await {
        Ok(session_id) => {
            info!("Login endpoint called - session {} started", session_id);
            Ok(Json(LoginResponse {
                session_id,
                timestamp: Utc::now(),
            }))
        }
        Err(e) => {
            error!("Login failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /activity - Report a user interaction
pub async fn activity_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActivityRequest>,
) -> Json<ActivityResponse> {
    let delivered = state.report_activity(request.kind);
    debug!("Activity {:?} reported (delivered={})", request.kind, delivered);
    Json(ActivityResponse {
        delivered,
        timestamp: Utc::now(),
    })
}

/// Handle POST /extend - Stay logged in
pub async fn extend_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.extend_session().await {
        Ok(session) => {
            info!("Extend endpoint called - session now {}", session.phase);
            Ok(Json(ApiResponse::ok("Session extended".to_string(), session)))
        }
        Err(e) => {
            error!("Failed to extend session: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /logout - End the session now
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.logout().await {
        Ok(session) => {
            info!("Logout endpoint called - session now {}", session.phase);
            Ok(Json(ApiResponse::ok("Logout requested".to_string(), session)))
        }
        Err(e) => {
            error!("Failed to request logout: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /settings - Current timeout settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Json<SettingsResponse> {
    Json(SettingsResponse::new(state.settings.current()))
}

/// Handle PUT /settings - Replace timeout settings
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<SessionSettings>,
) -> Result<Json<SettingsResponse>, StatusCode> {
    if let Some(path) = state.settings.source() {
        warn!("Rejecting settings update, settings are managed by {}", path.display());
        return Err(StatusCode::CONFLICT);
    }

    state.record_action("settings");
    state.settings.update(settings);
    Ok(Json(SettingsResponse::new(state.settings.current())))
}

/// Handle GET /warning - Warning dialog props
pub async fn warning_handler(State(state): State<Arc<AppState>>) -> Json<WarningResponse> {
    Json(WarningResponse::new(state.snapshot().warning))
}

/// Handle GET /status - Return current session status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        session: state.snapshot(),
        authenticated: state.auth.is_authenticated(),
        settings: state.settings.current(),
        timer_running: state.timer_running(),
        activity_listeners: state.activity.listener_count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::{
        services::{InMemoryAuth, SettingsStore},
        state::{ActivityKind, SessionCommand, SessionPhase},
        tasks::session_timer_task,
    };

    fn app_state(settings: SettingsStore) -> (Arc<AppState>, mpsc::Receiver<SessionCommand>) {
        let (state, commands) = AppState::new(
            20554,
            "127.0.0.1".to_string(),
            settings,
            Arc::new(InMemoryAuth::new()),
        );
        (Arc::new(state), commands)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn login_then_status_reports_an_armed_timer() {
        let (state, commands) = app_state(SettingsStore::loaded(SessionSettings::new(true, 10)));
        tokio::spawn(session_timer_task(Arc::clone(&state), commands));

        let Json(login) = login_handler(State(Arc::clone(&state))).await.unwrap();
        assert_eq!(login.session_id, 1);
        settle().await;

        let Json(status) = status_handler(State(Arc::clone(&state))).await;
        assert!(status.authenticated);
        assert!(status.timer_running);
        assert_eq!(status.session.phase, SessionPhase::Idle);
        assert_eq!(status.session.timeout_seconds, Some(600));
        assert_eq!(status.activity_listeners, 1);
        assert_eq!(status.last_action.as_deref(), Some("login"));
    }

    #[tokio::test(start_paused = true)]
    async fn activity_is_only_delivered_while_armed() {
        let (state, commands) = app_state(SettingsStore::loaded(SessionSettings::new(true, 10)));
        tokio::spawn(session_timer_task(Arc::clone(&state), commands));
        settle().await;

        let request = ActivityRequest { kind: ActivityKind::KeyDown };
        let Json(before) = activity_handler(State(Arc::clone(&state)), Json(request)).await;
        assert!(!before.delivered);

        login_handler(State(Arc::clone(&state))).await.unwrap();
        settle().await;
        let Json(after) = activity_handler(State(Arc::clone(&state)), Json(request)).await;
        assert!(after.delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn warning_endpoint_exposes_dialog_props() {
        let (state, commands) = app_state(SettingsStore::loaded(SessionSettings::new(true, 3)));
        tokio::spawn(session_timer_task(Arc::clone(&state), commands));
        login_handler(State(Arc::clone(&state))).await.unwrap();
        settle().await;

        let Json(hidden) = warning_handler(State(Arc::clone(&state))).await;
        assert!(!hidden.dialog.open);

        tokio::time::sleep(std::time::Duration::from_millis(60_500)).await;
        settle().await;
        let Json(shown) = warning_handler(State(Arc::clone(&state))).await;
        assert!(shown.dialog.open);
        assert_eq!(shown.dialog.remaining_seconds, 120);
        assert_eq!(shown.dialog.display, "2:00");
        assert_eq!(shown.extend_url, "/extend");

        let Json(extended) = extend_handler(State(Arc::clone(&state))).await.unwrap();
        assert_eq!(extended.session.phase, SessionPhase::Idle);
        assert!(!extended.session.warning.open);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_endpoint_ends_the_session() {
        let (state, commands) = app_state(SettingsStore::loaded(SessionSettings::new(true, 10)));
        tokio::spawn(session_timer_task(Arc::clone(&state), commands));
        login_handler(State(Arc::clone(&state))).await.unwrap();
        settle().await;

        let Json(response) = logout_handler(State(Arc::clone(&state))).await.unwrap();
        assert_eq!(response.session.phase, SessionPhase::Terminated);
        settle().await;
        assert!(!state.auth.is_authenticated());
    }

    #[tokio::test]
    async fn commands_fail_without_a_timer_task() {
        let (state, commands) = app_state(SettingsStore::loaded(SessionSettings::default()));
        drop(commands);

        assert_eq!(
            extend_handler(State(Arc::clone(&state))).await.unwrap_err(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            logout_handler(State(state)).await.unwrap_err(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn settings_can_be_replaced_unless_file_backed() {
        let (state, _commands) = app_state(SettingsStore::loaded(SessionSettings::new(true, 10)));
        let Json(updated) =
            put_settings_handler(State(Arc::clone(&state)), Json(SessionSettings::new(true, 0)))
                .await
                .unwrap();
        assert!(updated.loaded);
        assert!(!updated.effective);

        let Json(current) = get_settings_handler(State(state)).await;
        assert_eq!(current.settings, Some(SessionSettings::new(true, 0)));

        let (file_state, _commands) = app_state(SettingsStore::from_file("/etc/session-guard.json"));
        let Json(unloaded) = get_settings_handler(State(Arc::clone(&file_state))).await;
        assert!(!unloaded.loaded);
        assert_eq!(
            put_settings_handler(State(file_state), Json(SessionSettings::default()))
                .await
                .unwrap_err(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(health) = health_handler().await;
        assert_eq!(health.status, "ok");
    }
}
