//! Session timer background task
//!
//! Owns the [`SessionTimer`] and drives it from one event loop: auth and
//! settings changes, commands from the HTTP layer, activity reports and timer
//! expiries are handled strictly one at a time.

use std::{future::pending, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{sleep_until, Instant},
};
use tracing::{debug, error, info};

use crate::state::{
    ActivityKind, ActivityListener, ActivityOutcome, AppState, LogoutReason, SessionCommand,
    SessionId, SessionSettings, SessionSnapshot, SessionTimer, TimerKind,
};

/// Outcome of one loop iteration
#[derive(Default)]
struct Step {
    logout: Option<LogoutReason>,
    reply: Option<oneshot::Sender<SessionSnapshot>>,
}

/// Background task that enforces the idle timeout for the current session
pub async fn session_timer_task(state: Arc<AppState>, mut commands: mpsc::Receiver<SessionCommand>) {
    info!("Starting session timer task");

    let mut timer = SessionTimer::new();
    let mut session_rx = state.auth.session();
    let mut settings_rx = state.settings.subscribe();
    let mut listener: Option<ActivityListener> = None;

    apply_inputs(&mut timer, &mut session_rx, &mut settings_rx);
    sync_listener(&timer, &mut listener, &state);
    state.publish(timer.snapshot());

    loop {
        let next = timer.next_timer();

        let step = tokio::select! {
            changed = session_rx.changed() => {
                if changed.is_err() {
                    info!("Authentication source closed, stopping session timer");
                    break;
                }
                apply_inputs(&mut timer, &mut session_rx, &mut settings_rx);
                Step::default()
            }

            changed = settings_rx.changed() => {
                if changed.is_err() {
                    info!("Settings source closed, stopping session timer");
                    break;
                }
                apply_inputs(&mut timer, &mut session_rx, &mut settings_rx);
                Step::default()
            }

            command = commands.recv() => {
                let Some(command) = command else {
                    info!("Command channel closed, stopping session timer");
                    break;
                };
                match command {
                    SessionCommand::Extend { reply } => {
                        timer.extend_session(Instant::now());
                        Step { logout: None, reply: Some(reply) }
                    }
                    SessionCommand::Logout { reply } => Step {
                        logout: timer.request_logout(LogoutReason::UserRequested),
                        reply: Some(reply),
                    },
                }
            }

            kind = next_activity(&mut listener) => {
                match timer.record_activity(kind, Instant::now()) {
                    ActivityOutcome::Reset => debug!("Idle clock reset by {:?}", kind),
                    outcome => debug!("Activity {:?} not counted: {:?}", kind, outcome),
                }
                Step::default()
            }

            (at, kind) = expiry(next) => {
                debug!("Timer fired: {:?}", kind);
                Step { logout: timer.fire(kind, at), reply: None }
            }
        };

        sync_listener(&timer, &mut listener, &state);
        let snapshot = timer.snapshot();
        state.publish(snapshot.clone());

        if let Some(reply) = step.reply {
            // The caller may have gone away; the transition stands either way
            let _ = reply.send(snapshot);
        }
        if let Some(reason) = step.logout {
            perform_logout(&state, reason).await;
        }
    }

    drop(listener);
    state.publish(SessionSnapshot::disabled());
    info!("Session timer task stopped");
}

fn apply_inputs(
    timer: &mut SessionTimer,
    session_rx: &mut watch::Receiver<Option<SessionId>>,
    settings_rx: &mut watch::Receiver<Option<SessionSettings>>,
) {
    let session = *session_rx.borrow_and_update();
    let settings = *settings_rx.borrow_and_update();
    if settings.is_none() {
        debug!("Settings still loading, session timer held disabled");
    }
    timer.configure(session, settings, Instant::now());
}

/// Hold an activity listener exactly while the timer is armed
fn sync_listener(timer: &SessionTimer, listener: &mut Option<ActivityListener>, state: &AppState) {
    let armed = timer.phase().is_armed();
    if armed && listener.is_none() {
        debug!("Registering activity listener");
        *listener = Some(state.activity.listen());
    } else if !armed && listener.is_some() {
        debug!("Releasing activity listener");
        *listener = None;
    }
}

async fn next_activity(listener: &mut Option<ActivityListener>) -> ActivityKind {
    if let Some(listener) = listener {
        if let Some(kind) = listener.recv().await {
            return kind;
        }
    }
    pending().await
}

async fn expiry(next: Option<(Instant, TimerKind)>) -> (Instant, TimerKind) {
    match next {
        Some((at, kind)) => {
            sleep_until(at).await;
            (at, kind)
        }
        None => pending().await,
    }
}

async fn perform_logout(state: &AppState, reason: LogoutReason) {
    info!("Logging out session ({})", reason);
    if let Err(e) = state.auth.logout().await {
        // The clock is already stopped; retrying belongs to the auth backend
        error!("Logout failed ({}): {}", reason, e);
    }
}
