//! Authentication collaborator

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use crate::{error::AuthError, state::SessionId};

/// Authentication backend the session timer logs out through
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Watch the current session, `None` while unauthenticated
    fn session(&self) -> watch::Receiver<Option<SessionId>>;

    /// Start a new authenticated session
    async fn login(&self) -> Result<SessionId, AuthError>;

    /// End the current session
    async fn logout(&self) -> Result<(), AuthError>;

    /// Whether a session is currently authenticated
    fn is_authenticated(&self) -> bool {
        self.session().borrow().is_some()
    }
}

/// Process-local authentication state
#[derive(Debug)]
pub struct InMemoryAuth {
    session_tx: watch::Sender<Option<SessionId>>,
    next_session: AtomicU64,
    logouts: AtomicU64,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            session_tx,
            next_session: AtomicU64::new(1),
            logouts: AtomicU64::new(0),
        }
    }

    /// Number of logouts performed so far
    pub fn logout_count(&self) -> u64 {
        self.logouts.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for InMemoryAuth {
    fn session(&self) -> watch::Receiver<Option<SessionId>> {
        self.session_tx.subscribe()
    }

    async fn login(&self) -> Result<SessionId, AuthError> {
        let id = self.next_session.fetch_add(1, Ordering::SeqCst);
        self.session_tx.send_replace(Some(id));
        info!("Session {} authenticated", id);
        Ok(id)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let previous = self.session_tx.send_replace(None);
        self.logouts.fetch_add(1, Ordering::SeqCst);
        match previous {
            Some(id) => info!("Session {} logged out", id),
            None => info!("Logout requested without an active session"),
        }
        Ok(())
    }
}
