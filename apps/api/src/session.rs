//! Session Manager: tracks the current identity and re-scopes the workflow's
//! history whenever it changes.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::AuthProvider;
use crate::models::Identity;
use crate::workflow::SharedWorkflow;

/// Current identity, absent when nobody is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
}

impl Session {
    pub fn new(identity: Option<Identity>) -> Self {
        Self { identity }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }
}

/// Keeps the workflow in step with the auth provider for its lifetime.
/// Dropping the manager stops listening for identity changes.
pub struct SessionManager {
    listener: JoinHandle<()>,
}

impl SessionManager {
    /// Resolves the initial identity, loads its history, then follows
    /// identity changes until shut down.
    pub async fn start(auth: Arc<dyn AuthProvider>, workflow: SharedWorkflow) -> Self {
        // Subscribe before the one-shot lookup so no change falls in between.
        let mut changes = auth.subscribe();
        changes.borrow_and_update();

        let identity = match auth.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Could not resolve current identity, continuing signed out: {e}");
                None
            }
        };
        workflow
            .lock()
            .await
            .on_session_changed(Session::new(identity))
            .await;

        let listener = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let identity = changes.borrow_and_update().clone();
                match &identity {
                    Some(identity) => info!("Session changed: signed in as {}", identity.id),
                    None => info!("Session changed: signed out"),
                }
                workflow
                    .lock()
                    .await
                    .on_session_changed(Session::new(identity))
                    .await;
            }
            debug!("Auth provider closed; session listener stopped");
        });

        Self { listener }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
