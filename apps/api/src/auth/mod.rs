//! Auth provider seam: identity lookup, change notifications, OAuth sign-in
//! and sign-out. The concrete provider lives in `gotrue`.

pub mod gotrue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::Identity;

pub use gotrue::GoTrueAuth;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Auth API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid auth URL: {0}")]
    InvalidUrl(String),

    #[error("No auth provider is configured")]
    NotConfigured,
}

/// OAuth providers offered at sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Github,
    Google,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Github => "github",
            OAuthProvider::Google => "google",
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// One-shot lookup of the current identity. `None` when signed out.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;

    /// Live identity-change notifications. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    /// URL that starts the OAuth flow with `provider`.
    fn sign_in_url(&self, provider: OAuthProvider) -> Result<String, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Provider used when no auth backend is configured: always signed out.
pub struct AnonymousAuth {
    identity: watch::Sender<Option<Identity>>,
}

impl Default for AnonymousAuth {
    fn default() -> Self {
        let (identity, _) = watch::channel(None);
        Self { identity }
    }
}

#[async_trait]
impl AuthProvider for AnonymousAuth {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        Ok(None)
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }

    fn sign_in_url(&self, _provider: OAuthProvider) -> Result<String, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
