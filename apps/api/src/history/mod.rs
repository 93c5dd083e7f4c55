//! History Store Adapter: the only writer to the remote history table.
//!
//! Without a signed-in identity every operation works on the in-process
//! `LocalHistory` (capped, ephemeral). With one, operations map 1:1 onto the
//! `HistoryRepository`, filtered by owner and ordered newest first.

pub mod local;
pub mod repository;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::{create_pool, ensure_schema};
use crate::models::artifact::UnknownArtifactKind;
use crate::models::HistoryEntry;
use crate::session::Session;

pub use local::{LocalHistory, LOCAL_HISTORY_CAPACITY};
pub use repository::{HistoryRepository, PgHistoryRepository};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt history row: {0}")]
    Corrupt(#[from] UnknownArtifactKind),

    #[error("History file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote history is not configured")]
    RemoteUnavailable,
}

/// Identity under which history operations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    /// Nobody signed in: in-process list only.
    Local,
    /// Remote rows owned by this user.
    Remote(Uuid),
}

impl HistoryScope {
    pub fn is_local(&self) -> bool {
        matches!(self, HistoryScope::Local)
    }

    pub fn owner(&self) -> Option<Uuid> {
        match self {
            HistoryScope::Local => None,
            HistoryScope::Remote(owner) => Some(*owner),
        }
    }
}

#[derive(Clone)]
pub struct HistoryStore {
    local: Arc<Mutex<LocalHistory>>,
    remote: Option<Arc<dyn HistoryRepository>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::local_only()
    }
}

impl HistoryStore {
    pub fn local_only() -> Self {
        Self {
            local: Arc::new(Mutex::new(LocalHistory::default())),
            remote: None,
        }
    }

    pub fn with_remote(remote: Arc<dyn HistoryRepository>) -> Self {
        Self {
            local: Arc::new(Mutex::new(LocalHistory::default())),
            remote: Some(remote),
        }
    }

    /// Builds a store backed by Postgres when `database_url` is set.
    ///
    /// An unreachable database or a failed schema setup falls back to a
    /// local-only store, so history keeps working for this process.
    pub async fn connect(database_url: Option<&str>) -> Self {
        let Some(url) = database_url else {
            return Self::local_only();
        };
        let pool = match create_pool(url).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Remote history unavailable, using local history: {e:#}");
                return Self::local_only();
            }
        };
        if let Err(e) = ensure_schema(&pool).await {
            warn!("Could not prepare history table, using local history: {e:#}");
            return Self::local_only();
        }
        Self::with_remote(Arc::new(PgHistoryRepository::new(pool)))
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Resolves the scope for a session. A signed-in user only gets remote
    /// scope when a remote repository is configured.
    pub fn scope_for(&self, session: &Session) -> HistoryScope {
        match (&session.identity, &self.remote) {
            (Some(identity), Some(_)) => HistoryScope::Remote(identity.id),
            _ => HistoryScope::Local,
        }
    }

    pub async fn list(&self, scope: HistoryScope) -> Result<Vec<HistoryEntry>, HistoryError> {
        match scope {
            HistoryScope::Local => {
                let entries = self.local().entries();
                Ok(entries)
            }
            HistoryScope::Remote(owner) => self.remote()?.list(owner).await,
        }
    }

    pub async fn append(
        &self,
        entry: &HistoryEntry,
        scope: HistoryScope,
    ) -> Result<(), HistoryError> {
        match scope {
            HistoryScope::Local => {
                self.local().push(entry.clone());
                Ok(())
            }
            HistoryScope::Remote(owner) => self.remote()?.insert(entry, owner).await,
        }
    }

    pub async fn clear_all(&self, scope: HistoryScope) -> Result<(), HistoryError> {
        match scope {
            HistoryScope::Local => {
                self.local().clear();
                Ok(())
            }
            HistoryScope::Remote(owner) => {
                let removed = self.remote()?.delete_all(owner).await?;
                debug!("Cleared {removed} remote history rows for {owner}");
                Ok(())
            }
        }
    }

    /// Restores the local list from a snapshot file.
    pub fn load_local(&self, path: &Path) -> Result<(), HistoryError> {
        self.local().load_file(path)
    }

    /// Like `load_local`, but a missing or unreadable snapshot only logs a
    /// warning and leaves the list empty. Returns whether the file was usable.
    pub fn restore_local(&self, path: &Path) -> bool {
        match self.load_local(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring history file {}: {e}", path.display());
                self.local().clear();
                false
            }
        }
    }

    /// Writes the local list to a snapshot file.
    pub fn save_local(&self, path: &Path) -> Result<(), HistoryError> {
        self.local().save_file(path)
    }

    fn local(&self) -> MutexGuard<'_, LocalHistory> {
        // Poisoning only means a panic elsewhere mid-push; the list itself is still valid.
        self.local.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remote(&self) -> Result<&Arc<dyn HistoryRepository>, HistoryError> {
        self.remote.as_ref().ok_or(HistoryError::RemoteUnavailable)
    }
}
