//! Generation Workflow: the client-side state machine behind the editor.
//!
//! Each artifact moves `Idle → Generating → Ready | Failed`, with editing as a
//! reversible sub-state of `Ready`. Dispatch hands back an owned
//! [`PendingGeneration`] so callers holding the workflow behind a lock can
//! release it while the request is in flight, and run both artifacts at once.
//! Every request carries a token; completions for superseded tokens are dropped.

pub mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::upload::{read_upload, TextExtractor, UploadError, UploadedFile};
use crate::client::GenerationBackend;
use crate::export;
use crate::history::{HistoryError, HistoryScope, HistoryStore, LOCAL_HISTORY_CAPACITY};
use crate::models::{ArtifactKind, GenerationRequest, HistoryEntry};
use crate::session::Session;

pub use state::{ArtifactState, ArtifactStatus, Notice, NoticeLevel};

/// Workflow shared with the session listener.
pub type SharedWorkflow = Arc<tokio::sync::Mutex<GenerationWorkflow>>;

/// Outcome of one detached history write.
type HistoryWrite = (HistoryScope, Result<HistoryEntry, HistoryError>);

/// Session and history cache, changed only through workflow transitions.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub session: Session,
    pub scope: HistoryScope,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self {
            session: Session::anonymous(),
            scope: HistoryScope::Local,
            history: Vec::new(),
        }
    }
}

/// A dispatched generation request, detached from the workflow.
pub struct PendingGeneration {
    kind: ArtifactKind,
    token: u64,
    request: GenerationRequest,
    backend: Arc<dyn GenerationBackend>,
}

impl PendingGeneration {
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Performs the request. Errors are reduced to the user-facing message.
    pub async fn run(self) -> GenerationCompletion {
        let outcome = match self.backend.generate(self.kind, &self.request).await {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("{} generation failed: {e}", self.kind);
                Err(e.user_message(self.kind))
            }
        };
        GenerationCompletion {
            kind: self.kind,
            token: self.token,
            request: self.request,
            outcome,
        }
    }
}

/// Result of a [`PendingGeneration`], to be fed back through
/// [`GenerationWorkflow::apply`].
#[derive(Debug, Clone)]
pub struct GenerationCompletion {
    pub kind: ArtifactKind,
    token: u64,
    request: GenerationRequest,
    pub outcome: Result<String, String>,
}

pub struct GenerationWorkflow {
    backend: Arc<dyn GenerationBackend>,
    extractor: Arc<dyn TextExtractor>,
    store: HistoryStore,

    resume_input: String,
    job_description_input: String,
    resume: ArtifactState,
    cover: ArtifactState,
    active_tab: ArtifactKind,

    uploading: bool,
    uploaded_file_name: Option<String>,
    upload_error: Option<String>,

    context: WorkflowContext,
    notices: Vec<Notice>,
    /// Detached history writes, tagged with the scope they ran under.
    background: JoinSet<HistoryWrite>,
    last_token: u64,
}

impl GenerationWorkflow {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        extractor: Arc<dyn TextExtractor>,
        store: HistoryStore,
    ) -> Self {
        Self {
            backend,
            extractor,
            store,
            resume_input: String::new(),
            job_description_input: String::new(),
            resume: ArtifactState::default(),
            cover: ArtifactState::default(),
            active_tab: ArtifactKind::Resume,
            uploading: false,
            uploaded_file_name: None,
            upload_error: None,
            context: WorkflowContext::default(),
            notices: Vec::new(),
            background: JoinSet::new(),
            last_token: 0,
        }
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn artifact(&self, kind: ArtifactKind) -> &ArtifactState {
        match kind {
            ArtifactKind::Resume => &self.resume,
            ArtifactKind::Cover => &self.cover,
        }
    }

    pub fn active_tab(&self) -> ArtifactKind {
        self.active_tab
    }

    pub fn resume_input(&self) -> &str {
        &self.resume_input
    }

    pub fn job_description_input(&self) -> &str {
        &self.job_description_input
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn uploaded_file_name(&self) -> Option<&str> {
        self.uploaded_file_name.as_deref()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.context.history
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    /// Drains queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── inputs ──────────────────────────────────────────────────────────────

    pub fn set_resume(&mut self, text: impl Into<String>) {
        self.resume_input = text.into();
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description_input = text.into();
    }

    fn inputs(&self) -> GenerationRequest {
        GenerationRequest::new(&self.resume_input, &self.job_description_input)
    }

    // ── generation ──────────────────────────────────────────────────────────

    /// Whether the generate action for `kind` is enabled.
    pub fn can_submit(&self, kind: ArtifactKind) -> bool {
        self.inputs().is_complete() && !self.artifact(kind).is_generating() && !self.uploading
    }

    /// Moves `kind` to `Generating` and returns the request to run, or `None`
    /// when the action is disabled.
    pub fn submit(&mut self, kind: ArtifactKind) -> Option<PendingGeneration> {
        if !self.can_submit(kind) {
            debug!("Ignoring {kind} submit: inputs incomplete or busy");
            return None;
        }
        let token = self.next_token();
        self.artifact_mut(kind).start(token);
        info!("Generating {} (request {token})", kind.label());
        Some(PendingGeneration {
            kind,
            token,
            request: self.inputs(),
            backend: Arc::clone(&self.backend),
        })
    }

    /// Applies a completion. Returns false when it was superseded.
    pub fn apply(&mut self, completion: GenerationCompletion) -> bool {
        self.collect_finished();
        let GenerationCompletion {
            kind,
            token,
            request,
            outcome,
        } = completion;

        let state = self.artifact_mut(kind);
        if state.token != token || !state.is_generating() {
            debug!("Discarding stale {kind} response (request {token})");
            return false;
        }

        match outcome {
            Ok(text) => {
                state.succeed(text.clone());
                self.select_tab(kind);
                self.notices.push(Notice::success(match kind {
                    ArtifactKind::Resume => "Generated optimized resume",
                    ArtifactKind::Cover => "Generated tailored cover letter",
                }));

                let entry = HistoryEntry::new(
                    kind,
                    request.resume,
                    request.job_description,
                    text,
                    self.context.scope.owner(),
                );
                self.persist(entry);
            }
            Err(message) => {
                state.fail(message.clone());
                self.notices.push(Notice::error(message));
            }
        }
        true
    }

    /// Submits, awaits and applies one artifact.
    pub async fn generate(&mut self, kind: ArtifactKind) -> bool {
        let Some(pending) = self.submit(kind) else {
            return false;
        };
        let completion = pending.run().await;
        self.apply(completion)
    }

    /// Generates both artifacts concurrently. Returns how many were applied.
    pub async fn generate_both(&mut self) -> usize {
        let resume = self.submit(ArtifactKind::Resume);
        let cover = self.submit(ArtifactKind::Cover);
        let (resume, cover) = tokio::join!(run_pending(resume), run_pending(cover));

        [resume, cover]
            .into_iter()
            .flatten()
            .filter(|completion| self.apply(completion.clone()))
            .count()
    }

    fn next_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    fn artifact_mut(&mut self, kind: ArtifactKind) -> &mut ArtifactState {
        match kind {
            ArtifactKind::Resume => &mut self.resume,
            ArtifactKind::Cover => &mut self.cover,
        }
    }

    // ── tabs & editing ──────────────────────────────────────────────────────

    /// Activates `kind`; both edit flags are turned off.
    pub fn select_tab(&mut self, kind: ArtifactKind) {
        self.active_tab = kind;
        self.resume.editing = false;
        self.cover.editing = false;
    }

    /// Flips edit mode. Entering it requires a finished, non-empty result.
    /// Returns the new edit flag.
    pub fn toggle_edit(&mut self, kind: ArtifactKind) -> bool {
        let state = self.artifact_mut(kind);
        if state.editing {
            state.editing = false;
        } else if state.status == ArtifactStatus::Ready && state.has_text() {
            state.editing = true;
        }
        state.editing
    }

    /// Replaces the result text while editing.
    pub fn edit_text(&mut self, kind: ArtifactKind, text: impl Into<String>) -> bool {
        let state = self.artifact_mut(kind);
        if !state.editing {
            return false;
        }
        state.text = text.into();
        true
    }

    // ── copy & export ───────────────────────────────────────────────────────

    /// Text of the active tab for the clipboard.
    pub fn copy_active(&mut self) -> Option<String> {
        let kind = self.active_tab;
        if !self.artifact(kind).has_text() {
            self.notices.push(Notice::error("Nothing to copy yet"));
            return None;
        }
        let text = self.artifact(kind).text.clone();
        self.notices
            .push(Notice::success(format!("Copied {} to clipboard", kind.label())));
        Some(text)
    }

    /// Writes the active tab's text as a PDF under `dir`.
    pub fn export_active(&mut self, dir: &Path) -> Option<PathBuf> {
        let kind = self.active_tab;
        match export::export_to_dir(&self.artifact(kind).text, kind, dir) {
            Ok(path) => {
                self.notices
                    .push(Notice::success(format!("Downloaded {} PDF", kind.label())));
                Some(path)
            }
            Err(e) => {
                warn!("PDF export failed: {e}");
                self.notices.push(Notice::error(e.user_message()));
                None
            }
        }
    }

    // ── upload ──────────────────────────────────────────────────────────────

    /// Marks an upload as started. Returns false if one is already running.
    pub fn begin_upload(&mut self, file_name: &str) -> bool {
        if self.uploading {
            return false;
        }
        self.uploading = true;
        self.upload_error = None;
        self.uploaded_file_name = Some(file_name.to_string());
        true
    }

    /// Ends an upload. The résumé input only changes on success.
    pub fn finish_upload(&mut self, result: Result<String, UploadError>) -> bool {
        self.uploading = false;
        match result {
            Ok(text) => {
                self.resume_input = text;
                self.notices.push(Notice::success("Loaded resume from file"));
                true
            }
            Err(e) => {
                warn!("Upload failed: {e}");
                let message = e.user_message();
                self.uploaded_file_name = None;
                self.upload_error = Some(message.clone());
                self.notices.push(Notice::error(message));
                false
            }
        }
    }

    /// Reads `file` into the résumé input.
    pub async fn upload(&mut self, file: UploadedFile) -> bool {
        if !self.begin_upload(&file.name) {
            return false;
        }
        let extractor = Arc::clone(&self.extractor);
        let result = read_upload(&file, extractor.as_ref()).await;
        self.finish_upload(result)
    }

    // ── history ─────────────────────────────────────────────────────────────

    /// Restores an entry's inputs and output and shows it. Any in-flight
    /// request for that artifact is superseded.
    pub fn load_from_history(&mut self, id: Uuid) -> bool {
        let Some(entry) = self.context.history.iter().find(|e| e.id == id).cloned() else {
            return false;
        };
        let kind = entry.kind;
        self.resume_input = entry.resume_text;
        self.job_description_input = entry.job_description_text;

        let token = self.next_token();
        self.artifact_mut(kind).replace(entry.output_text, token);
        self.select_tab(kind);
        self.notices
            .push(Notice::success(format!("Loaded {} from history", kind.label())));
        true
    }

    /// Replaces the cached history with the store's list for the current
    /// scope. On failure the cache is left as it was.
    pub async fn reload_history(&mut self) -> bool {
        self.flush_background().await;
        match self.store.list(self.context.scope).await {
            Ok(entries) => {
                debug!("Loaded {} history entries", entries.len());
                self.context.history = entries;
                true
            }
            Err(e) => {
                warn!("Failed to load history: {e}");
                false
            }
        }
    }

    /// Deletes every entry in the current scope.
    pub async fn clear_history(&mut self) -> bool {
        self.flush_background().await;
        match self.store.clear_all(self.context.scope).await {
            Ok(()) => {
                self.context.history.clear();
                self.notices.push(Notice::success("Cleared history"));
                true
            }
            Err(e) => {
                warn!("Failed to clear history: {e}");
                false
            }
        }
    }

    /// Adopts a new session: re-resolves the scope and reloads history.
    pub async fn on_session_changed(&mut self, session: Session) {
        let scope = self.store.scope_for(&session);
        let rescoped = scope != self.context.scope;
        self.context.session = session;
        self.context.scope = scope;

        // Never keep showing another scope's entries.
        if !self.reload_history().await && rescoped {
            self.context.history.clear();
        }
    }

    /// Waits for pending history writes. Returns how many failed.
    pub async fn flush_background(&mut self) -> usize {
        let mut failures = 0;
        while let Some(joined) = self.background.join_next().await {
            if !self.settle_write(joined) {
                failures += 1;
            }
        }
        failures
    }

    /// Picks up history writes that already finished, without waiting.
    /// Returns how many failed.
    pub fn collect_finished(&mut self) -> usize {
        let mut failures = 0;
        while let Some(joined) = self.background.try_join_next() {
            if !self.settle_write(joined) {
                failures += 1;
            }
        }
        failures
    }

    /// Remote entries join the cache once their write succeeded, and only
    /// while the scope they were written under is still current.
    fn settle_write(&mut self, joined: Result<HistoryWrite, JoinError>) -> bool {
        match joined {
            Ok((scope, Ok(entry))) => {
                if !scope.is_local() && scope == self.context.scope {
                    self.remember(entry);
                }
                true
            }
            Ok((_, Err(_))) => false,
            Err(e) => {
                error!("History write task failed: {e}");
                false
            }
        }
    }

    fn remember(&mut self, entry: HistoryEntry) {
        if self.context.history.iter().any(|e| e.id == entry.id) {
            return;
        }
        // Newest first, even when writes finish out of order.
        let at = self
            .context
            .history
            .iter()
            .position(|e| e.created_at <= entry.created_at)
            .unwrap_or(self.context.history.len());
        self.context.history.insert(at, entry);
        if self.context.scope.is_local() {
            self.context.history.truncate(LOCAL_HISTORY_CAPACITY);
        }
    }

    /// Local entries show at once; remote ones wait for their write.
    fn persist(&mut self, entry: HistoryEntry) {
        let store = self.store.clone();
        let scope = self.context.scope;
        if scope.is_local() {
            self.remember(entry.clone());
        }
        self.background.spawn(async move {
            let result = match store.append(&entry, scope).await {
                Ok(()) => Ok(entry),
                Err(e) => {
                    warn!("Failed to save {} history entry {}: {e}", entry.kind, entry.id);
                    Err(e)
                }
            };
            (scope, result)
        });
    }
}

async fn run_pending(pending: Option<PendingGeneration>) -> Option<GenerationCompletion> {
    match pending {
        Some(pending) => Some(pending.run().await),
        None => None,
    }
}
