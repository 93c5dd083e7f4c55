//! Per-artifact state and user notices.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    #[default]
    Idle,
    Generating,
    Ready,
    Failed,
}

/// Display state of one artifact (resume or cover letter).
///
/// `editing` is only ever true while `status` is `Ready`. `token` identifies
/// the latest request; completions carrying an older token are stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactState {
    pub status: ArtifactStatus,
    pub text: String,
    pub error: Option<String>,
    pub editing: bool,
    pub(crate) token: u64,
}

impl ArtifactState {
    pub fn is_generating(&self) -> bool {
        self.status == ArtifactStatus::Generating
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// True when there is displayable text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub(crate) fn start(&mut self, token: u64) {
        self.status = ArtifactStatus::Generating;
        self.text.clear();
        self.error = None;
        self.editing = false;
        self.token = token;
    }

    pub(crate) fn succeed(&mut self, text: String) {
        self.status = ArtifactStatus::Ready;
        self.text = text;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.status = ArtifactStatus::Failed;
        self.error = Some(message);
    }

    /// Shows `text` as a finished result, superseding any in-flight request.
    pub(crate) fn replace(&mut self, text: String, token: u64) {
        self.status = ArtifactStatus::Ready;
        self.text = text;
        self.error = None;
        self.editing = false;
        self.token = token;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short-lived message for the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
