//! History records: one canonical shape plus the two storage shapes it is
//! normalised from/to (remote rows and the local JSON snapshot).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::artifact::{ArtifactKind, UnknownArtifactKind};

/// A signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Canonical history record used throughout the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub created_at: DateTime<Utc>,
    pub resume_text: String,
    pub job_description_text: String,
    pub output_text: String,
    /// Owner when the entry was produced under a signed-in session.
    pub owner: Option<Uuid>,
}

impl HistoryEntry {
    pub fn new(
        kind: ArtifactKind,
        resume_text: impl Into<String>,
        job_description_text: impl Into<String>,
        output_text: impl Into<String>,
        owner: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            created_at: Utc::now(),
            resume_text: resume_text.into(),
            job_description_text: job_description_text.into(),
            output_text: output_text.into(),
            owner,
        }
    }
}

/// Row shape of the remote `generation_history` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub resume: String,
    pub job_description: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRow {
    pub fn from_entry(entry: &HistoryEntry, user_id: Uuid) -> Self {
        Self {
            id: entry.id,
            user_id,
            kind: entry.kind.as_str().to_string(),
            resume: entry.resume_text.clone(),
            job_description: entry.job_description_text.clone(),
            output: entry.output_text.clone(),
            created_at: entry.created_at,
        }
    }
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = UnknownArtifactKind;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(HistoryEntry {
            id: row.id,
            kind: row.kind.parse()?,
            created_at: row.created_at,
            resume_text: row.resume,
            job_description_text: row.job_description,
            output_text: row.output,
            owner: Some(row.user_id),
        })
    }
}

/// Shape of one entry in the local history snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalHistoryRecord {
    #[serde(deserialize_with = "deserialize_record_id")]
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub output: String,
}

/// Snapshot ids are UUIDs, or millisecond timestamps in older files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordId {
    Uuid(Uuid),
    Millis(u64),
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RecordId::deserialize(deserializer)? {
        RecordId::Uuid(id) => id,
        RecordId::Millis(millis) => Uuid::from_u128(u128::from(millis)),
    })
}

impl From<&HistoryEntry> for LocalHistoryRecord {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            created_at: entry.created_at,
            resume: entry.resume_text.clone(),
            job_description: entry.job_description_text.clone(),
            output: entry.output_text.clone(),
        }
    }
}

impl From<LocalHistoryRecord> for HistoryEntry {
    fn from(record: LocalHistoryRecord) -> Self {
        HistoryEntry {
            id: record.id,
            kind: record.kind,
            created_at: record.created_at,
            resume_text: record.resume,
            job_description_text: record.job_description,
            output_text: record.output,
            owner: None,
        }
    }
}
