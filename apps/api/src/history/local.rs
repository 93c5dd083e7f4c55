//! Local, ephemeral history used when nobody is signed in.

use std::collections::VecDeque;
use std::path::Path;

use crate::history::HistoryError;
use crate::models::{HistoryEntry, LocalHistoryRecord};

/// Most recent entries kept without a signed-in identity.
pub const LOCAL_HISTORY_CAPACITY: usize = 20;

/// Newest-first list truncated by insertion order (oldest inserted is evicted).
#[derive(Debug, Clone)]
pub struct LocalHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for LocalHistory {
    fn default() -> Self {
        Self::with_capacity(LOCAL_HISTORY_CAPACITY)
    }
}

impl LocalHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the contents with `records` (given newest first), applying the cap.
    pub fn restore(&mut self, records: Vec<LocalHistoryRecord>) {
        self.entries = records
            .into_iter()
            .take(self.capacity)
            .map(HistoryEntry::from)
            .collect();
    }

    pub fn to_records(&self) -> Vec<LocalHistoryRecord> {
        self.entries.iter().map(LocalHistoryRecord::from).collect()
    }

    /// Loads a snapshot file. A missing file is an empty history.
    pub fn load_file(&mut self, path: &Path) -> Result<(), HistoryError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.clear();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let records: Vec<LocalHistoryRecord> = serde_json::from_str(&raw)?;
        self.restore(records);
        Ok(())
    }

    pub fn save_file(&self, path: &Path) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(&self.to_records())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArtifactKind;

    fn make_entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(ArtifactKind::Resume, "cv", "jd", format!("output {n}"), None)
    }

    #[test]
    fn test_push_keeps_newest_first() {
        let mut history = LocalHistory::default();
        history.push(make_entry(1));
        history.push(make_entry(2));
        let entries = history.entries();
        assert_eq!(entries[0].output_text, "output 2");
        assert_eq!(entries[1].output_text, "output 1");
    }

    #[test]
    fn test_push_evicts_oldest_inserted_beyond_capacity() {
        let mut history = LocalHistory::default();
        for n in 0..25 {
            history.push(make_entry(n));
            assert!(history.len() <= LOCAL_HISTORY_CAPACITY);
        }
        let entries = history.entries();
        assert_eq!(entries.len(), LOCAL_HISTORY_CAPACITY);
        assert_eq!(entries[0].output_text, "output 24");
        assert_eq!(entries[19].output_text, "output 5");
    }

    #[test]
    fn test_restore_applies_cap() {
        let records: Vec<LocalHistoryRecord> = (0..30)
            .map(|n| LocalHistoryRecord::from(&make_entry(n)))
            .collect();
        let mut history = LocalHistory::default();
        history.restore(records);
        assert_eq!(history.len(), LOCAL_HISTORY_CAPACITY);
        assert_eq!(history.entries()[0].output_text, "output 0");
    }

    #[test]
    fn test_file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut missing = LocalHistory::default();
        missing.push(make_entry(9));
        missing.load_file(&path).unwrap();
        assert!(missing.is_empty());

        let mut history = LocalHistory::default();
        history.push(make_entry(1));
        history.push(make_entry(2));
        history.save_file(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"jobDescription\""));

        let mut loaded = LocalHistory::default();
        loaded.load_file(&path).unwrap();
        assert_eq!(loaded.entries(), history.entries());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ nope").unwrap();
        let mut history = LocalHistory::default();
        assert!(matches!(
            history.load_file(&path),
            Err(HistoryError::Json(_))
        ));
    }

    #[test]
    fn test_loads_snapshot_with_millisecond_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[
  {"id":1700000000001,"type":"cover","createdAt":"2024-01-02T00:00:00.000Z","resume":"cv","jobDescription":"jd","output":"letter"},
  {"id":1700000000000,"type":"resume","createdAt":"2024-01-01T00:00:00.000Z","resume":"cv","jobDescription":"jd","output":"out"}
]"#,
        )
        .unwrap();

        let mut history = LocalHistory::default();
        history.load_file(&path).unwrap();
        let entries = history.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, ArtifactKind::Cover);
        assert_eq!(entries[1].output_text, "out");
        assert_ne!(entries[0].id, entries[1].id);

        // Saved back with UUID ids, which still load.
        history.save_file(&path).unwrap();
        let mut reloaded = LocalHistory::default();
        reloaded.load_file(&path).unwrap();
        assert_eq!(reloaded.entries(), history.entries());
    }
}
