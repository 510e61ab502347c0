use anyhow::Context;
use equity_core::domain::analysis::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub const HISTORY_LIMIT: usize = 50;
pub const HISTORY_FILE: &str = "equity-analysis-history.json";

/// Most recent analyses, newest first, never longer than [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<AnalysisResult>,
}

impl History {
    pub fn push(&mut self, entry: AnalysisResult) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn get(&self, id: i64) -> Option<&AnalysisResult> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// JSON file holding the serialized [`History`].
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty history; so is an unreadable one, after a warning.
    /// A file that does not decode is renamed to [`HistoryStore::corrupt_path`] so the
    /// next save cannot overwrite it.
    pub fn load(&self) -> History {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return History::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read history; starting empty");
                return History::default();
            }
        };

        match serde_json::from_str::<History>(&text) {
            Ok(mut history) => {
                history.entries.truncate(HISTORY_LIMIT);
                history
            }
            Err(e) => {
                let backup = self.corrupt_path();
                match std::fs::rename(&self.path, &backup) {
                    Ok(()) => tracing::warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "history file is corrupt; moved aside, starting empty"
                    ),
                    Err(rename_err) => tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        rename_error = %rename_err,
                        "history file is corrupt and could not be moved aside; starting empty"
                    ),
                }
                History::default()
            }
        }
    }

    /// Where an undecodable history file is kept, e.g. `equity-analysis-history.json.corrupt`.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    pub fn save(&self, history: &History) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string(history).context("failed to serialize history")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map, Value};

    fn entry(n: i64) -> AnalysisResult {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(n);
        let mut body = Map::new();
        body.insert("ticker".to_string(), Value::String(format!("T{n}")));
        AnalysisResult::stamp(body, now)
    }

    #[test]
    fn push_keeps_newest_first_and_evicts_tail() {
        let mut history = History::default();
        let first = entry(0);
        for n in 0..51 {
            history.push(entry(n));
        }

        assert_eq!(history.len(), 50);
        assert_eq!(history.iter().next().unwrap().ticker(), Some("T50"));
        assert_eq!(history.iter().last().unwrap().ticker(), Some("T1"));
        assert!(history.get(first.id).is_none());
    }

    #[test]
    fn get_finds_entries_by_id() {
        let mut history = History::default();
        let e = entry(7);
        history.push(e.clone());
        history.push(entry(8));
        assert_eq!(history.get(e.id), Some(&e));
        assert!(history.get(-1).is_none());
    }

    #[test]
    fn store_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path().join("nested"));
        assert!(store.load().is_empty());

        let mut history = History::default();
        history.push(entry(1));
        history.push(entry(2));
        store.save(&history).unwrap();

        assert!(store.path().ends_with(HISTORY_FILE));
        assert_eq!(store.load(), history);

        // Stored as a plain JSON array, newest first.
        let raw: Value = serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw.as_array().unwrap().len(), 2);
        assert_eq!(raw[0]["ticker"], "T2");
    }

    #[test]
    fn saving_after_a_corrupt_load_keeps_the_old_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        std::fs::write(store.path(), "[{\"id\": \"broken\"}]").unwrap();

        let mut history = store.load();
        assert!(history.is_empty());
        history.push(entry(1));
        store.save(&history).unwrap();

        assert_eq!(store.load(), history);
        assert!(store
            .corrupt_path()
            .ends_with("equity-analysis-history.json.corrupt"));
        assert_eq!(
            std::fs::read_to_string(store.corrupt_path()).unwrap(),
            "[{\"id\": \"broken\"}]"
        );
    }

    #[test]
    fn corrupt_or_oversized_files_are_handled() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::in_dir(dir.path());

        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_empty());
        assert!(!store.path().exists());
        assert_eq!(std::fs::read_to_string(store.corrupt_path()).unwrap(), "{not json");

        let many: Vec<Value> = (0..60)
            .map(|n| json!({"id": n, "created_at": "2026-01-01T00:00:00.000Z", "ticker": "X"}))
            .collect();
        std::fs::write(store.path(), Value::Array(many).to_string()).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.len(), HISTORY_LIMIT);
        assert_eq!(loaded.iter().next().unwrap().id, 0);
    }
}
