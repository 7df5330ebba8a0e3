//! Filesystem-backed session and baseline store.
//!
//! Layout under `<qa_root>/.swarm/qa/`:
//!
//! ```text
//! <session-id>/state.json        full session snapshot
//! <session-id>/qa-report.md      findings report
//! <session-id>/qa-bugs.md        bug-investigation seeds
//! coverage/latest-baseline.json  most recent coverage snapshot
//! coverage/coverage-history.json capped history, oldest first
//! baselines/latest.json          most recent regression baseline
//! baselines/<session-id>.json    per-session regression baselines
//! ```
//!
//! Writes go through an atomic tmp-write-verify-rename sequence and
//! propagate errors loudly. Reads treat missing files, invalid JSON, and
//! shape mismatches alike as `None`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{QaError, QaResult};
use crate::domain::models::{CoverageBaseline, RegressionBaseline, Session};
use crate::domain::ports::{BaselineStore, SessionStore};

/// Most coverage snapshots retained in the history file.
const COVERAGE_HISTORY_CAP: usize = 100;

/// Session and baseline persistence rooted at `<qa_root>/.swarm/qa/`.
pub struct FsQaStore {
    root: PathBuf,
}

impl FsQaStore {
    /// Create a store rooted at `<qa_root>/.swarm/qa/`.
    ///
    /// Directories are created lazily on first write, not here.
    pub fn new(qa_root: impl AsRef<Path>) -> Self {
        Self {
            root: qa_root.as_ref().join(".swarm").join("qa"),
        }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }

    fn coverage_dir(&self) -> PathBuf {
        self.root.join("coverage")
    }

    fn baselines_dir(&self) -> PathBuf {
        self.root.join("baselines")
    }

    /// Atomically write `value` as JSON to `path`.
    ///
    /// The payload lands in a temp file in the same directory, is re-parsed
    /// to catch truncated writes, then renamed over the destination.
    fn write_json<T: Serialize + DeserializeOwned>(path: &Path, value: &T) -> QaResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| persistence_err(path, "path has no parent directory"))?;
        fs::create_dir_all(parent).map_err(|e| persistence_err(parent, e))?;

        let tmp = parent.join(format!(".tmp-{}", Uuid::new_v4().simple()));
        let payload = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, &payload).map_err(|e| persistence_err(&tmp, e))?;

        // Verify the bytes on disk parse back before committing.
        let written = fs::read(&tmp).map_err(|e| persistence_err(&tmp, e))?;
        if let Err(e) = serde_json::from_slice::<T>(&written) {
            let _ = fs::remove_file(&tmp);
            return Err(persistence_err(path, format!("verification failed: {e}")));
        }

        fs::rename(&tmp, path).map_err(|e| persistence_err(path, e))?;
        debug!(path = %path.display(), "state written");
        Ok(())
    }

    /// Atomically write markdown text to `path`.
    fn write_text(path: &Path, text: &str) -> QaResult<()> {
        let parent = path
            .parent()
            .ok_or_else(|| persistence_err(path, "path has no parent directory"))?;
        fs::create_dir_all(parent).map_err(|e| persistence_err(parent, e))?;

        let tmp = parent.join(format!(".tmp-{}", Uuid::new_v4().simple()));
        fs::write(&tmp, text).map_err(|e| persistence_err(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| persistence_err(path, e))?;
        Ok(())
    }

    /// Read and parse JSON; any failure is logged and surfaces as `None`.
    fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
        let bytes = fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable state file ignored");
                None
            }
        }
    }
}

fn persistence_err(path: &Path, message: impl ToString) -> QaError {
    QaError::Persistence {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

impl SessionStore for FsQaStore {
    fn save_session(&self, session: &Session) -> QaResult<()> {
        let path = self.session_dir(&session.session_id).join("state.json");
        Self::write_json(&path, session)
    }

    fn load_session(&self, session_id: &str) -> QaResult<Option<Session>> {
        let path = self.session_dir(session_id).join("state.json");
        Ok(Self::read_json(&path))
    }

    fn list_session_ids(&self, limit: usize) -> QaResult<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| name.starts_with("qa-") && has_state(&self.root, name))
            .collect();

        // Ids embed a UTC timestamp, so lexicographic descending is
        // newest-first.
        ids.sort_by(|a, b| b.cmp(a));
        ids.truncate(limit);
        Ok(ids)
    }

    fn write_report(&self, session_id: &str, markdown: &str) -> QaResult<()> {
        let path = self.session_dir(session_id).join("qa-report.md");
        Self::write_text(&path, markdown)
    }

    fn write_bugs_doc(&self, session_id: &str, markdown: &str) -> QaResult<()> {
        let path = self.session_dir(session_id).join("qa-bugs.md");
        Self::write_text(&path, markdown)
    }
}

fn has_state(root: &Path, name: &str) -> bool {
    root.join(name).join("state.json").is_file()
}

impl BaselineStore for FsQaStore {
    fn save_coverage_baseline(&self, baseline: &CoverageBaseline) -> QaResult<()> {
        let dir = self.coverage_dir();
        Self::write_json(&dir.join("latest-baseline.json"), baseline)?;

        let mut history: Vec<CoverageBaseline> =
            Self::read_json(&dir.join("coverage-history.json")).unwrap_or_default();
        history.push(baseline.clone());
        if history.len() > COVERAGE_HISTORY_CAP {
            let excess = history.len() - COVERAGE_HISTORY_CAP;
            history.drain(..excess);
        }
        Self::write_json(&dir.join("coverage-history.json"), &history)
    }

    fn load_coverage_baseline(&self) -> QaResult<Option<CoverageBaseline>> {
        Ok(Self::read_json(&self.coverage_dir().join("latest-baseline.json")))
    }

    fn coverage_history(&self) -> QaResult<Vec<CoverageBaseline>> {
        Ok(Self::read_json(&self.coverage_dir().join("coverage-history.json")).unwrap_or_default())
    }

    fn save_regression_baseline(&self, baseline: &RegressionBaseline) -> QaResult<()> {
        let dir = self.baselines_dir();
        Self::write_json(&dir.join("latest.json"), baseline)?;
        Self::write_json(&dir.join(format!("{}.json", baseline.session_id)), baseline)
    }

    fn load_regression_baseline(&self) -> QaResult<Option<RegressionBaseline>> {
        Ok(Self::read_json(&self.baselines_dir().join("latest.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Depth, QaContext, Trigger};
    use chrono::Utc;

    fn session_with_id(id: &str) -> Session {
        let mut session = Session::new(Trigger::UserCommand, Depth::Shallow, QaContext::default());
        session.session_id = id.to_string();
        session
    }

    #[test]
    fn test_save_and_load_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        let session = session_with_id("qa-20260827-100000-aaaaaa");
        store.save_session(&session).unwrap();

        let loaded = store.load_session(&session.session_id).unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_missing_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());
        assert!(store.load_session("qa-20260101-000000-ffffff").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_state_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        let session_dir = dir.path().join(".swarm/qa/qa-20260827-100000-bbbbbb");
        fs::create_dir_all(&session_dir).unwrap();
        fs::write(session_dir.join("state.json"), "{not json").unwrap();

        assert!(store
            .load_session("qa-20260827-100000-bbbbbb")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_session_ids_newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        for id in [
            "qa-20260825-090000-aaaaaa",
            "qa-20260827-110000-cccccc",
            "qa-20260826-100000-bbbbbb",
        ] {
            store.save_session(&session_with_id(id)).unwrap();
        }

        let ids = store.list_session_ids(2).unwrap();
        assert_eq!(
            ids,
            vec![
                "qa-20260827-110000-cccccc".to_string(),
                "qa-20260826-100000-bbbbbb".to_string(),
            ]
        );
    }

    #[test]
    fn test_no_tmp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        let session = session_with_id("qa-20260827-100000-dddddd");
        store.save_session(&session).unwrap();

        let session_dir = dir.path().join(".swarm/qa").join(&session.session_id);
        let leftovers: Vec<_> = fs::read_dir(&session_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_coverage_history_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        for i in 0..(COVERAGE_HISTORY_CAP + 5) {
            let baseline = CoverageBaseline {
                session_id: format!("qa-s{i}"),
                discovered: vec!["/a".to_string()],
                tested: vec!["/a".to_string()],
                coverage_pct: 100.0,
                captured_at: Utc::now(),
            };
            store.save_coverage_baseline(&baseline).unwrap();
        }

        let history = store.coverage_history().unwrap();
        assert_eq!(history.len(), COVERAGE_HISTORY_CAP);
        // Oldest entries were dropped.
        assert_eq!(history[0].session_id, "qa-s5");
        assert_eq!(
            history.last().unwrap().session_id,
            format!("qa-s{}", COVERAGE_HISTORY_CAP + 4)
        );

        let latest = store.load_coverage_baseline().unwrap().unwrap();
        assert_eq!(latest.session_id, format!("qa-s{}", COVERAGE_HISTORY_CAP + 4));
    }

    #[test]
    fn test_regression_baseline_latest_and_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsQaStore::new(dir.path());

        let baseline = RegressionBaseline {
            session_id: "qa-20260827-100000-eeeeee".to_string(),
            findings: Vec::new(),
            established_at: Utc::now(),
        };
        store.save_regression_baseline(&baseline).unwrap();

        let latest = store.load_regression_baseline().unwrap().unwrap();
        assert_eq!(latest.session_id, baseline.session_id);

        let per_session = dir
            .path()
            .join(".swarm/qa/baselines")
            .join(format!("{}.json", baseline.session_id));
        assert!(per_session.is_file());
    }
}
