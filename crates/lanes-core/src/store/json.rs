//! Single-file JSON store: `.lanes/board.json`.
//!
//! Reads take a shared advisory lock on `board.json.lock`; updates take the
//! exclusive lock, rewrite a temp file, and rename it over the document.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{IssueStore, apply_patch};
use crate::error::StoreError;
use crate::lock::BoardLock;
use crate::model::{Issue, IssuePatch, Project};

/// How long a store call waits for another process's lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// On-disk layout of the board file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub org_id: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    org_id: String,
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Open an existing board file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut store = Self {
            path,
            org_id: String::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        };
        store.org_id = store.read()?.org_id;
        Ok(store)
    }

    /// Write `document` as a new board file, replacing any existing one.
    pub fn create(path: impl Into<PathBuf>, document: &BoardDocument) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            org_id: document.org_id.clone(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        };
        if let Some(parent) = store.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let _lock = BoardLock::exclusive(&store.path, store.lock_timeout)?;
        store.write(document)?;
        Ok(store)
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole document under a shared lock.
    pub fn load(&self) -> Result<BoardDocument, StoreError> {
        self.read()
    }

    fn read(&self) -> Result<BoardDocument, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Io {
                path: self.path.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        let _lock = BoardLock::shared(&self.path, self.lock_timeout)?;
        self.read_unlocked()
    }

    fn read_unlocked(&self) -> Result<BoardDocument, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, document: &BoardDocument) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(document)
            .map_err(io::Error::other)
            .map_err(write_error(&self.path))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(write_error(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(write_error(&self.path))?;
        debug!(path = %self.path.display(), issues = document.issues.len(), "board written");
        Ok(())
    }
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Write { path, source }
}

impl IssueStore for JsonFileStore {
    fn org_id(&self) -> &str {
        &self.org_id
    }

    fn issues(&self) -> Result<Vec<Issue>, StoreError> {
        Ok(self.read()?.issues)
    }

    fn projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.read()?.projects)
    }

    fn update_issue(&mut self, issue_id: &str, patch: &IssuePatch) -> Result<Issue, StoreError> {
        let _lock = BoardLock::exclusive(&self.path, self.lock_timeout)?;
        let mut document = self.read_unlocked()?;
        let updated = apply_patch(&mut document.issues, &document.projects, issue_id, patch)?;
        self.write(&document)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::lock::LockError;
    use crate::model::{ProjectKey, WorkflowState};

    fn document() -> BoardDocument {
        BoardDocument {
            org_id: "acme".into(),
            projects: vec![Project::new("A", "Alpha")],
            issues: vec![
                Issue::new("1", "ENG-1", "Fix login", WorkflowState::Todo).with_project("A"),
                Issue::new("2", "ENG-2", "Docs", WorkflowState::Done),
            ],
        }
    }

    #[test]
    fn create_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".lanes").join("board.json");
        JsonFileStore::create(&path, &document()).unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.org_id(), "acme");
        assert_eq!(store.issues().unwrap().len(), 2);
        assert_eq!(store.projects().unwrap()[0].name, "Alpha");
        assert_eq!(store.load().unwrap(), document());
    }

    #[test]
    fn update_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut store = JsonFileStore::create(&path, &document()).unwrap();

        let patch = IssuePatch {
            state: Some(WorkflowState::InProgress),
            project: Some(ProjectKey::Assigned("A".into())),
        };
        store.update_issue("2", &patch).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let issue = reopened
            .issues()
            .unwrap()
            .into_iter()
            .find(|i| i.id == "2")
            .unwrap();
        assert_eq!(issue.state, WorkflowState::InProgress);
        assert_eq!(issue.project_id.as_deref(), Some("A"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_is_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileStore::open(dir.path().join("board.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreParseFailed);
    }

    #[test]
    fn update_times_out_while_another_writer_holds_the_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut store = JsonFileStore::create(&path, &document())
            .unwrap()
            .with_lock_timeout(Duration::from_millis(20));

        let _held = BoardLock::exclusive(&path, Duration::from_millis(50)).unwrap();
        let err = store
            .update_issue("1", &IssuePatch::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Lock(LockError::Timeout { .. })));
        assert_eq!(err.code(), ErrorCode::LockContention);
    }

    #[test]
    fn failed_update_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut store = JsonFileStore::create(&path, &document()).unwrap();
        let patch = IssuePatch {
            state: None,
            project: Some(ProjectKey::Assigned("nope".into())),
        };
        assert!(store.update_issue("1", &patch).is_err());
        assert_eq!(store.load().unwrap(), document());
    }
}
