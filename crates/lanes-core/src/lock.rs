//! Advisory file locks guarding the JSON board document.
//!
//! Readers take a shared lock, the mutation path takes an exclusive one. The
//! lock lives in a sibling `<file>.lock` so the document itself can be
//! replaced by rename while the lock is held.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

const RETRY_EVERY: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("board lock {} still held after {waited:?}", .path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("board lock unavailable: {0}")]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::StoreWriteFailed,
        }
    }
}

/// Sidecar lock file for `document`.
pub(crate) fn lock_path(document: &Path) -> PathBuf {
    let mut name = document
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".lock");
    document.with_file_name(name)
}

/// Held advisory lock on a board document; released on drop.
#[derive(Debug)]
pub struct BoardLock {
    file: File,
}

impl BoardLock {
    /// Shared lock for reading `document`, waiting at most `timeout`.
    pub fn shared(document: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(document, timeout, FileExt::try_lock_shared)
    }

    /// Exclusive lock for rewriting `document`, waiting at most `timeout`.
    pub fn exclusive(document: &Path, timeout: Duration) -> Result<Self, LockError> {
        Self::acquire(document, timeout, FileExt::try_lock_exclusive)
    }

    fn acquire(
        document: &Path,
        timeout: Duration,
        try_lock: fn(&File) -> io::Result<()>,
    ) -> Result<Self, LockError> {
        let path = lock_path(document);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let start = Instant::now();
        while try_lock(&file).is_err() {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(LockError::Timeout { path, waited });
            }
            thread::sleep(RETRY_EVERY);
        }
        Ok(Self { file })
    }
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardLock, LockError, lock_path};
    use crate::error::ErrorCode;
    use std::path::Path;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_millis(50);
    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn lock_file_sits_next_to_document() {
        assert_eq!(
            lock_path(Path::new("/tmp/x/.lanes/board.json")),
            Path::new("/tmp/x/.lanes/board.json.lock")
        );
    }

    #[test]
    fn second_writer_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let board = dir.path().join("board.json");
        let _held = BoardLock::exclusive(&board, WAIT).unwrap();
        let err = BoardLock::exclusive(&board, SHORT).unwrap_err();

        assert!(matches!(&err, LockError::Timeout { path, .. } if *path == lock_path(&board)));
        assert_eq!(err.code(), ErrorCode::LockContention);
    }

    #[test]
    fn readers_share() -> Result<(), LockError> {
        let dir = tempfile::tempdir().unwrap();
        let board = dir.path().join("board.json");
        let _first = BoardLock::shared(&board, WAIT)?;
        let _second = BoardLock::shared(&board, WAIT)?;
        Ok(())
    }

    #[test]
    fn writer_blocks_readers_until_dropped() -> Result<(), LockError> {
        let dir = tempfile::tempdir().unwrap();
        let board = dir.path().join("board.json");
        {
            let _write = BoardLock::exclusive(&board, WAIT)?;
            assert!(matches!(
                BoardLock::shared(&board, SHORT),
                Err(LockError::Timeout { .. })
            ));
        }
        let _read = BoardLock::shared(&board, WAIT)?;
        Ok(())
    }
}
