//! Stock persistence for the daily record and per-day guess sessions.
//!
//! File stores replace their targets atomically (temp file in the same
//! directory, then rename) so readers never observe a half-written record.
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::calendar::GameDate;
use crate::constants::{GUESS_FILE_EXTENSION, GUESS_FILE_PREFIX};
use crate::selector::DailyState;
use crate::session::GuessSession;
use crate::{DailyStore, GuessStore};

/// Errors raised by the stock stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored record at {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result of a compare-and-swap write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The stored revision moved on; nothing was written.
    Conflict { current: Option<u64> },
}

/// Daily record kept as one JSON file.
#[derive(Debug)]
pub struct FileDailyStore {
    path: PathBuf,
    swap_lock: Mutex<()>,
}

impl FileDailyStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            swap_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DailyStore for FileDailyStore {
    type Error = StoreError;

    fn read(&self) -> Result<Option<DailyState>, Self::Error> {
        read_json(&self.path)
    }

    fn write(&self, state: &DailyState) -> Result<(), Self::Error> {
        write_json_atomic(&self.path, state)
    }

    fn write_if_revision(
        &self,
        expected: Option<u64>,
        state: &DailyState,
    ) -> Result<WriteOutcome, Self::Error> {
        let _guard = self.swap_lock.lock().map_err(|_| StoreError::Poisoned)?;
        // A corrupt record counts as absent so it can be replaced.
        let current = match self.read() {
            Ok(stored) => stored.map(|stored| stored.revision),
            Err(StoreError::Corrupt { path, source }) => {
                log::warn!("replacing corrupt daily record {}: {source}", path.display());
                None
            }
            Err(err) => return Err(err),
        };
        if current != expected {
            return Ok(WriteOutcome::Conflict { current });
        }
        self.write(state)?;
        Ok(WriteOutcome::Written)
    }
}

/// Daily record held in memory; for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct MemoryDailyStore {
    slot: Mutex<Option<DailyState>>,
}

impl MemoryDailyStore {
    #[must_use]
    pub fn with_state(state: DailyState) -> Self {
        Self {
            slot: Mutex::new(Some(state)),
        }
    }
}

impl DailyStore for MemoryDailyStore {
    type Error = StoreError;

    fn read(&self) -> Result<Option<DailyState>, Self::Error> {
        Ok(self.slot.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn write(&self, state: &DailyState) -> Result<(), Self::Error> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = Some(state.clone());
        Ok(())
    }

    fn write_if_revision(
        &self,
        expected: Option<u64>,
        state: &DailyState,
    ) -> Result<WriteOutcome, Self::Error> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        let current = slot.as_ref().map(|stored| stored.revision);
        if current != expected {
            return Ok(WriteOutcome::Conflict { current });
        }
        *slot = Some(state.clone());
        Ok(WriteOutcome::Written)
    }
}

/// Guess sessions kept as `dexle-game-<date>.json` files in one directory.
#[derive(Debug, Clone)]
pub struct FileGuessStore {
    dir: PathBuf,
}

impl FileGuessStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn path_for(&self, date: GameDate) -> PathBuf {
        self.dir
            .join(format!("{GUESS_FILE_PREFIX}{date}.{GUESS_FILE_EXTENSION}"))
    }
}

impl GuessStore for FileGuessStore {
    type Error = StoreError;

    fn load(&self, date: GameDate) -> Result<Option<GuessSession>, Self::Error> {
        read_json(&self.path_for(date))
    }

    fn save(&self, session: &GuessSession) -> Result<(), Self::Error> {
        write_json_atomic(&self.path_for(session.date), session)
    }

    fn purge_except(&self, keep: GameDate) -> Result<usize, Self::Error> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };
        let keep_path = self.path_for(keep);
        let mut removed = 0;
        for entry in entries {
            let path = entry
                .map_err(|source| StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })?
                .path();
            if path == keep_path || !is_guess_file(&path) {
                continue;
            }
            fs::remove_file(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            log::debug!("removed stale guess file {}", path.display());
            removed += 1;
        }
        Ok(removed)
    }
}

fn is_guess_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    name.starts_with(GUESS_FILE_PREFIX)
        && path.extension().and_then(|e| e.to_str()) == Some(GUESS_FILE_EXTENSION)
}

/// Guess sessions held in memory.
#[derive(Debug, Default)]
pub struct MemoryGuessStore {
    sessions: Mutex<BTreeMap<GameDate, GuessSession>>,
}

impl MemoryGuessStore {
    /// Dates that currently hold a session, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] if a writer panicked.
    pub fn dates(&self) -> Result<Vec<GameDate>, StoreError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .keys()
            .copied()
            .collect())
    }
}

impl GuessStore for MemoryGuessStore {
    type Error = StoreError;

    fn load(&self, date: GameDate) -> Result<Option<GuessSession>, Self::Error> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .get(&date)
            .cloned())
    }

    fn save(&self, session: &GuessSession) -> Result<(), Self::Error> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(session.date, session.clone());
        Ok(())
    }

    fn purge_except(&self, keep: GameDate) -> Result<usize, Self::Error> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        let before = sessions.len();
        sessions.retain(|date, _| *date == keep);
        Ok(before - sessions.len())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_err = |source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;
    let payload = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&payload).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::RecentIds;

    fn date(s: &str) -> GameDate {
        s.parse().unwrap()
    }

    fn state(revision: u64) -> DailyState {
        DailyState {
            date: date("2024-01-01"),
            answer_id: 4,
            recent_answer_ids: RecentIds::from(vec![4]),
            reroll_count: 0,
            revision,
        }
    }

    #[test]
    fn file_store_reads_nothing_before_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDailyStore::new(dir.path().join("nested/daily.json"));
        assert!(store.read().unwrap().is_none());
        store.write(&state(1)).unwrap();
        assert_eq!(store.read().unwrap(), Some(state(1)));
    }

    #[test]
    fn file_store_reports_corrupt_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.json");
        fs::write(&path, "{ not json").unwrap();
        let store = FileDailyStore::new(&path);
        assert!(matches!(store.read(), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn compare_and_swap_replaces_a_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.json");
        fs::write(&path, "{ truncated").unwrap();
        let store = FileDailyStore::new(&path);
        assert_eq!(store.write_if_revision(None, &state(1)).unwrap(), WriteOutcome::Written);
        assert_eq!(store.read().unwrap(), Some(state(1)));
        assert_eq!(
            store.write_if_revision(None, &state(2)).unwrap(),
            WriteOutcome::Conflict { current: Some(1) }
        );
    }

    #[test]
    fn compare_and_swap_detects_stale_revisions() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileDailyStore::new(dir.path().join("daily.json"));
        let memory = MemoryDailyStore::default();
        let stores: [&dyn DailyStore<Error = StoreError>; 2] = [&file, &memory];
        for store in stores {
            assert_eq!(store.write_if_revision(None, &state(1)).unwrap(), WriteOutcome::Written);
            assert_eq!(
                store.write_if_revision(None, &state(2)).unwrap(),
                WriteOutcome::Conflict { current: Some(1) }
            );
            assert_eq!(store.write_if_revision(Some(1), &state(2)).unwrap(), WriteOutcome::Written);
            assert_eq!(store.read().unwrap().map(|s| s.revision), Some(2));
        }
    }

    #[test]
    fn guess_files_are_keyed_by_date_and_purged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGuessStore::new(dir.path());
        let old = GuessSession::new(date("2024-01-01"));
        let today = GuessSession::new(date("2024-01-02"));
        store.save(&old).unwrap();
        store.save(&today).unwrap();
        fs::write(dir.path().join("unrelated.json"), "{}").unwrap();

        assert!(store.path_for(date("2024-01-02")).ends_with("dexle-game-2024-01-02.json"));
        assert_eq!(store.load(date("2024-01-01")).unwrap(), Some(old));
        assert_eq!(store.purge_except(date("2024-01-02")).unwrap(), 1);
        assert!(store.load(date("2024-01-01")).unwrap().is_none());
        assert_eq!(store.load(date("2024-01-02")).unwrap(), Some(today));
        assert!(dir.path().join("unrelated.json").exists());
    }

    #[test]
    fn purging_a_missing_directory_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileGuessStore::new(dir.path().join("never-created"));
        assert_eq!(store.purge_except(date("2024-01-01")).unwrap(), 0);
    }

    #[test]
    fn memory_guess_store_keeps_only_the_current_day() {
        let store = MemoryGuessStore::default();
        for day in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            store.save(&GuessSession::new(date(day))).unwrap();
        }
        assert_eq!(store.purge_except(date("2024-01-03")).unwrap(), 2);
        assert_eq!(store.dates().unwrap(), vec![date("2024-01-03")]);
    }
}
