//! Append-only history log of published events.
//!
//! The log is one pretty-printed JSON array. Saves go through a temp file in
//! the same directory and a rename, so a reader never sees a partial write.
//! There is no locking: two bots sharing one log is unsupported.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::error::HistoryError;
use crate::event::HistoryRecord;
use crate::fingerprint::Fingerprint;

pub const DEFAULT_HISTORY_LOG: &str = "history_log.json";

pub trait HistoryStore: Send + Sync {
    /// Every record in publication order. Never fails: an unreadable log is
    /// logged and treated as empty, which disables duplicate detection for the
    /// cycle rather than blocking publication.
    fn load(&self) -> Vec<HistoryRecord>;

    /// Append `record` and persist the whole log.
    fn append_and_save(&self, record: HistoryRecord) -> Result<(), HistoryError>;
}

/// A record whose stored fingerprint does not match its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintMismatch {
    pub index: usize,
    pub title: String,
    pub stored: Fingerprint,
    pub recomputed: Fingerprint,
}

// ---------------------------------------------------------------------------
// JsonHistoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct LogContents {
    records: Vec<HistoryRecord>,
    skipped: usize,
}

#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load without degrading. A missing file is an empty log. Entries that
    /// are not records at all are skipped; only a file that is not a JSON
    /// array counts as corrupt.
    pub fn try_load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        self.read_log().map(|log| log.records)
    }

    fn read_log(&self) -> Result<LogContents, HistoryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LogContents::default()),
            Err(source) => return Err(self.io_error(source)),
        };

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| HistoryError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let mut log = LogContents::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<HistoryRecord>(entry) {
                Ok(record) => log.records.push(record),
                Err(e) => {
                    warn!(index, error = %e, "Skipping unreadable history entry");
                    log.skipped += 1;
                }
            }
        }
        Ok(log)
    }

    /// Re-derive every record's fingerprint and report the ones that differ.
    pub fn verify(&self) -> Result<Vec<FingerprintMismatch>, HistoryError> {
        let mismatches = self
            .try_load()?
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let recomputed = record.recomputed_fingerprint();
                (recomputed != record.fingerprint).then(|| FingerprintMismatch {
                    index,
                    title: record.title,
                    stored: record.fingerprint,
                    recomputed,
                })
            })
            .collect();
        Ok(mismatches)
    }

    fn save(&self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        let json = serde_json::to_string_pretty(records).map_err(HistoryError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| self.io_error(source))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        Ok(())
    }

    /// Move an unreadable log aside so the next save does not overwrite it.
    fn quarantine(&self) -> Result<PathBuf, HistoryError> {
        let backup = self.backup_path();
        fs::rename(&self.path, &backup).map_err(|source| self.io_error(source))?;
        Ok(backup)
    }

    /// Copy the log aside before a save drops entries it could not read.
    fn preserve_copy(&self) -> Result<PathBuf, HistoryError> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|source| self.io_error(source))?;
        Ok(backup)
    }

    fn backup_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_HISTORY_LOG.to_string());
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        self.path.with_file_name(format!("{file_name}.corrupt-{stamp}"))
    }

    fn io_error(&self, source: std::io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Vec<HistoryRecord> {
        match self.try_load() {
            Ok(records) => records,
            Err(e @ HistoryError::Corrupt { .. }) => {
                error!(error = %e, "History log unreadable, continuing with empty history");
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Could not read history log, continuing with empty history");
                Vec::new()
            }
        }
    }

    fn append_and_save(&self, record: HistoryRecord) -> Result<(), HistoryError> {
        let mut records = match self.read_log() {
            Ok(log) if log.skipped > 0 => {
                let backup = self.preserve_copy()?;
                warn!(
                    backup = %backup.display(),
                    skipped = log.skipped,
                    "History log copied aside before dropping unreadable entries"
                );
                log.records
            }
            Ok(log) => log.records,
            Err(HistoryError::Corrupt { .. }) => {
                let backup = self.quarantine()?;
                warn!(
                    backup = %backup.display(),
                    "Corrupt history log moved aside before writing a fresh one"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        records.push(record);
        self.save(&records)?;

        info!(
            path = %self.path.display(),
            records = records.len(),
            "History log saved"
        );
        Ok(())
    }
}
