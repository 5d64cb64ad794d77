#![forbid(unsafe_code)]

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use transcript_contracts::{GradeHandle, StudentId};

use crate::docstore::{GradeRecord, StorageError, TranscriptRecord};

pub const JOURNAL_SCHEMA_VERSION: u8 = 1;

/// One durable write against the document store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEvent {
    TranscriptCreated {
        record: TranscriptRecord,
    },
    GradeCreated {
        seq: u64,
        record: GradeRecord,
    },
    GradeAppended {
        student_id: StudentId,
        handle: GradeHandle,
    },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct JournalEntry {
    schema_version: u8,
    event: JournalEvent,
}

impl JournalEntry {
    fn v1(event: JournalEvent) -> Self {
        Self {
            schema_version: JOURNAL_SCHEMA_VERSION,
            event,
        }
    }
}

/// Append-only JSONL file backing a `TranscriptDocStore`.
#[derive(Debug, Clone)]
pub struct StoreJournal {
    path: PathBuf,
}

impl StoreJournal {
    /// Creates the journal file (and its parent directory) when missing, and
    /// cuts off a final line left unterminated by an interrupted append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let journal = Self { path: path.into() };
        journal.ensure_ready()?;
        journal.trim_torn_tail()?;
        Ok(journal)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_ready(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    StorageError::Journal(format!(
                        "failed to create store directory '{}': {}",
                        parent.display(),
                        err
                    ))
                })?;
            }
        }
        if !self.path.exists() {
            File::create(&self.path).map_err(|err| {
                StorageError::Journal(format!(
                    "failed to create store journal '{}': {}",
                    self.path.display(),
                    err
                ))
            })?;
        }
        Ok(())
    }

    fn trim_torn_tail(&self) -> Result<(), StorageError> {
        let bytes = fs::read(&self.path).map_err(|err| {
            StorageError::Journal(format!(
                "failed to read store journal '{}': {}",
                self.path.display(),
                err
            ))
        })?;
        if bytes.is_empty() || bytes.ends_with(b"\n") {
            return Ok(());
        }
        let keep = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |idx| idx + 1);
        OpenOptions::new()
            .write(true)
            .open(&self.path)
            .and_then(|file| {
                file.set_len(keep as u64)?;
                file.sync_data()
            })
            .map_err(|err| {
                StorageError::Journal(format!(
                    "failed to trim torn tail of store journal '{}': {}",
                    self.path.display(),
                    err
                ))
            })?;
        tracing::warn!(
            path = %self.path.display(),
            dropped_bytes = bytes.len() - keep,
            "dropped unterminated store journal tail"
        );
        Ok(())
    }

    pub fn read_events(&self) -> Result<Vec<JournalEvent>, StorageError> {
        let file = File::open(&self.path).map_err(|err| {
            StorageError::Journal(format!(
                "failed to open store journal '{}': {}",
                self.path.display(),
                err
            ))
        })?;
        let mut events = Vec::new();
        for (line_no, line_result) in BufReader::new(file).lines().enumerate() {
            let line = line_result.map_err(|err| {
                StorageError::Journal(format!(
                    "failed reading store journal '{}' at line {}: {}",
                    self.path.display(),
                    line_no + 1,
                    err
                ))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry = serde_json::from_str(&line).map_err(|err| {
                StorageError::Journal(format!(
                    "failed parsing store journal '{}' at line {}: {}",
                    self.path.display(),
                    line_no + 1,
                    err
                ))
            })?;
            if entry.schema_version != JOURNAL_SCHEMA_VERSION {
                return Err(StorageError::Journal(format!(
                    "unsupported store journal schema_version={} at line {}",
                    entry.schema_version,
                    line_no + 1
                )));
            }
            events.push(entry.event);
        }
        Ok(events)
    }

    /// Appends one line and syncs it. On failure the file is cut back to its
    /// previous length, so replay never sees a write the caller saw fail.
    pub fn append(&self, event: &JournalEvent) -> Result<(), StorageError> {
        let entry = JournalEntry::v1(event.clone());
        let mut line = serde_json::to_string(&entry).map_err(|err| {
            StorageError::Journal(format!("failed to encode store journal entry: {err}"))
        })?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|err| {
                StorageError::Journal(format!(
                    "failed opening store journal '{}' for append: {}",
                    self.path.display(),
                    err
                ))
            })?;
        let start = file.metadata().map(|m| m.len()).map_err(|err| {
            StorageError::Journal(format!(
                "failed reading store journal '{}' metadata: {}",
                self.path.display(),
                err
            ))
        })?;
        if let Err(err) = file
            .write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
        {
            if let Err(rollback_err) = file.set_len(start) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback_err,
                    "failed to roll back store journal append"
                );
            }
            return Err(StorageError::Journal(format!(
                "failed writing store journal '{}': {}",
                self.path.display(),
                err
            )));
        }
        Ok(())
    }
}
