//! Per-file ingest loop.
//!
//! Files are processed strictly in the given order. Each one is parsed on its
//! own; a failure is recorded in the [`IngestReport`] and the loop moves on.
//! Successful batches are appended to the [`SessionStore`] one file at a time.

use std::path::{Path, PathBuf};

use replay_core::error::ReplayError;
use replay_data::mapper::RecordMapper;
use replay_data::reader::parse_replay_file;

use crate::session_store::SessionStore;

// ── Report types ──────────────────────────────────────────────────────────────

/// What happened to one input file.
#[derive(Debug)]
pub enum FileStatus {
    /// Parsed and appended. `persist_error` holds the save failure when the
    /// session could not be written to disk; the records are still in memory.
    Added {
        records: usize,
        persist_error: Option<ReplayError>,
    },
    /// Parsed, but the payload listed no players.
    Empty,
    /// Could not be parsed; nothing was appended.
    Failed(ReplayError),
}

/// Outcome for a single file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Outcome of a whole ingest run, in input order.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: Vec<FileOutcome>,
}

impl IngestReport {
    /// Total records appended across all files.
    pub fn records_added(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.status {
                FileStatus::Added { records, .. } => records,
                _ => 0,
            })
            .sum()
    }

    /// Files that were parsed (with or without players).
    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !matches!(f.status, FileStatus::Failed(_)))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ReplayError)> {
        self.files.iter().filter_map(|f| match &f.status {
            FileStatus::Failed(e) => Some((f.path.as_path(), e)),
            _ => None,
        })
    }

    /// `true` when at least one append could not be persisted.
    pub fn persistence_failed(&self) -> bool {
        self.persistence_errors().next().is_some()
    }

    /// Save failures, paired with the file whose append triggered them.
    pub fn persistence_errors(&self) -> impl Iterator<Item = (&Path, &ReplayError)> {
        self.files.iter().filter_map(|f| match &f.status {
            FileStatus::Added {
                persist_error: Some(e),
                ..
            } => Some((f.path.as_path(), e)),
            _ => None,
        })
    }
}

// ── Ingest ────────────────────────────────────────────────────────────────────

/// Parse every file in `paths` and append each successful batch to `store`.
pub fn ingest_files(
    store: &mut SessionStore,
    paths: &[PathBuf],
    mapper: &RecordMapper,
) -> IngestReport {
    let mut report = IngestReport::default();

    for path in paths {
        let status = match parse_replay_file(path, mapper) {
            Ok(records) if records.is_empty() => {
                tracing::info!(path = %path.display(), "replay has no player entries");
                FileStatus::Empty
            }
            Ok(records) => {
                let count = records.len();
                let persist_error = store.append(records).err();
                tracing::info!(path = %path.display(), records = count, "replay ingested");
                FileStatus::Added {
                    records: count,
                    persist_error,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "replay skipped");
                FileStatus::Failed(e)
            }
        };
        report.files.push(FileOutcome {
            path: path.clone(),
            status,
        });
    }

    tracing::debug!(
        files = report.files.len(),
        succeeded = report.succeeded(),
        records = report.records_added(),
        "ingest finished"
    );

    report
}

// ── Tests ─────────────────────────────────────────────────────────────────────
