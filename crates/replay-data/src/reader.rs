//! Replay file discovery and the per-file decode pipeline.
//!
//! Each file goes through [`ContainerDecoder`] → [`PayloadExtractor`] →
//! [`RecordMapper`]. The pipeline is a pure function of the file's bytes; it
//! never touches the session.

use std::path::{Path, PathBuf};

use replay_core::error::{ReplayError, Result};
use replay_core::models::MatchRecord;
use tracing::{debug, warn};

use crate::container::ContainerDecoder;
use crate::mapper::RecordMapper;
use crate::payload::PayloadExtractor;

/// File extension used by game replays.
pub const REPLAY_EXTENSION: &str = "wowsreplay";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.wowsreplay` files recursively under `dir`, sorted by path.
pub fn find_replay_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Replay path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_replay_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand a mix of file and directory arguments into the list of files to
/// ingest. Explicit files are kept whatever their extension, in argument
/// order; directories expand to their sorted replay files.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = find_replay_files(input);
            if found.is_empty() {
                warn!("No .{} files found in {}", REPLAY_EXTENSION, input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Decode one replay held in memory into match records.
pub fn parse_replay(bytes: &[u8], mapper: &RecordMapper) -> Result<Vec<MatchRecord>> {
    let raw = ContainerDecoder::decode(bytes)?;
    let payload = PayloadExtractor::extract(&raw)?;
    let records = mapper.map(&payload);
    debug!(
        bytes = bytes.len(),
        decoded = raw.len(),
        records = records.len(),
        "replay parsed"
    );
    Ok(records)
}

/// Read and decode one replay file.
pub fn parse_replay_file(path: &Path, mapper: &RecordMapper) -> Result<Vec<MatchRecord>> {
    let bytes = std::fs::read(path).map_err(|source| ReplayError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_replay(&bytes, mapper)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_replay_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(REPLAY_EXTENSION))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
