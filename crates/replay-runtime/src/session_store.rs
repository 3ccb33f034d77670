//! Durable, append-only session of match records.
//!
//! The store owns the in-memory session and the path it is persisted to. The
//! in-memory records are authoritative for the current run: persistence
//! failures are logged and returned, but never undo an append. Loading never
//! fails; a missing or corrupt file yields an empty (or partially recovered)
//! session.

use std::path::{Path, PathBuf};

use replay_core::error::{ReplayError, Result};
use replay_core::models::MatchRecord;
use serde_json::Value;

// ── SessionStore ──────────────────────────────────────────────────────────────

/// Accumulated records plus the file they persist to.
///
/// # Example
/// ```no_run
/// use replay_runtime::session_store::SessionStore;
///
/// let mut store = SessionStore::load("session_data.json");
/// let _ = store.append(Vec::new());
/// println!("{} records", store.len());
/// ```
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    records: Vec<MatchRecord>,
    /// Problem found while loading, if any.
    load_warning: Option<String>,
}

impl SessionStore {
    /// Open the session persisted at `path`.
    ///
    /// * Missing file → empty session, no warning.
    /// * Unreadable or undecodable file → empty session plus a warning.
    /// * A list with some undecodable elements → the decodable ones are kept.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut store = Self {
            path,
            records: Vec::new(),
            load_warning: None,
        };

        if !store.path.exists() {
            tracing::debug!(path = %store.path.display(), "no previous session; starting empty");
            return store;
        }

        match read_records(&store.path) {
            Ok((records, skipped)) => {
                if skipped > 0 {
                    let msg = format!(
                        "skipped {} unreadable record(s) in {}",
                        skipped,
                        store.path.display()
                    );
                    tracing::warn!("{msg}");
                    store.load_warning = Some(msg);
                }
                tracing::info!(
                    records = records.len(),
                    path = %store.path.display(),
                    "session loaded"
                );
                store.records = records;
            }
            Err(e) => {
                tracing::warn!(error = %e, "previous session ignored");
                store.load_warning = Some(e.to_string());
            }
        }

        store
    }

    /// Append one file's batch, in order, then persist.
    ///
    /// An empty batch is a no-op. On `Err` the records are still in memory;
    /// only durability failed.
    pub fn append(&mut self, records: Vec<MatchRecord>) -> Result<usize> {
        let added = records.len();
        if added == 0 {
            return Ok(0);
        }
        self.records.extend(records);
        self.save()?;
        Ok(added)
    }

    /// Persist the full session, replacing the previous file atomically.
    pub fn save(&self) -> Result<()> {
        write_records(&self.path, &self.records).map_err(|source| {
            let err = ReplayError::PersistenceWrite {
                path: self.path.clone(),
                source,
            };
            tracing::warn!(error = %err, "session kept in memory only");
            err
        })?;
        tracing::debug!(
            records = self.records.len(),
            path = %self.path.display(),
            "session saved"
        );
        Ok(())
    }

    /// Drop every record and persist the empty session.
    pub fn clear(&mut self) -> Result<()> {
        tracing::info!(records = self.records.len(), "clearing session");
        self.records.clear();
        self.save()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Warning recorded by [`SessionStore::load`], for display to the user.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Decode a session file, returning the records and the number of elements
/// that had to be skipped.
fn read_records(path: &Path) -> Result<(Vec<MatchRecord>, usize)> {
    let read_err = |reason: String| ReplayError::PersistenceRead {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
    let document: Value = serde_json::from_str(&content).map_err(|e| read_err(e.to_string()))?;
    let Value::Array(items) = document else {
        return Err(read_err("expected a list of records".to_string()));
    };

    let total = items.len();
    let records: Vec<MatchRecord> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| match serde_json::from_value::<MatchRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!(error = %e, "unreadable session record");
                None
            }
        })
        .collect();
    let skipped = total - records.len();

    Ok((records, skipped))
}

fn write_records(path: &Path, records: &[MatchRecord]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec(records).map_err(std::io::Error::other)?;

    // Write to a temp file then rename so a crash never leaves half a session.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
