use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while ingesting replays and persisting sessions.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A replay file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The container carried the gzip magic but did not decompress.
    #[error("Failed to decompress replay container: {0}")]
    Decode(#[source] std::io::Error),

    /// No opening `{` was found anywhere in the decoded bytes.
    #[error("No embedded match payload found")]
    NoPayloadFound,

    /// An opening `{` exists but no balanced JSON object follows it.
    #[error("Malformed match payload at byte {offset}: {source}")]
    MalformedPayload {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted session exists but could not be read or decoded.
    #[error("Failed to load session from {path}: {reason}")]
    PersistenceRead { path: PathBuf, reason: String },

    /// The session could not be written back to disk.
    #[error("Failed to save session to {path}: {source}")]
    PersistenceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplayError {
    /// Short machine-friendly label for the error kind, used in ingest reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ReplayError::FileRead { .. } => "file-read",
            ReplayError::Decode(_) => "decode",
            ReplayError::NoPayloadFound => "no-payload",
            ReplayError::MalformedPayload { .. } => "malformed-payload",
            ReplayError::PersistenceRead { .. } => "persistence-read",
            ReplayError::PersistenceWrite { .. } => "persistence-write",
            ReplayError::Config(_) => "config",
            ReplayError::Io(_) => "io",
            ReplayError::Other(_) => "other",
        }
    }
}

/// Convenience alias used throughout the replay crates.
pub type Result<T> = std::result::Result<T, ReplayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReplayError::FileRead {
            path: PathBuf::from("/replays/match.wowsreplay"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/replays/match.wowsreplay"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_decode() {
        let io_err = std::io::Error::new(std::io::ErrorKind::InvalidData, "invalid gzip header");
        let err = ReplayError::Decode(io_err);
        assert_eq!(
            err.to_string(),
            "Failed to decompress replay container: invalid gzip header"
        );
    }

    #[test]
    fn test_error_display_no_payload() {
        assert_eq!(
            ReplayError::NoPayloadFound.to_string(),
            "No embedded match payload found"
        );
    }

    #[test]
    fn test_error_display_malformed_payload() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err = ReplayError::MalformedPayload {
            offset: 12,
            source: json_err,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Malformed match payload at byte 12"));
    }

    #[test]
    fn test_error_display_persistence_read() {
        let err = ReplayError::PersistenceRead {
            path: PathBuf::from("/tmp/session_data.json"),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to load session from /tmp/session_data.json: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_error_display_persistence_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ReplayError::PersistenceWrite {
            path: PathBuf::from("/ro/session_data.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/ro/session_data.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_config() {
        let err = ReplayError::Config("roster file missing".to_string());
        assert_eq!(err.to_string(), "Configuration error: roster file missing");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReplayError = io_err.into();
        assert!(err.to_string().contains("denied"));
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(ReplayError::NoPayloadFound.kind(), "no-payload");
        let err = ReplayError::Decode(std::io::Error::other("bad"));
        assert_eq!(err.kind(), "decode");
    }
}
