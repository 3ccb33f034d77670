use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user application directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".clan-stats";

/// File name of the default persisted session.
pub const SESSION_FILE_NAME: &str = "session_data.json";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Clan statistics from World of Warships replay files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "clan-stats",
    about = "Accumulate replay results into a session and rank clan members",
    version
)]
pub struct Settings {
    /// Replay files or directories to ingest (directories are searched for
    /// `.wowsreplay` files)
    #[arg(value_name = "REPLAY")]
    pub replays: Vec<PathBuf>,

    /// Session file that accumulates records across runs
    #[arg(long, env = "CLAN_STATS_SESSION")]
    pub session_file: Option<PathBuf>,

    /// Newline-delimited list of clan member names
    #[arg(long)]
    pub roster_file: Option<PathBuf>,

    /// Clan member name (repeatable, merged with --roster-file)
    #[arg(short = 'm', long = "member", value_name = "NAME")]
    pub members: Vec<String>,

    /// Only include these players (repeatable)
    #[arg(long = "player", value_name = "NAME")]
    pub players: Vec<String>,

    /// Only include these ship types (repeatable)
    #[arg(long = "ship-type", value_name = "TYPE")]
    pub ship_types: Vec<String>,

    /// Only include these maps (repeatable)
    #[arg(long = "map", value_name = "MAP")]
    pub maps: Vec<String>,

    /// Which side of the roster partition to report on
    #[arg(long, default_value = "clan", value_parser = ["clan", "others", "all"])]
    pub scope: String,

    /// Print the filtered record table, not just the summary
    #[arg(long)]
    pub show_records: bool,

    /// Export the filtered record table as CSV
    #[arg(long, value_name = "PATH")]
    pub records_csv: Option<PathBuf>,

    /// Export the player summary table as CSV
    #[arg(long, value_name = "PATH")]
    pub summary_csv: Option<PathBuf>,

    /// Export records and summary as a two-sheet spreadsheet
    #[arg(long, value_name = "PATH")]
    pub xlsx: Option<PathBuf>,

    /// Empty the accumulated session before ingesting
    #[arg(long)]
    pub clear_session: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Forget saved session/roster paths
    #[arg(long)]
    pub forget: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.clan-stats/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl LastUsedParams {
    /// Default path to the persisted parameters.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&home_dir())
    }

    /// Parameters path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the params file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, fill in defaults, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.forget {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_defaults(settings, config_path);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (or env) always wins over persisted values.
        if settings.session_file.is_none() {
            settings.session_file = last.session_file;
        }
        if settings.roster_file.is_none() {
            settings.roster_file = last.roster_file;
        }
        if !is_arg_explicitly_set(&matches, "scope") {
            if let Some(v) = last.scope {
                settings.scope = v;
            }
        }

        settings = Self::resolve_defaults(settings, config_path);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used parameters");
        }

        settings
    }

    /// Session file to use, falling back to `session_data.json` next to the
    /// last-used parameters.
    pub fn session_path(&self) -> PathBuf {
        self.session_file
            .clone()
            .unwrap_or_else(|| default_session_path_in(&home_dir()))
    }

    /// Fill the session path and apply the `--debug` flag.
    fn resolve_defaults(mut settings: Settings, config_path: &Path) -> Settings {
        if settings.session_file.is_none() {
            let app_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            settings.session_file = Some(app_dir.join(SESSION_FILE_NAME));
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

/// Default session path rooted at `base_dir`.
pub fn default_session_path_in(base_dir: &Path) -> PathBuf {
    base_dir.join(APP_DIR_NAME).join(SESSION_FILE_NAME)
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            session_file: s.session_file.clone(),
            roster_file: s.roster_file.clone(),
            scope: Some(s.scope.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
