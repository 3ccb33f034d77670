mod bootstrap;
mod export;
mod report;

use anyhow::Result;
use replay_core::formatting::format_count;
use replay_core::models::{MatchRecord, Roster};
use replay_core::settings::Settings;
use replay_data::aggregator::{AggregationEngine, RecordFilter};
use replay_data::mapper::RecordMapper;
use replay_data::reader::expand_inputs;
use replay_runtime::ingest::ingest_files;
use replay_runtime::session_store::SessionStore;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_app_dir()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Clan Stats v{} starting", env!("CARGO_PKG_VERSION"));

    // ── Session ───────────────────────────────────────────────────────────────
    let mut store = SessionStore::load(settings.session_path());
    if let Some(warning) = store.load_warning() {
        eprintln!("⚠ {warning}");
    }
    if settings.clear_session {
        match store.clear() {
            Ok(()) => println!("Session cleared ({})", store.path().display()),
            Err(e) => eprintln!("⚠ {e}"),
        }
    }

    // ── Ingest ────────────────────────────────────────────────────────────────
    let files = expand_inputs(&settings.replays);
    if !settings.replays.is_empty() && files.is_empty() {
        eprintln!("⚠ No replay files found in the given paths");
    }
    if !files.is_empty() {
        let report = ingest_files(&mut store, &files, &RecordMapper::default());
        for (path, error) in report.failures() {
            eprintln!("✗ {}: {}", path.display(), error);
        }
        println!(
            "✓ {} of {} file(s) ingested, {} record(s) added",
            report.succeeded(),
            report.files.len(),
            format_count(report.records_added() as u64)
        );
        // Every append rewrites the whole session, so the last failure is the
        // one that left the file stale.
        if let Some((_, error)) = report.persistence_errors().last() {
            eprintln!("⚠ {error}; results are kept for this run only");
        }
    }

    // ── Aggregate ─────────────────────────────────────────────────────────────
    let roster = load_roster(&settings);
    if roster.is_empty() && settings.scope != "all" {
        eprintln!("⚠ Roster is empty; use --roster-file or --member to name clan members");
    }

    let scoped = select_scope(store.records(), &roster, &settings.scope);
    let filter = RecordFilter::new(
        settings.players.iter().cloned(),
        settings.ship_types.iter().cloned(),
        settings.maps.iter().cloned(),
    );
    let filtered = AggregationEngine::filter(scoped.iter().copied(), &filter);

    let mut summary = AggregationEngine::summarize(filtered.iter().copied());
    AggregationEngine::rank(&mut summary);
    let totals = AggregationEngine::totals(&summary);

    // ── Output ────────────────────────────────────────────────────────────────
    println!();
    println!(
        "Session: {} record(s); {} in scope '{}', {} after filters",
        format_count(store.len() as u64),
        format_count(scoped.len() as u64),
        settings.scope,
        format_count(filtered.len() as u64)
    );

    if summary.is_empty() {
        println!("No matching records.");
    } else {
        println!();
        println!("{}", report::summary_table(&summary, &totals).render());
    }

    if settings.show_records && !filtered.is_empty() {
        println!();
        println!("{}", report::records_table(filtered.iter().copied()).render());
    }

    if !scoped.is_empty() {
        let options = AggregationEngine::filter_options(scoped.iter().copied());
        println!();
        println!("{}", report::filter_options_block(&options));
    }

    // ── Export ────────────────────────────────────────────────────────────────
    if let Some(path) = &settings.records_csv {
        match export::export_records(path, filtered.iter().copied(), &roster) {
            Ok(n) => println!("✓ {n} record(s) written to {}", path.display()),
            Err(e) => eprintln!("✗ {e:#}"),
        }
    }
    if let Some(path) = &settings.summary_csv {
        match export::export_summary(path, &summary) {
            Ok(n) => println!("✓ {n} summary row(s) written to {}", path.display()),
            Err(e) => eprintln!("✗ {e:#}"),
        }
    }
    if let Some(path) = &settings.xlsx {
        match export::export_workbook(path, filtered.iter().copied(), &roster, &summary) {
            Ok(()) => println!("✓ Workbook written to {}", path.display()),
            Err(e) => eprintln!("✗ {e:#}"),
        }
    }

    Ok(())
}

/// Roster from `--roster-file` plus every `--member`. An unreadable roster
/// file is reported and treated as empty.
fn load_roster(settings: &Settings) -> Roster {
    let mut roster = match &settings.roster_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => Roster::from_lines(&text),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "roster file unreadable");
                eprintln!("⚠ Could not read roster {}: {e}", path.display());
                Roster::default()
            }
        },
        None => Roster::default(),
    };
    roster.extend(&settings.members);
    tracing::debug!(members = roster.len(), "roster loaded");
    roster
}

/// Records for the requested scope: `clan`, `others` or `all`.
fn select_scope<'a>(records: &'a [MatchRecord], roster: &Roster, scope: &str) -> Vec<&'a MatchRecord> {
    match scope {
        "all" => records.iter().collect(),
        "others" => AggregationEngine::partition(records, roster).1,
        _ => AggregationEngine::partition(records, roster).0,
    }
}
