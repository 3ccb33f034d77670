//! CSV and spreadsheet export of filtered records and of the ranked summary.
//!
//! Both formats share the same row types, so column names and values match
//! between a CSV file and the corresponding worksheet.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use replay_core::models::{MatchRecord, PlayerSummary, Roster};
use rust_xlsxwriter::Workbook;
use serde::Serialize;

/// Worksheet holding one row per record.
pub const RECORDS_SHEET: &str = "Records";

/// Worksheet holding the ranked per-player summary.
pub const SUMMARY_SHEET: &str = "Summary";

#[derive(Serialize)]
struct RecordRow<'a> {
    player_name: &'a str,
    ship_name: &'a str,
    ship_type: &'a str,
    damage_dealt: u64,
    xp: u64,
    kills: u64,
    fires_caused: u64,
    floods_caused: u64,
    spotting_assists: u64,
    damage_assisted: u64,
    capture_points: u64,
    damage_received: u64,
    /// RFC 3339, empty when the match time is unknown.
    match_timestamp: String,
    map_name: &'a str,
    is_clan: bool,
}

impl<'a> RecordRow<'a> {
    fn new(r: &'a MatchRecord, roster: &Roster) -> Self {
        Self {
            player_name: &r.player_name,
            ship_name: &r.ship_name,
            ship_type: &r.ship_type,
            damage_dealt: r.damage_dealt,
            xp: r.xp,
            kills: r.kills,
            fires_caused: r.fires_caused,
            floods_caused: r.floods_caused,
            spotting_assists: r.spotting_assists,
            damage_assisted: r.damage_assisted,
            capture_points: r.capture_points,
            damage_received: r.damage_received,
            match_timestamp: r
                .match_timestamp
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            map_name: &r.map_name,
            is_clan: roster.contains(&r.player_name),
        }
    }
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    rank: usize,
    player_name: &'a str,
    battles: u64,
    /// Rounded to two decimals.
    average_damage: f64,
    damage_dealt: u64,
    xp: u64,
    kills: u64,
    fires_caused: u64,
    floods_caused: u64,
    spotting_assists: u64,
    damage_assisted: u64,
    capture_points: u64,
    damage_received: u64,
}

impl<'a> SummaryRow<'a> {
    fn new(rank: usize, s: &'a PlayerSummary) -> Self {
        Self {
            rank,
            player_name: &s.player_name,
            battles: s.battles,
            average_damage: (s.average_damage() * 100.0).round() / 100.0,
            damage_dealt: s.damage_dealt,
            xp: s.xp,
            kills: s.kills,
            fires_caused: s.fires_caused,
            floods_caused: s.floods_caused,
            spotting_assists: s.spotting_assists,
            damage_assisted: s.damage_assisted,
            capture_points: s.capture_points,
            damage_received: s.damage_received,
        }
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Write one row per record, flagging roster members in `is_clan`.
pub fn write_records<'a, W, I>(out: W, records: I, roster: &Roster) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;
    for record in records {
        writer.serialize(RecordRow::new(record, roster))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

/// Write the ranked summary; ranks start at 1.
pub fn write_summary<W: Write>(out: W, ranked: &[PlayerSummary]) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    for (i, s) in ranked.iter().enumerate() {
        writer.serialize(SummaryRow::new(i + 1, s))?;
    }
    writer.flush()?;
    Ok(ranked.len())
}

pub fn export_records<'a, I>(path: &Path, records: I, roster: &Roster) -> Result<usize>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(file, records, roster)
        .with_context(|| format!("Failed to write records to {}", path.display()))
}

pub fn export_summary(path: &Path, ranked: &[PlayerSummary]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_summary(file, ranked)
        .with_context(|| format!("Failed to write summary to {}", path.display()))
}

// ── Spreadsheet ───────────────────────────────────────────────────────────────

/// Build a workbook with a records sheet and a summary sheet. Headers are
/// written even when a table is empty.
pub fn build_workbook<'a, I>(
    records: I,
    roster: &Roster,
    ranked: &[PlayerSummary],
) -> Result<Workbook>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name(RECORDS_SHEET)?;
    let template = MatchRecord::default();
    sheet.serialize_headers(0, 0, &RecordRow::new(&template, roster))?;
    for record in records {
        sheet.serialize(&RecordRow::new(record, roster))?;
    }

    let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
    let template = PlayerSummary::new("");
    sheet.serialize_headers(0, 0, &SummaryRow::new(0, &template))?;
    for (i, s) in ranked.iter().enumerate() {
        sheet.serialize(&SummaryRow::new(i + 1, s))?;
    }

    Ok(workbook)
}

/// Write the records and summary sheets to `path`.
pub fn export_workbook<'a, I>(
    path: &Path,
    records: I,
    roster: &Roster,
    ranked: &[PlayerSummary],
) -> Result<()>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut workbook = build_workbook(records, roster, ranked)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook to {}", path.display()))?;
    Ok(())
}
