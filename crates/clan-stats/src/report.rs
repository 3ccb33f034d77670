//! Plain-text tables for the terminal.
//!
//! Column widths are measured with `unicode-width` so that player names in
//! CJK or with emoji still line up.

use replay_core::formatting::{format_count, format_match_time, format_number};
use replay_core::models::{CountField, MatchRecord, PlayerSummary};
use replay_data::aggregator::FilterOptions;
use unicode_width::UnicodeWidthStr;

// ── TextTable ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Minimal column-aligned table with an optional footer row.
#[derive(Debug, Clone)]
pub struct TextTable {
    columns: Vec<(String, Align)>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, Align)>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|(h, a)| (h.into(), a)).collect(),
            rows: Vec::new(),
            footer: None,
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn set_footer(&mut self, row: Vec<String>) {
        self.footer = Some(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|(h, _)| h.width()).collect();
        for row in self.rows.iter().chain(self.footer.iter()) {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.width());
            }
        }
        widths
    }

    fn render_line(&self, cells: &[String], widths: &[usize]) -> String {
        let parts: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, ((_, align), &width))| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(cell.width()));
                match align {
                    Align::Left => format!("{cell}{pad}"),
                    Align::Right => format!("{pad}{cell}"),
                }
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let headers: Vec<String> = self.columns.iter().map(|(h, _)| h.clone()).collect();
        let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let rule = "─".repeat(rule_len);

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(self.render_line(&headers, &widths));
        out.push(rule.clone());
        for row in &self.rows {
            out.push(self.render_line(row, &widths));
        }
        if let Some(footer) = &self.footer {
            out.push(rule);
            out.push(self.render_line(footer, &widths));
        }
        out.join("\n")
    }
}

// ── Report builders ───────────────────────────────────────────────────────────

fn summary_cells(rank: String, row: &PlayerSummary) -> Vec<String> {
    let mut cells = vec![
        rank,
        row.player_name.clone(),
        format_count(row.battles),
        format_number(row.average_damage(), 0),
    ];
    cells.extend(CountField::ALL.iter().map(|&f| format_count(row.count(f))));
    cells
}

/// Ranked player summary with a totals footer.
pub fn summary_table(ranked: &[PlayerSummary], totals: &PlayerSummary) -> TextTable {
    let mut columns = vec![
        ("#".to_string(), Align::Right),
        ("Player".to_string(), Align::Left),
        ("Battles".to_string(), Align::Right),
        ("Avg Dmg".to_string(), Align::Right),
    ];
    columns.extend(
        CountField::ALL
            .iter()
            .map(|f| (f.label().to_string(), Align::Right)),
    );

    let mut table = TextTable::new(columns);
    for (i, row) in ranked.iter().enumerate() {
        table.push_row(summary_cells((i + 1).to_string(), row));
    }
    table.set_footer(summary_cells(String::new(), totals));
    table
}

/// One line per record, in session order.
pub fn records_table<'a, I>(records: I) -> TextTable
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut table = TextTable::new([
        ("Player", Align::Left),
        ("Ship", Align::Left),
        ("Type", Align::Left),
        ("Map", Align::Left),
        ("Played (UTC)", Align::Left),
        ("Damage", Align::Right),
        ("XP", Align::Right),
        ("Kills", Align::Right),
    ]);
    for r in records {
        table.push_row(vec![
            r.player_name.clone(),
            r.ship_name.clone(),
            r.ship_type.clone(),
            r.map_name.clone(),
            format_match_time(r.match_timestamp),
            format_count(r.damage_dealt),
            format_count(r.xp),
            format_count(r.kills),
        ]);
    }
    table
}

/// Values available to `--player`, `--ship-type` and `--map`.
pub fn filter_options_block(options: &FilterOptions) -> String {
    let line = |label: &str, values: &[String]| {
        if values.is_empty() {
            format!("  {label:<11}-")
        } else {
            format!("  {label:<11}{}", values.join(", "))
        }
    };
    [
        "Filter values:".to_string(),
        line("players", &options.players),
        line("ship types", &options.ship_types),
        line("maps", &options.maps),
    ]
    .join("\n")
}
