//! Roster partitioning, record filtering and per-player rollups.

use std::collections::{HashMap, HashSet};

use replay_core::models::{MatchRecord, PlayerSummary, Roster};

// ── RecordFilter ──────────────────────────────────────────────────────────────

/// Membership filter over players, ship types and maps.
///
/// An empty set lets every value through for that dimension; non-empty sets
/// combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub players: HashSet<String>,
    pub ship_types: HashSet<String>,
    pub maps: HashSet<String>,
}

impl RecordFilter {
    pub fn new<P, S, M>(players: P, ship_types: S, maps: M) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            players: players.into_iter().map(Into::into).collect(),
            ship_types: ship_types.into_iter().map(Into::into).collect(),
            maps: maps.into_iter().map(Into::into).collect(),
        }
    }

    /// `true` when no dimension is restricted.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.ship_types.is_empty() && self.maps.is_empty()
    }

    pub fn matches(&self, record: &MatchRecord) -> bool {
        allows(&self.players, &record.player_name)
            && allows(&self.ship_types, &record.ship_type)
            && allows(&self.maps, &record.map_name)
    }
}

fn allows(set: &HashSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

// ── FilterOptions ─────────────────────────────────────────────────────────────

/// Distinct values available to each filter, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub players: Vec<String>,
    pub ship_types: Vec<String>,
    pub maps: Vec<String>,
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

/// Stateless helpers over a record set.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Split records into `(clan, other)` by exact roster membership.
    /// Both halves keep input order.
    pub fn partition<'a, I>(records: I, roster: &Roster) -> (Vec<&'a MatchRecord>, Vec<&'a MatchRecord>)
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        records
            .into_iter()
            .partition(|r| roster.contains(&r.player_name))
    }

    /// Records that pass `filter`, in input order.
    pub fn filter<'a, I>(records: I, filter: &RecordFilter) -> Vec<&'a MatchRecord>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        records.into_iter().filter(|r| filter.matches(r)).collect()
    }

    /// One rollup per distinct player, in order of first appearance.
    ///
    /// Players absent from `records` get no row.
    pub fn summarize<'a, I>(records: I) -> Vec<PlayerSummary>
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut rows: Vec<PlayerSummary> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for record in records {
            let slot = *index.entry(record.player_name.as_str()).or_insert_with(|| {
                rows.push(PlayerSummary::new(record.player_name.clone()));
                rows.len() - 1
            });
            rows[slot].add_record(record);
        }

        rows
    }

    /// Order by total damage, highest first. The sort is stable, so equal
    /// damage keeps first-appearance order.
    pub fn rank(summaries: &mut [PlayerSummary]) {
        summaries.sort_by(|a, b| b.damage_dealt.cmp(&a.damage_dealt));
    }

    /// Column totals across a summary table.
    pub fn totals(summaries: &[PlayerSummary]) -> PlayerSummary {
        let mut totals = PlayerSummary::new("Total");
        for row in summaries {
            totals.merge(row);
        }
        totals
    }

    /// Distinct players, ship types and maps present in `records`.
    pub fn filter_options<'a, I>(records: I) -> FilterOptions
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut options = FilterOptions::default();
        let mut seen: [HashSet<&'a str>; 3] = Default::default();

        for record in records {
            if seen[0].insert(&record.player_name) {
                options.players.push(record.player_name.clone());
            }
            if seen[1].insert(&record.ship_type) {
                options.ship_types.push(record.ship_type.clone());
            }
            if seen[2].insert(&record.map_name) {
                options.maps.push(record.map_name.clone());
            }
        }

        options
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
