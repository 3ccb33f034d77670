use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::data_processors::deserialize_optional_timestamp;

/// Placeholder used for every text field the replay did not provide.
pub const UNKNOWN: &str = "Unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// One player's result in one match.
///
/// Every field carries a deterministic default so that partially populated
/// payloads and older session files always deserialize. `match_timestamp` is
/// the only optional field: an unknown match time is a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Player display name.
    #[serde(default = "unknown")]
    pub player_name: String,
    /// Ship the player sailed.
    #[serde(default = "unknown")]
    pub ship_name: String,
    /// Ship class, e.g. `"Destroyer"`.
    #[serde(default = "unknown")]
    pub ship_type: String,
    #[serde(default)]
    pub damage_dealt: u64,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub kills: u64,
    #[serde(default)]
    pub fires_caused: u64,
    #[serde(default)]
    pub floods_caused: u64,
    #[serde(default)]
    pub spotting_assists: u64,
    #[serde(default)]
    pub damage_assisted: u64,
    #[serde(default)]
    pub capture_points: u64,
    #[serde(default)]
    pub damage_received: u64,
    /// When the match was played, if the replay recorded it.
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub match_timestamp: Option<DateTime<Utc>>,
    /// Map display name.
    #[serde(default = "unknown")]
    pub map_name: String,
}

impl Default for MatchRecord {
    fn default() -> Self {
        Self {
            player_name: unknown(),
            ship_name: unknown(),
            ship_type: unknown(),
            damage_dealt: 0,
            xp: 0,
            kills: 0,
            fires_caused: 0,
            floods_caused: 0,
            spotting_assists: 0,
            damage_assisted: 0,
            capture_points: 0,
            damage_received: 0,
            match_timestamp: None,
            map_name: unknown(),
        }
    }
}

impl MatchRecord {
    /// Read a counter field by its canonical identifier.
    pub fn count(&self, field: CountField) -> u64 {
        match field {
            CountField::DamageDealt => self.damage_dealt,
            CountField::Xp => self.xp,
            CountField::Kills => self.kills,
            CountField::FiresCaused => self.fires_caused,
            CountField::FloodsCaused => self.floods_caused,
            CountField::SpottingAssists => self.spotting_assists,
            CountField::DamageAssisted => self.damage_assisted,
            CountField::CapturePoints => self.capture_points,
            CountField::DamageReceived => self.damage_received,
        }
    }

    /// Mutable access to a counter field by its canonical identifier.
    pub fn count_mut(&mut self, field: CountField) -> &mut u64 {
        match field {
            CountField::DamageDealt => &mut self.damage_dealt,
            CountField::Xp => &mut self.xp,
            CountField::Kills => &mut self.kills,
            CountField::FiresCaused => &mut self.fires_caused,
            CountField::FloodsCaused => &mut self.floods_caused,
            CountField::SpottingAssists => &mut self.spotting_assists,
            CountField::DamageAssisted => &mut self.damage_assisted,
            CountField::CapturePoints => &mut self.capture_points,
            CountField::DamageReceived => &mut self.damage_received,
        }
    }

    /// Mutable access to a per-player text field.
    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::PlayerName => &mut self.player_name,
            TextField::ShipName => &mut self.ship_name,
            TextField::ShipType => &mut self.ship_type,
        }
    }
}

// ── Canonical field identifiers ───────────────────────────────────────────────

/// Per-player text fields of a [`MatchRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    PlayerName,
    ShipName,
    ShipType,
}

impl TextField {
    pub const ALL: [TextField; 3] = [
        TextField::PlayerName,
        TextField::ShipName,
        TextField::ShipType,
    ];

    /// Canonical snake_case name, as used in session files and exports.
    pub fn name(self) -> &'static str {
        match self {
            TextField::PlayerName => "player_name",
            TextField::ShipName => "ship_name",
            TextField::ShipType => "ship_type",
        }
    }
}

/// Summable counter fields of a [`MatchRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountField {
    DamageDealt,
    Xp,
    Kills,
    FiresCaused,
    FloodsCaused,
    SpottingAssists,
    DamageAssisted,
    CapturePoints,
    DamageReceived,
}

impl CountField {
    pub const ALL: [CountField; 9] = [
        CountField::DamageDealt,
        CountField::Xp,
        CountField::Kills,
        CountField::FiresCaused,
        CountField::FloodsCaused,
        CountField::SpottingAssists,
        CountField::DamageAssisted,
        CountField::CapturePoints,
        CountField::DamageReceived,
    ];

    /// Canonical snake_case name, as used in session files and exports.
    pub fn name(self) -> &'static str {
        match self {
            CountField::DamageDealt => "damage_dealt",
            CountField::Xp => "xp",
            CountField::Kills => "kills",
            CountField::FiresCaused => "fires_caused",
            CountField::FloodsCaused => "floods_caused",
            CountField::SpottingAssists => "spotting_assists",
            CountField::DamageAssisted => "damage_assisted",
            CountField::CapturePoints => "capture_points",
            CountField::DamageReceived => "damage_received",
        }
    }

    /// Column header used in rendered tables.
    pub fn label(self) -> &'static str {
        match self {
            CountField::DamageDealt => "Damage",
            CountField::Xp => "XP",
            CountField::Kills => "Kills",
            CountField::FiresCaused => "Fires",
            CountField::FloodsCaused => "Floods",
            CountField::SpottingAssists => "Spotting",
            CountField::DamageAssisted => "Assisted",
            CountField::CapturePoints => "Captures",
            CountField::DamageReceived => "Received",
        }
    }
}

// ── PlayerSummary ─────────────────────────────────────────────────────────────

/// Per-player rollup over a set of [`MatchRecord`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_name: String,
    /// Number of records (battles) summed into this row.
    pub battles: u64,
    pub damage_dealt: u64,
    pub xp: u64,
    pub kills: u64,
    pub fires_caused: u64,
    pub floods_caused: u64,
    pub spotting_assists: u64,
    pub damage_assisted: u64,
    pub capture_points: u64,
    pub damage_received: u64,
}

impl PlayerSummary {
    /// Empty rollup for `player_name`.
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            battles: 0,
            damage_dealt: 0,
            xp: 0,
            kills: 0,
            fires_caused: 0,
            floods_caused: 0,
            spotting_assists: 0,
            damage_assisted: 0,
            capture_points: 0,
            damage_received: 0,
        }
    }

    /// Add one record's counters and count it as a battle.
    ///
    /// Sums saturate at `u64::MAX`.
    pub fn add_record(&mut self, record: &MatchRecord) {
        for field in CountField::ALL {
            let slot = self.count_mut(field);
            *slot = slot.saturating_add(record.count(field));
        }
        self.battles = self.battles.saturating_add(1);
    }

    /// Fold another summary's totals into this one. Sums saturate.
    pub fn merge(&mut self, other: &PlayerSummary) {
        for field in CountField::ALL {
            let slot = self.count_mut(field);
            *slot = slot.saturating_add(other.count(field));
        }
        self.battles = self.battles.saturating_add(other.battles);
    }

    /// Summed value of a counter field.
    pub fn count(&self, field: CountField) -> u64 {
        match field {
            CountField::DamageDealt => self.damage_dealt,
            CountField::Xp => self.xp,
            CountField::Kills => self.kills,
            CountField::FiresCaused => self.fires_caused,
            CountField::FloodsCaused => self.floods_caused,
            CountField::SpottingAssists => self.spotting_assists,
            CountField::DamageAssisted => self.damage_assisted,
            CountField::CapturePoints => self.capture_points,
            CountField::DamageReceived => self.damage_received,
        }
    }

    fn count_mut(&mut self, field: CountField) -> &mut u64 {
        match field {
            CountField::DamageDealt => &mut self.damage_dealt,
            CountField::Xp => &mut self.xp,
            CountField::Kills => &mut self.kills,
            CountField::FiresCaused => &mut self.fires_caused,
            CountField::FloodsCaused => &mut self.floods_caused,
            CountField::SpottingAssists => &mut self.spotting_assists,
            CountField::DamageAssisted => &mut self.damage_assisted,
            CountField::CapturePoints => &mut self.capture_points,
            CountField::DamageReceived => &mut self.damage_received,
        }
    }

    /// Mean damage per battle, `0.0` for an empty rollup.
    pub fn average_damage(&self) -> f64 {
        if self.battles == 0 {
            return 0.0;
        }
        self.damage_dealt as f64 / self.battles as f64
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

/// Set of clan member names, matched exactly against `player_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: HashSet<String>,
}

impl Roster {
    /// Parse a newline-delimited list. Entries are trimmed; blank lines are
    /// ignored.
    pub fn from_lines(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn insert(&mut self, name: &str) {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            self.members.insert(trimmed.to_string());
        }
    }

    pub fn contains(&self, player_name: &str) -> bool {
        self.members.contains(player_name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Roster {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut roster = Roster::default();
        for name in iter {
            roster.insert(name.as_ref());
        }
        roster
    }
}

impl<S: AsRef<str>> Extend<S> for Roster {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
