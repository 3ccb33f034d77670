//! Payload → [`MatchRecord`] normalization.
//!
//! All knowledge of the replay's field names lives in [`FieldTable`]: each
//! canonical record field maps to one source key and one default. Mapping is
//! total: missing or wrong-typed values take the default, so the mapper never
//! fails and emits exactly one record per player entry.

use chrono::{DateTime, Utc};
use replay_core::data_processors::{FieldCoercion, TimestampProcessor};
use replay_core::models::{CountField, MatchRecord, TextField, UNKNOWN};
use serde_json::Value;

use crate::payload::Payload;

// ── Field table ───────────────────────────────────────────────────────────────

/// Canonical field a table row fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Text(TextField),
    Count(CountField),
}

impl RecordField {
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Text(f) => f.name(),
            RecordField::Count(f) => f.name(),
        }
    }
}

/// Value substituted when the source key is missing or unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDefault {
    Text(String),
    Count(u64),
}

/// One row of the extraction table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: RecordField,
    pub source_key: String,
    pub default: FieldDefault,
}

impl FieldSpec {
    pub fn text(field: TextField, source_key: &str) -> Self {
        Self {
            field: RecordField::Text(field),
            source_key: source_key.to_string(),
            default: FieldDefault::Text(UNKNOWN.to_string()),
        }
    }

    pub fn count(field: CountField, source_key: &str) -> Self {
        Self {
            field: RecordField::Count(field),
            source_key: source_key.to_string(),
            default: FieldDefault::Count(0),
        }
    }

    /// Write this row's value (or default) from `entry` into `record`.
    fn apply(&self, entry: Option<&Value>, record: &mut MatchRecord) {
        let source = entry.and_then(|e| e.get(&self.source_key));
        match (self.field, &self.default) {
            (RecordField::Text(field), FieldDefault::Text(default)) => {
                *record.text_mut(field) = source
                    .and_then(FieldCoercion::text)
                    .unwrap_or_else(|| default.clone());
            }
            (RecordField::Count(field), FieldDefault::Count(default)) => {
                *record.count_mut(field) = source.and_then(FieldCoercion::count).unwrap_or(*default);
            }
            // A mismatched default kind means the row was hand-edited wrongly;
            // keep the record's own default for that field.
            _ => {}
        }
    }
}

/// Source key names for the match-level fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKeys {
    pub players: String,
    pub timestamp: String,
    pub map_name: String,
}

impl Default for MatchKeys {
    fn default() -> Self {
        Self {
            players: "players".to_string(),
            timestamp: "dateTime".to_string(),
            map_name: "mapDisplayName".to_string(),
        }
    }
}

/// Complete source-key mapping for one replay format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    pub match_keys: MatchKeys,
    pub player_fields: Vec<FieldSpec>,
}

impl Default for FieldTable {
    /// Field names used by World of Warships replay metadata.
    fn default() -> Self {
        Self {
            match_keys: MatchKeys::default(),
            player_fields: vec![
                FieldSpec::text(TextField::PlayerName, "name"),
                FieldSpec::text(TextField::ShipName, "shipName"),
                FieldSpec::text(TextField::ShipType, "shipType"),
                FieldSpec::count(CountField::DamageDealt, "damageDealt"),
                FieldSpec::count(CountField::Xp, "xp"),
                FieldSpec::count(CountField::Kills, "frags"),
                FieldSpec::count(CountField::FiresCaused, "fires"),
                FieldSpec::count(CountField::FloodsCaused, "floodings"),
                FieldSpec::count(CountField::SpottingAssists, "spottedShips"),
                FieldSpec::count(CountField::DamageAssisted, "damageAssisted"),
                FieldSpec::count(CountField::CapturePoints, "capturePoints"),
                FieldSpec::count(CountField::DamageReceived, "damageReceived"),
            ],
        }
    }
}

impl FieldTable {
    /// Point `field` at a different source key. Returns `false` when the
    /// table has no row for that field.
    pub fn set_source_key(&mut self, field: RecordField, source_key: &str) -> bool {
        match self.player_fields.iter_mut().find(|s| s.field == field) {
            Some(spec) => {
                spec.source_key = source_key.to_string();
                true
            }
            None => false,
        }
    }

    /// Source key currently mapped to `field`.
    pub fn source_key(&self, field: RecordField) -> Option<&str> {
        self.player_fields
            .iter()
            .find(|s| s.field == field)
            .map(|s| s.source_key.as_str())
    }
}

// ── RecordMapper ──────────────────────────────────────────────────────────────

/// Match-level values shared by every record of one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    pub timestamp: Option<DateTime<Utc>>,
    pub map_name: String,
}

/// Converts decoded payloads into canonical records.
#[derive(Debug, Clone, Default)]
pub struct RecordMapper {
    table: FieldTable,
}

impl RecordMapper {
    pub fn new(table: FieldTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Player entries of the payload; absent or non-list values yield none.
    pub fn player_entries<'a>(&self, payload: &'a Payload) -> &'a [Value] {
        payload
            .get(&self.table.match_keys.players)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Timestamp and map name for the whole match.
    pub fn match_context(&self, payload: &Payload) -> MatchContext {
        let keys = &self.table.match_keys;
        MatchContext {
            timestamp: payload
                .get(&keys.timestamp)
                .and_then(TimestampProcessor::parse_epoch),
            map_name: payload
                .get(&keys.map_name)
                .and_then(FieldCoercion::text)
                .unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Map one player entry. Non-object entries produce an all-default record.
    pub fn map_player(&self, entry: &Value, context: &MatchContext) -> MatchRecord {
        let entry = entry.is_object().then_some(entry);
        let mut record = MatchRecord {
            match_timestamp: context.timestamp,
            map_name: context.map_name.clone(),
            ..MatchRecord::default()
        };
        for spec in &self.table.player_fields {
            spec.apply(entry, &mut record);
        }
        record
    }

    /// One record per player entry, in payload order.
    pub fn map(&self, payload: &Payload) -> Vec<MatchRecord> {
        let context = self.match_context(payload);
        self.player_entries(payload)
            .iter()
            .map(|entry| self.map_player(entry, &context))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("test payload must be an object, got {other}"),
        }
    }

    fn full_player() -> Value {
        json!({
            "name": "Alice",
            "shipName": "Shimakaze",
            "shipType": "Destroyer",
            "damageDealt": 84_500,
            "xp": 1_920,
            "frags": 2,
            "fires": 1,
            "floodings": 3,
            "spottedShips": 4,
            "damageAssisted": 12_000,
            "capturePoints": 100,
            "damageReceived": 9_300,
        })
    }

    // ── map ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_map_full_entry() {
        let p = payload(json!({
            "players": [full_player()],
            "dateTime": 1_700_000_000,
            "mapDisplayName": "Two Brothers",
        }));
        let records = RecordMapper::default().map(&p);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.player_name, "Alice");
        assert_eq!(r.ship_name, "Shimakaze");
        assert_eq!(r.ship_type, "Destroyer");
        assert_eq!(r.damage_dealt, 84_500);
        assert_eq!(r.xp, 1_920);
        assert_eq!(r.kills, 2);
        assert_eq!(r.fires_caused, 1);
        assert_eq!(r.floods_caused, 3);
        assert_eq!(r.spotting_assists, 4);
        assert_eq!(r.damage_assisted, 12_000);
        assert_eq!(r.capture_points, 100);
        assert_eq!(r.damage_received, 9_300);
        assert_eq!(r.match_timestamp.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(r.map_name, "Two Brothers");
    }

    #[test]
    fn test_map_one_record_per_entry_in_order() {
        let p = payload(json!({
            "players": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
        }));
        let names: Vec<String> = RecordMapper::default()
            .map(&p)
            .into_iter()
            .map(|r| r.player_name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_map_missing_fields_default() {
        let p = payload(json!({"players": [{}]}));
        let records = RecordMapper::default().map(&p);
        assert_eq!(records, vec![MatchRecord::default()]);
    }

    #[test]
    fn test_map_wrong_types_fall_back_to_default() {
        let p = payload(json!({
            "players": [{
                "name": 42,
                "shipName": null,
                "damageDealt": "lots",
                "xp": -10,
                "frags": [1],
                "fires": 2.9,
            }],
            "dateTime": "soon",
            "mapDisplayName": {"id": 7},
        }));
        let r = &RecordMapper::default().map(&p)[0];
        assert_eq!(r.player_name, UNKNOWN);
        assert_eq!(r.ship_name, UNKNOWN);
        assert_eq!(r.damage_dealt, 0);
        assert_eq!(r.xp, 0);
        assert_eq!(r.kills, 0);
        assert_eq!(r.fires_caused, 2);
        assert!(r.match_timestamp.is_none());
        assert_eq!(r.map_name, UNKNOWN);
    }

    #[test]
    fn test_map_non_object_entry_yields_default_record() {
        let p = payload(json!({
            "players": [7, "ghost", {"name": "Real"}],
            "mapDisplayName": "Ocean",
        }));
        let records = RecordMapper::default().map(&p);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].player_name, UNKNOWN);
        assert_eq!(records[0].map_name, "Ocean");
        assert_eq!(records[1].player_name, UNKNOWN);
        assert_eq!(records[2].player_name, "Real");
    }

    #[test]
    fn test_map_absent_players_is_empty() {
        let p = payload(json!({"mapDisplayName": "Ocean"}));
        assert!(RecordMapper::default().map(&p).is_empty());
    }

    #[test]
    fn test_map_players_not_a_list_is_empty() {
        let p = payload(json!({"players": {"name": "Alice"}}));
        assert!(RecordMapper::default().map(&p).is_empty());
    }

    // ── match_context ────────────────────────────────────────────────────────

    #[test]
    fn test_match_context_timestamp_variants() {
        let mapper = RecordMapper::default();
        let ctx = mapper.match_context(&payload(json!({"dateTime": "1700000000"})));
        assert_eq!(ctx.timestamp.unwrap().timestamp(), 1_700_000_000);

        let ctx = mapper.match_context(&payload(json!({"dateTime": 0})));
        assert!(ctx.timestamp.is_none());

        let ctx = mapper.match_context(&payload(json!({})));
        assert!(ctx.timestamp.is_none());
        assert_eq!(ctx.map_name, UNKNOWN);
    }

    // ── FieldTable ───────────────────────────────────────────────────────────

    #[test]
    fn test_default_table_covers_every_player_field() {
        let table = FieldTable::default();
        for field in TextField::ALL {
            assert!(table.source_key(RecordField::Text(field)).is_some());
        }
        for field in CountField::ALL {
            assert!(table.source_key(RecordField::Count(field)).is_some());
        }
        assert_eq!(table.player_fields.len(), 12);
    }

    #[test]
    fn test_custom_source_key() {
        let mut table = FieldTable::default();
        assert!(table.set_source_key(RecordField::Count(CountField::Kills), "kills"));
        table.match_keys.players = "vehicles".to_string();
        let mapper = RecordMapper::new(table);

        let p = payload(json!({"vehicles": [{"kills": 5, "frags": 1}]}));
        let records = mapper.map(&p);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kills, 5);
    }

    #[test]
    fn test_set_source_key_missing_row() {
        let mut table = FieldTable::default();
        table
            .player_fields
            .retain(|s| s.field != RecordField::Count(CountField::Xp));
        assert!(!table.set_source_key(RecordField::Count(CountField::Xp), "exp"));
    }

    #[test]
    fn test_record_field_name() {
        assert_eq!(
            RecordField::Count(CountField::SpottingAssists).name(),
            "spotting_assists"
        );
        assert_eq!(RecordField::Text(TextField::ShipName).name(), "ship_name");
    }
}
