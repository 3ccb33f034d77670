use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

// ── TimestampProcessor ────────────────────────────────────────────────────────

/// Parses match timestamps from replay payloads and persisted sessions.
///
/// Every entry point returns `Option`: an unknown time is a valid state for a
/// match record, so nothing here ever fails.
pub struct TimestampProcessor;

impl TimestampProcessor {
    /// Interpret a payload value as Unix epoch seconds.
    ///
    /// Handles:
    /// * JSON integer → seconds.
    /// * JSON float   → seconds, fractional part truncated.
    /// * JSON string  → must hold an integer (surrounding whitespace allowed).
    ///
    /// An epoch of `0` is treated as "no time recorded" and yields `None`, as
    /// does anything outside chrono's representable range.
    pub fn parse_epoch(value: &Value) -> Option<DateTime<Utc>> {
        let secs = match value {
            Value::Number(n) => {
                if let Some(secs) = n.as_i64() {
                    secs
                } else {
                    let f = n.as_f64()?;
                    if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                        return None;
                    }
                    f.trunc() as i64
                }
            }
            Value::String(s) => s.trim().parse::<i64>().ok()?,
            _ => return None,
        };

        if secs == 0 {
            return None;
        }
        DateTime::from_timestamp(secs, 0)
    }

    /// Parse a timestamp as written into a persisted session.
    ///
    /// Accepts `null`, an RFC 3339 / ISO 8601 string (with or without an
    /// offset), or an epoch number.
    pub fn parse(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Null => None,
            Value::String(s) => Self::parse_str(s.as_str()),
            Value::Number(_) => Self::parse_epoch(value),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        // Offset-less ISO strings are taken as UTC.
        const FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
        ];

        for fmt in FORMATS {
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }

        // Epoch seconds that went through a string round-trip.
        if let Ok(secs) = s.parse::<i64>() {
            return Self::parse_epoch(&Value::from(secs));
        }

        warn!(
            "TimestampProcessor: could not parse timestamp string \"{}\"",
            s
        );
        None
    }
}

/// Serde helper for `Option<DateTime<Utc>>` fields that may have been written
/// as strings, numbers or `null`.
///
/// Unparseable values degrade to `None` rather than failing the whole record.
pub fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(TimestampProcessor::parse(&value))
}

// ── FieldCoercion ─────────────────────────────────────────────────────────────

/// Lenient conversions from payload values into record field types.
///
/// A value of the wrong shape yields `None`; callers substitute their default.
pub struct FieldCoercion;

impl FieldCoercion {
    /// Non-negative integer counter.
    ///
    /// Integers must be `>= 0`; non-negative finite floats are truncated.
    /// Strings, booleans, negatives and containers are rejected.
    pub fn count(value: &Value) -> Option<u64> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(v) = n.as_u64() {
            return Some(v);
        }
        if n.is_i64() {
            // Only negative integers reach this branch.
            return None;
        }
        let f = n.as_f64()?;
        if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 {
            Some(f.trunc() as u64)
        } else {
            None
        }
    }

    /// Text field; only JSON strings are accepted.
    pub fn text(value: &Value) -> Option<String> {
        value.as_str().map(str::to_string)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── parse_epoch ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_epoch_integer() {
        let dt = TimestampProcessor::parse_epoch(&json!(1_700_000_000)).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_epoch_float_truncates() {
        let dt = TimestampProcessor::parse_epoch(&json!(1_700_000_000.9)).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_epoch_numeric_string() {
        let dt = TimestampProcessor::parse_epoch(&json!(" 1700000000 ")).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_epoch_zero_is_unknown() {
        assert!(TimestampProcessor::parse_epoch(&json!(0)).is_none());
    }

    #[test]
    fn test_parse_epoch_rejects_non_numeric() {
        assert!(TimestampProcessor::parse_epoch(&json!("yesterday")).is_none());
        assert!(TimestampProcessor::parse_epoch(&json!("1700000000.5")).is_none());
        assert!(TimestampProcessor::parse_epoch(&json!(null)).is_none());
        assert!(TimestampProcessor::parse_epoch(&json!(true)).is_none());
        assert!(TimestampProcessor::parse_epoch(&json!([1700000000])).is_none());
    }

    #[test]
    fn test_parse_epoch_out_of_range() {
        assert!(TimestampProcessor::parse_epoch(&json!(i64::MAX)).is_none());
        assert!(TimestampProcessor::parse_epoch(&json!(1e300)).is_none());
    }

    // ── parse ────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_rfc3339() {
        let dt = TimestampProcessor::parse(&json!("2023-11-14T22:13:20+00:00")).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_z_suffix() {
        let dt = TimestampProcessor::parse(&json!("2023-11-14T22:13:20Z")).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_naive_iso_as_utc() {
        let dt = TimestampProcessor::parse(&json!("2023-11-14T22:13:20")).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_number() {
        let dt = TimestampProcessor::parse(&json!(1_700_000_000)).unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_null_and_garbage() {
        assert!(TimestampProcessor::parse(&json!(null)).is_none());
        assert!(TimestampProcessor::parse(&json!("")).is_none());
        assert!(TimestampProcessor::parse(&json!("not a date")).is_none());
        assert!(TimestampProcessor::parse(&json!({"t": 1})).is_none());
    }

    // ── deserialize_optional_timestamp ──────────────────────────────────────

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn test_deserialize_optional_timestamp_variants() {
        let h: Holder = serde_json::from_str(r#"{"at": "2023-11-14T22:13:20Z"}"#).unwrap();
        assert_eq!(h.at.unwrap().timestamp(), 1_700_000_000);

        let h: Holder = serde_json::from_str(r#"{"at": 1700000000}"#).unwrap();
        assert_eq!(h.at.unwrap().timestamp(), 1_700_000_000);

        let h: Holder = serde_json::from_str(r#"{"at": null}"#).unwrap();
        assert!(h.at.is_none());

        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(h.at.is_none());

        let h: Holder = serde_json::from_str(r#"{"at": "garbage"}"#).unwrap();
        assert!(h.at.is_none());
    }

    // ── FieldCoercion ────────────────────────────────────────────────────────

    #[test]
    fn test_count_accepts_non_negative_numbers() {
        assert_eq!(FieldCoercion::count(&json!(0)), Some(0));
        assert_eq!(FieldCoercion::count(&json!(125_000)), Some(125_000));
        assert_eq!(FieldCoercion::count(&json!(42.7)), Some(42));
    }

    #[test]
    fn test_count_rejects_wrong_types() {
        assert_eq!(FieldCoercion::count(&json!(-5)), None);
        assert_eq!(FieldCoercion::count(&json!(-0.5)), None);
        assert_eq!(FieldCoercion::count(&json!("100")), None);
        assert_eq!(FieldCoercion::count(&json!(true)), None);
        assert_eq!(FieldCoercion::count(&json!(null)), None);
        assert_eq!(FieldCoercion::count(&json!({"v": 1})), None);
    }

    #[test]
    fn test_text_only_accepts_strings() {
        assert_eq!(
            FieldCoercion::text(&json!("Yamato")),
            Some("Yamato".to_string())
        );
        assert_eq!(FieldCoercion::text(&json!(7)), None);
        assert_eq!(FieldCoercion::text(&json!(null)), None);
    }
}
