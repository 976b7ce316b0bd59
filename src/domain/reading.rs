//! Historical GFR readings.
//!
//! History arrives from outside the engine in loosely typed form. Entries are
//! parsed into [`HistoricalReading`]s and anything unusable is dropped here,
//! before trend computation ever sees it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A prior reading as supplied by the caller or the history store.
///
/// Deserialization never fails: a wrongly typed field becomes `None` and a
/// non-object entry becomes an empty one, so the entry is dropped later by
/// [`valid_readings`] instead of rejecting the whole input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct HistoryEntry {
    /// ISO-8601 timestamp
    pub date: Option<String>,

    pub estimated_gfr: Option<f64>,
}

impl From<Value> for HistoryEntry {
    fn from(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let date = match map.get("date") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        // `estimatedGFR` is the legacy key; the current key wins when both are usable.
        let estimated_gfr = ["estimated_gfr", "estimatedGFR"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_f64));

        Self {
            date,
            estimated_gfr,
        }
    }
}

impl HistoryEntry {
    #[must_use]
    pub fn new(date: impl Into<String>, estimated_gfr: f64) -> Self {
        Self {
            date: Some(date.into()),
            estimated_gfr: Some(estimated_gfr),
        }
    }
}

/// A validated prior reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalReading {
    pub date: DateTime<Utc>,
    pub estimated_gfr: f64,
}

impl HistoricalReading {
    /// Validate a raw entry.
    ///
    /// Returns `None` when the date is missing or unparsable, or the value is
    /// missing or not finite.
    #[must_use]
    pub fn from_entry(entry: &HistoryEntry) -> Option<Self> {
        let estimated_gfr = entry.estimated_gfr.filter(|v| v.is_finite())?;
        let date = parse_timestamp(entry.date.as_deref()?)?;
        Some(Self {
            date,
            estimated_gfr,
        })
    }
}

impl From<HistoricalReading> for HistoryEntry {
    fn from(reading: HistoricalReading) -> Self {
        Self {
            date: Some(reading.date.to_rfc3339()),
            estimated_gfr: Some(reading.estimated_gfr),
        }
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`Z` or numeric offset), naive date-times (taken as UTC)
/// and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // Normalize a lowercase `z` UTC suffix.
    if let Some(stripped) = raw.strip_suffix('z') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{stripped}Z")) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Validate raw history, dropping unusable entries.
///
/// The returned readings are in chronological order (oldest first).
#[must_use]
pub fn valid_readings(history: &[HistoryEntry]) -> Vec<HistoricalReading> {
    let mut readings: Vec<HistoricalReading> = history
        .iter()
        .filter_map(|entry| {
            let reading = HistoricalReading::from_entry(entry);
            if reading.is_none() {
                tracing::warn!(
                    "Discarding history entry with unusable date or value (date present: {}, value present: {})",
                    entry.date.is_some(),
                    entry.estimated_gfr.is_some()
                );
            }
            reading
        })
        .collect();

    readings.sort_by_key(|r| r.date);
    readings
}
