//! In-memory adapter: Implementation of HistoryStore.
//!
//! Keeps readings per patient in a process-local map. Used by the CLI and
//! tests, and as the reference behavior for real backends.
//!
//! # Mutex Behavior
//!
//! The map is protected by a `Mutex`. A poisoned mutex (from a panic in
//! another thread) fails closed with `StorageError::LockPoisoned`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{HistoricalReading, HistoryEntry};
use crate::ports::HistoryStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("History store lock poisoned")]
    LockPoisoned,

    #[error("Invalid reading: {0}")]
    InvalidReading(String),
}

/// Process-local history store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    readings: Mutex<HashMap<String, Vec<HistoricalReading>>>,
}

impl InMemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<HistoricalReading>>>, StorageError> {
        self.readings.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl HistoryStore for InMemoryHistoryStore {
    type Error = StorageError;

    fn load_history(&self, patient_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, Self::Error> {
        let map = self.lock()?;
        let Some(readings) = map.get(patient_id) else {
            return Ok(Vec::new());
        };

        let skip = readings.len().saturating_sub(limit);
        Ok(readings
            .iter()
            .skip(skip)
            .copied()
            .map(HistoryEntry::from)
            .collect())
    }

    fn save_reading(&self, patient_id: &str, reading: &HistoricalReading) -> Result<(), Self::Error> {
        if !reading.estimated_gfr.is_finite() {
            return Err(StorageError::InvalidReading(format!(
                "non-finite GFR {}",
                reading.estimated_gfr
            )));
        }

        let mut map = self.lock()?;
        let readings = map.entry(patient_id.to_string()).or_default();
        // Keep chronological order so `load_history` can take the tail.
        let pos = readings.partition_point(|r| r.date <= reading.date);
        readings.insert(pos, *reading);
        Ok(())
    }

    fn count_readings(&self, patient_id: &str) -> Result<usize, Self::Error> {
        Ok(self.lock()?.get(patient_id).map_or(0, Vec::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_timestamp;

    fn reading(date: &str, gfr: f64) -> HistoricalReading {
        HistoricalReading {
            date: parse_timestamp(date).expect("Should parse"),
            estimated_gfr: gfr,
        }
    }

    #[test]
    fn test_reading_crud() {
        let store = InMemoryHistoryStore::new();

        // No readings initially
        assert_eq!(store.count_readings("p1").expect("Should count"), 0);
        assert!(store.load_history("p1", 10).expect("Should load").is_empty());

        store
            .save_reading("p1", &reading("2025-04-08T10:00:00Z", 64.1))
            .expect("Should save");
        store
            .save_reading("p1", &reading("2025-04-01T10:00:00Z", 65.3))
            .expect("Should save");
        store
            .save_reading("p2", &reading("2025-04-01T10:00:00Z", 90.0))
            .expect("Should save");

        assert_eq!(store.count_readings("p1").expect("Should count"), 2);

        let history = store.load_history("p1", 10).expect("Should load");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].estimated_gfr, Some(65.3));
        assert_eq!(history[1].estimated_gfr, Some(64.1));
        assert_eq!(store.count_readings("p2").expect("Should count"), 1);
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let store = InMemoryHistoryStore::new();
        for (day, gfr) in [(1, 70.0), (2, 69.0), (3, 68.0), (4, 67.0)] {
            store
                .save_reading("p1", &reading(&format!("2025-04-0{day}"), gfr))
                .expect("Should save");
        }

        let history = store.load_history("p1", 2).expect("Should load");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].estimated_gfr, Some(68.0));
        assert_eq!(history[1].estimated_gfr, Some(67.0));
    }

    #[test]
    fn test_rejects_non_finite_reading() {
        let store = InMemoryHistoryStore::new();
        let result = store.save_reading("p1", &reading("2025-04-01", f64::NAN));
        assert!(matches!(result, Err(StorageError::InvalidReading(_))));
    }
}
