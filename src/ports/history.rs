//! History store port: Trait for persisted GFR readings.
//!
//! This trait abstracts whatever backend keeps a patient's prior readings
//! from the application logic.

use crate::domain::{HistoricalReading, HistoryEntry};

/// Trait for per-patient reading storage.
pub trait HistoryStore: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load up to `limit` of the most recent readings for a patient.
    ///
    /// Entries come back in the loosely typed form the engine validates
    /// itself; an unknown patient yields an empty list.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn load_history(&self, patient_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, Self::Error>;

    /// Append a reading to a patient's history.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn save_reading(&self, patient_id: &str, reading: &HistoricalReading) -> Result<(), Self::Error>;

    /// Get the number of stored readings for a patient.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count_readings(&self, patient_id: &str) -> Result<usize, Self::Error>;
}
