//! Domain layer: Core clinical types and pure lookups.
//!
//! This module contains plain Rust types with no I/O.
//! All types are serializable and implement strict validation.

mod estimate;
mod patient;
mod reading;
mod recommendation;
mod stage;
mod trend;

pub use estimate::{
    clamp_gfr, round_to, to_percent, Confidence, GfrResult, Method, GFR_CEILING, GFR_FLOOR,
};
pub use patient::{PatientProfile, ProfileError, Sex};
pub use reading::{parse_timestamp, valid_readings, HistoricalReading, HistoryEntry};
pub use recommendation::{generate_recommendation, symptom_guidance};
pub use stage::{interpret_gfr, CkdStage, StageResult};
pub use trend::{
    ClinicalSignificance, LongTermTrend, Pattern, Stability, TrendCategory, TrendResult,
};

#[cfg(test)]
pub(crate) use patient::sample_profile;
