//! # Nephra
//!
//! Kidney filtration (GFR) estimation engine.
//!
//! This crate provides:
//! - GFR estimation from a serum creatinine value (CKD-EPI 2021) or, when no
//!   lab value exists, from a symptom and vital-sign profile
//! - CKD stage classification (G1-G5) and patient-facing guidance
//! - Trend analysis of a new estimate against prior readings
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core clinical types (profile, stage, estimate, readings, trend)
//! - `engine`: Pure estimation and trend computations
//! - `ports`: Trait definitions for external collaborators (history storage)
//! - `adapters`: Concrete implementations (in-memory store, log sanitization)
//! - `application`: Use cases orchestrating the engine and ports
//! - `request`: Input and output records of the calling layer

pub mod adapters;
pub mod application;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod request;

pub use domain::{CkdStage, GfrResult, PatientProfile, Sex, TrendResult};
pub use request::{assess, Assessment, AssessmentRequest};

/// Result type for Nephra operations
pub type Result<T> = std::result::Result<T, NephraError>;

/// Main error type for Nephra
#[derive(Debug, thiserror::Error)]
pub enum NephraError {
    #[error("Invalid patient data: {0}")]
    Profile(#[from] domain::ProfileError),

    #[error("Invalid patient data: {}", join_errors(.0))]
    InvalidProfile(Vec<domain::ProfileError>),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join_errors(errors: &[domain::ProfileError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
