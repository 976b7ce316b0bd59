//! Application layer: Use cases and services.
//!
//! This module orchestrates the engine with ports to implement
//! the assessment use case.

mod assessment;
mod config;

pub use assessment::AssessmentService;
pub use config::AssessmentConfig;
