//! Engine layer: GFR estimation, staging and trend analysis.
//!
//! Everything here is a pure function of its inputs. There is no shared
//! state, so calls can run on any thread concurrently.

pub mod lab;
pub mod profile;
pub mod trend;

use crate::domain::{
    interpret_gfr, GfrResult, HistoryEntry, PatientProfile, StageResult, TrendCategory, TrendResult,
};
use crate::{NephraError, Result};

/// Output of a single estimation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimation {
    pub result: GfrResult,
    pub stage: StageResult,
    /// Present only when the history held at least one usable reading
    pub trend: Option<TrendResult>,
}

/// Estimate GFR for a profile, staging it and analyzing any history.
///
/// Uses the creatinine branch when the profile carries a positive creatinine
/// value, otherwise the profile branch.
///
/// # Errors
/// Returns `NephraError::InvalidProfile` if the profile fails validation.
pub fn estimate(profile: &PatientProfile, history: Option<&[HistoryEntry]>) -> Result<Estimation> {
    profile.validate().map_err(NephraError::InvalidProfile)?;

    let result = match profile.usable_creatinine() {
        Some(creatinine) => lab::estimate(profile.age, profile.sex, creatinine),
        None => profile::estimate(profile),
    };

    let stage = interpret_gfr(result.gfr_estimate).ok_or_else(|| {
        NephraError::Validation(format!("Estimate {} is not a finite number", result.gfr_estimate))
    })?;

    let trend = match history {
        Some(entries) if !entries.is_empty() => {
            let analysis = trend::analyze(result.gfr_estimate, entries);
            if analysis.trend == TrendCategory::InsufficientData {
                tracing::warn!(
                    "History supplied ({} entries) but none were usable; omitting trend",
                    entries.len()
                );
                None
            } else {
                Some(analysis)
            }
        }
        _ => None,
    };

    tracing::info!(
        "Estimated GFR {:.2} via {} (confidence {}), stage {}",
        result.gfr_estimate,
        result.method,
        result.confidence,
        stage.stage
    );

    Ok(Estimation {
        result,
        stage,
        trend,
    })
}
