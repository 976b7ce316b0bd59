//! GFR estimate types.
//!
//! Represents the output of a single estimation, whichever branch produced it.

use serde::{Deserialize, Serialize};

/// Lowest reportable estimate (mL/min/1.73m²).
pub const GFR_FLOOR: f64 = 15.0;

/// Highest reportable estimate (mL/min/1.73m²).
pub const GFR_CEILING: f64 = 120.0;

/// Which calculation branch produced an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Serum creatinine lab value (CKD-EPI 2021)
    CreatinineBased,
    /// Symptom and vital-sign approximation
    SymptomVitalBased,
}

impl Method {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatinineBased => "creatinine_based",
            Self::SymptomVitalBased => "symptom_vital_based",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence tier of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    ModerateLow,
    Moderate,
    ModerateHigh,
    High,
}

impl Confidence {
    /// Map a profile-branch confidence score (0.0 to 1.0) to a tier.
    #[must_use]
    pub fn from_profile_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::ModerateHigh
        } else if score >= 0.6 {
            Self::Moderate
        } else {
            Self::ModerateLow
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModerateLow => "moderate-low",
            Self::Moderate => "moderate",
            Self::ModerateHigh => "moderate-high",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single GFR estimation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GfrResult {
    /// Estimated GFR, always within [`GFR_FLOOR`, `GFR_CEILING`]
    pub gfr_estimate: f64,

    pub method: Method,

    pub confidence: Confidence,

    /// Confidence as a whole percentage (0 to 100)
    pub confidence_score: u8,

    /// Name of the formula used
    pub calculation_label: &'static str,
}

/// Clamp a raw estimate into the reportable range.
#[must_use]
pub fn clamp_gfr(raw: f64) -> f64 {
    raw.clamp(GFR_FLOOR, GFR_CEILING)
}

/// Round a value to `decimals` places for presentation.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Convert a 0.0-1.0 fraction into a whole percentage.
#[must_use]
pub fn to_percent(fraction: f64) -> u8 {
    // Clamped to [0, 100] so the cast cannot truncate.
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(Confidence::from_profile_score(0.40), Confidence::ModerateLow);
        assert_eq!(Confidence::from_profile_score(0.59), Confidence::ModerateLow);
        assert_eq!(Confidence::from_profile_score(0.60), Confidence::Moderate);
        assert_eq!(Confidence::from_profile_score(0.79), Confidence::Moderate);
        assert_eq!(Confidence::from_profile_score(0.80), Confidence::ModerateHigh);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&Confidence::ModerateLow).expect("Should serialize");
        assert_eq!(json, "\"moderate-low\"");
        let json = serde_json::to_string(&Method::SymptomVitalBased).expect("Should serialize");
        assert_eq!(json, "\"symptom_vital_based\"");
        assert_eq!(Method::CreatinineBased.to_string(), "creatinine_based");
    }

    #[test]
    fn test_clamp_and_round() {
        assert!((clamp_gfr(3.0) - GFR_FLOOR).abs() < f64::EPSILON);
        assert!((clamp_gfr(140.0) - GFR_CEILING).abs() < f64::EPSILON);
        assert!((clamp_gfr(72.5) - 72.5).abs() < f64::EPSILON);
        assert!((round_to(61.23456, 2) - 61.23).abs() < 1e-9);
        assert_eq!(to_percent(0.758), 76);
        assert_eq!(to_percent(-0.2), 0);
        assert_eq!(to_percent(1.7), 100);
    }
}
