//! Input and output records exchanged with the calling layer.
//!
//! `AssessmentRequest` is the loosely typed record a request handler parses
//! from its body; `Assessment` is what it serializes back. Trend fields are
//! flattened into the output and left out entirely when there is no usable
//! history.

use serde::{Deserialize, Serialize};

use crate::domain::{
    generate_recommendation, round_to, symptom_guidance, to_percent, CkdStage,
    ClinicalSignificance, Confidence, HistoryEntry, LongTermTrend, Method, Pattern,
    PatientProfile, Sex, Stability, TrendCategory, TrendResult,
};
use crate::engine::{self, Estimation};
use crate::{NephraError, Result};

/// Raw assessment input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// Caller-side patient identifier, used only to look up and store history
    #[serde(default)]
    pub patient_id: Option<String>,

    pub age: u32,

    /// Free-form sex string; parsed into [`Sex`]
    #[serde(alias = "gender")]
    pub sex: String,

    pub weight_kg: f64,
    pub height_cm: f64,
    pub hydration_level: u8,
    pub systolic_bp: u16,
    pub diastolic_bp: u16,
    pub stress: u8,
    pub fatigue: u8,
    pub pain: u8,

    /// Serum creatinine in mg/dL
    #[serde(default, alias = "serum_creatinine")]
    pub creatinine: Option<f64>,

    /// Prior readings, in any order
    #[serde(default, alias = "previous_gfr_readings")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl AssessmentRequest {
    /// Parse and validate the profile part of the request.
    ///
    /// # Errors
    /// Returns `NephraError::Profile` for an unrecognized sex value and
    /// `NephraError::InvalidProfile` for out-of-range fields.
    pub fn to_profile(&self) -> Result<PatientProfile> {
        let sex: Sex = self.sex.parse()?;

        let profile = PatientProfile {
            age: self.age,
            sex,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            hydration_level: self.hydration_level,
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            stress: self.stress,
            fatigue: self.fatigue,
            pain: self.pain,
            serum_creatinine: self.creatinine,
        };
        profile.validate().map_err(NephraError::InvalidProfile)?;
        Ok(profile)
    }
}

/// Trend fields of the output record, rounded for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub trend: TrendCategory,
    pub trend_description: String,
    pub absolute_change: f64,
    pub percent_change: f64,
    pub average_change: f64,
    pub long_term_trend: LongTermTrend,
    pub stability: Stability,
    pub variability: f64,
    pub rate_of_change: f64,
    pub pattern: Pattern,
    /// Whole percentage (0 to 100)
    pub pattern_confidence: u8,
    pub clinical_significance: ClinicalSignificance,
    pub data_points: usize,
}

impl From<&TrendResult> for TrendSummary {
    fn from(t: &TrendResult) -> Self {
        Self {
            trend: t.trend,
            trend_description: t.trend_description().to_string(),
            absolute_change: round_to(t.absolute_change, 2),
            percent_change: round_to(t.percent_change, 2),
            average_change: round_to(t.average_change, 2),
            long_term_trend: t.long_term_trend,
            stability: t.stability,
            variability: round_to(t.variability, 2),
            rate_of_change: round_to(t.rate_of_change, 2),
            pattern: t.pattern,
            pattern_confidence: to_percent(t.pattern_confidence),
            clinical_significance: t.clinical_significance,
            data_points: t.data_points,
        }
    }
}

/// Assessment output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub gfr_estimate: f64,
    pub method: Method,
    pub confidence: Confidence,
    /// Whole percentage (0 to 100)
    pub confidence_score: u8,
    pub calculation: String,
    pub stage: CkdStage,
    pub stage_description: String,
    pub recommendation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptom_guidance: Option<String>,

    #[serde(flatten)]
    pub trend: Option<TrendSummary>,
}

impl Assessment {
    /// Render an estimation into the output record.
    #[must_use]
    pub fn from_estimation(estimation: &Estimation, profile: &PatientProfile) -> Self {
        let result = &estimation.result;
        Self {
            gfr_estimate: result.gfr_estimate,
            method: result.method,
            confidence: result.confidence,
            confidence_score: result.confidence_score,
            calculation: result.calculation_label.to_string(),
            stage: estimation.stage.stage,
            stage_description: estimation.stage.description.clone(),
            recommendation: generate_recommendation(estimation.stage.stage, result.method),
            symptom_guidance: symptom_guidance(profile).map(str::to_string),
            trend: estimation.trend.as_ref().map(TrendSummary::from),
        }
    }
}

/// Run a full assessment on a request, using only the history it carries.
///
/// # Errors
/// Returns a typed error if the request fails validation.
pub fn assess(request: &AssessmentRequest) -> Result<Assessment> {
    let profile = request.to_profile()?;
    let estimation = engine::estimate(&profile, request.history.as_deref())?;
    Ok(Assessment::from_estimation(&estimation, &profile))
}

#[cfg(test)]
pub(crate) fn sample_request() -> AssessmentRequest {
    AssessmentRequest {
        patient_id: None,
        age: 58,
        sex: "female".to_string(),
        weight_kg: 78.0,
        height_cm: 162.0,
        hydration_level: 5,
        systolic_bp: 138,
        diastolic_bp: 85,
        stress: 6,
        fatigue: 7,
        pain: 4,
        creatinine: None,
        history: None,
    }
}
