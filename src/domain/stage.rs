//! CKD stage classification.
//!
//! Maps a GFR value (mL/min/1.73m²) onto the fixed G1-G5 bands.

use serde::{Deserialize, Serialize};

/// Chronic kidney disease severity band derived from GFR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CkdStage {
    G1,
    G2,
    G3a,
    G3b,
    G4,
    G5,
}

impl CkdStage {
    /// Classify a GFR value.
    ///
    /// Returns `None` for NaN or infinite input.
    #[must_use]
    pub fn from_gfr(gfr: f64) -> Option<Self> {
        if !gfr.is_finite() {
            return None;
        }

        let stage = if gfr >= 90.0 {
            Self::G1
        } else if gfr >= 60.0 {
            Self::G2
        } else if gfr >= 45.0 {
            Self::G3a
        } else if gfr >= 30.0 {
            Self::G3b
        } else if gfr >= 15.0 {
            Self::G4
        } else {
            Self::G5
        };
        Some(stage)
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::G1 => "Normal or high kidney function",
            Self::G2 => "Mildly decreased kidney function",
            Self::G3a => "Mildly to moderately decreased kidney function",
            Self::G3b => "Moderately to severely decreased kidney function",
            Self::G4 => "Severely decreased kidney function",
            Self::G5 => "Kidney failure",
        }
    }

    /// Short code as used in clinical notation.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::G1 => "G1",
            Self::G2 => "G2",
            Self::G3a => "G3a",
            Self::G3b => "G3b",
            Self::G4 => "G4",
            Self::G5 => "G5",
        }
    }
}

impl std::fmt::Display for CkdStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Stage code plus its description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: CkdStage,
    pub description: String,
}

impl From<CkdStage> for StageResult {
    fn from(stage: CkdStage) -> Self {
        Self {
            stage,
            description: stage.description().to_string(),
        }
    }
}

/// Classify a GFR value into a stage and description.
#[must_use]
pub fn interpret_gfr(gfr: f64) -> Option<StageResult> {
    CkdStage::from_gfr(gfr).map(StageResult::from)
}
