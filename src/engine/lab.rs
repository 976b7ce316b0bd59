//! Creatinine-based estimation (CKD-EPI 2021, no race term).

use crate::domain::{clamp_gfr, round_to, Confidence, GfrResult, Method, Sex};

pub const CKD_EPI_LABEL: &str = "CKD-EPI 2021";

/// Confidence score reported for lab-based estimates.
const LAB_CONFIDENCE_SCORE: u8 = 95;

/// Exponent applied above the creatinine knot, for both sexes.
const HIGH_SEGMENT_EXPONENT: f64 = -1.200;

const AGE_BASE: f64 = 0.9938;

/// Sex-specific CKD-EPI 2021 coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CkdEpiCoefficients {
    /// Creatinine knot (mg/dL)
    pub kappa: f64,
    /// Exponent for the segment at or below the knot
    pub alpha: f64,
    pub sex_factor: f64,
}

impl CkdEpiCoefficients {
    #[must_use]
    pub fn for_sex(sex: Sex) -> Self {
        match sex {
            Sex::Female => Self {
                kappa: 0.7,
                alpha: -0.241,
                sex_factor: 1.012,
            },
            Sex::Male => Self {
                kappa: 0.9,
                alpha: -0.302,
                sex_factor: 1.0,
            },
        }
    }
}

/// Raw (unclamped, unrounded) CKD-EPI 2021 value.
#[must_use]
pub fn ckd_epi_2021(age: u32, sex: Sex, creatinine: f64) -> f64 {
    let c = CkdEpiCoefficients::for_sex(sex);
    let ratio = creatinine / c.kappa;

    142.0
        * ratio.min(1.0).powf(c.alpha)
        * ratio.max(1.0).powf(HIGH_SEGMENT_EXPONENT)
        * AGE_BASE.powf(f64::from(age))
        * c.sex_factor
}

/// Estimate GFR from a serum creatinine value.
///
/// Callers must pass a positive, finite creatinine.
#[must_use]
pub fn estimate(age: u32, sex: Sex, creatinine: f64) -> GfrResult {
    let raw = ckd_epi_2021(age, sex, creatinine);
    let gfr_estimate = round_to(clamp_gfr(raw), 2);

    tracing::debug!(
        "CKD-EPI: age={}, sex={}, creatinine={:.2} -> raw {:.2}, reported {:.2}",
        age,
        sex,
        creatinine,
        raw,
        gfr_estimate
    );

    GfrResult {
        gfr_estimate,
        method: Method::CreatinineBased,
        confidence: Confidence::High,
        confidence_score: LAB_CONFIDENCE_SCORE,
        calculation_label: CKD_EPI_LABEL,
    }
}
