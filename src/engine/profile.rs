//! Profile-based estimation from symptoms and vital signs.
//!
//! Used when no creatinine value is available. An age-banded population
//! baseline is scaled by a set of bounded multiplicative factors:
//!
//! | Factor          | Range        |
//! |-----------------|--------------|
//! | sex             | 0.85 - 1.0   |
//! | BMI             | 0.82 - 1.0   |
//! | hydration       | 0.75 - 1.0   |
//! | blood pressure  | 0.80 - 1.0   |
//! | symptoms        | 0.82 - 1.0   |
//! | body surface    | 0.85 - 1.15  |

use crate::domain::{
    clamp_gfr, round_to, to_percent, Confidence, GfrResult, Method, PatientProfile, Sex,
};

pub const PROFILE_LABEL: &str = "profile-based approximation";

/// Piecewise-linear baseline: (segment start age, value at start, slope per year).
const AGE_SEGMENTS: [(f64, f64, f64); 7] = [
    (18.0, 118.0, -0.25),
    (30.0, 115.0, -0.8),
    (40.0, 107.0, -0.9),
    (50.0, 98.0, -1.0),
    (60.0, 88.0, -1.1),
    (70.0, 77.0, -1.2),
    (80.0, 65.0, -1.3),
];

const FEMALE_FACTOR: f64 = 0.85;

const STRESS_WEIGHT: f64 = 0.35;
const FATIGUE_WEIGHT: f64 = 0.35;
const PAIN_WEIGHT: f64 = 0.30;

/// Symptom level at which interaction bonuses apply.
const SYMPTOM_INTERACTION_LEVEL: u8 = 7;
const STRESS_FATIGUE_BONUS: f64 = 0.05;
const FATIGUE_PAIN_BONUS: f64 = 0.04;
const STRESS_PAIN_BONUS: f64 = 0.03;
const ALL_SYMPTOMS_BONUS: f64 = 0.05;

/// Largest reduction the symptom score can cause.
const MAX_SYMPTOM_REDUCTION: f64 = 0.18;

const BSA_REFERENCE: f64 = 1.73;
const BSA_EXPONENT: f64 = 0.4;
const BSA_FACTOR_MIN: f64 = 0.85;
const BSA_FACTOR_MAX: f64 = 1.15;

const BASE_CONFIDENCE: f64 = 0.75;
const HIGH_SYMPTOM_SCORE: f64 = 0.7;

/// Population baseline GFR for an age.
#[must_use]
pub fn age_baseline(age: u32) -> f64 {
    let age = f64::from(age).max(AGE_SEGMENTS[0].0);
    let (start, value, slope) = AGE_SEGMENTS
        .iter()
        .rev()
        .find(|(start, _, _)| age >= *start)
        .copied()
        .unwrap_or(AGE_SEGMENTS[0]);
    value + slope * (age - start)
}

/// WHO-style BMI categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiCategory {
    SeverelyUnderweight,
    ModeratelyUnderweight,
    MildlyUnderweight,
    Normal,
    Overweight,
    ObeseClassI,
    ObeseClassII,
    VerySeverelyObese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 16.0 {
            Self::SeverelyUnderweight
        } else if bmi < 17.0 {
            Self::ModeratelyUnderweight
        } else if bmi < 18.5 {
            Self::MildlyUnderweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else if bmi < 35.0 {
            Self::ObeseClassI
        } else if bmi < 40.0 {
            Self::ObeseClassII
        } else {
            Self::VerySeverelyObese
        }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        match self {
            Self::SeverelyUnderweight => 0.90,
            Self::ModeratelyUnderweight => 0.94,
            Self::MildlyUnderweight => 0.97,
            Self::Normal => 1.0,
            Self::Overweight => 0.97,
            Self::ObeseClassI => 0.93,
            Self::ObeseClassII => 0.88,
            Self::VerySeverelyObese => 0.82,
        }
    }
}

/// Hydration factor.
///
/// Three tiers, each linear in the hydration level, rising toward 1.0:
/// severe (1-3) 0.75-0.85, mild (4-6) 0.88-0.94, well hydrated (7-10) 0.96-1.0.
#[must_use]
pub fn hydration_factor(level: u8) -> f64 {
    let level = f64::from(level.clamp(1, 10));
    let factor = if level <= 3.0 {
        0.75 + 0.05 * (level - 1.0)
    } else if level <= 6.0 {
        0.88 + 0.03 * (level - 4.0)
    } else {
        0.96 + (0.04 / 3.0) * (level - 7.0)
    };
    factor.min(1.0)
}

/// Blood pressure category by systolic/diastolic thresholds (mmHg).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodPressureCategory {
    Low,
    Normal,
    Elevated,
    Stage1Hypertension,
    Stage2Hypertension,
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    #[must_use]
    pub fn from_readings(systolic: u16, diastolic: u16) -> Self {
        if systolic > 180 || diastolic > 120 {
            Self::HypertensiveCrisis
        } else if systolic >= 140 || diastolic >= 90 {
            Self::Stage2Hypertension
        } else if systolic >= 130 || diastolic >= 80 {
            Self::Stage1Hypertension
        } else if systolic < 90 || diastolic < 60 {
            Self::Low
        } else if systolic >= 120 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    /// Multiplier on the baseline; low pressure reduces renal perfusion.
    #[must_use]
    pub fn factor(&self) -> f64 {
        match self {
            Self::HypertensiveCrisis => 0.80,
            Self::Stage2Hypertension => 0.88,
            Self::Stage1Hypertension => 0.94,
            Self::Elevated => 0.98,
            Self::Normal => 1.0,
            Self::Low => 0.90,
        }
    }

    /// Confidence adjustment for this category.
    fn confidence_adjustment(&self) -> f64 {
        match self {
            Self::HypertensiveCrisis | Self::Stage2Hypertension | Self::Low => -0.10,
            Self::Stage1Hypertension => -0.05,
            Self::Elevated => 0.0,
            Self::Normal => 0.05,
        }
    }
}

/// Combined stress/fatigue/pain burden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymptomScore {
    /// Weighted mean on a 0.0-1.0 scale
    pub weighted: f64,
    /// Extra burden from co-occurring high symptoms
    pub interaction_bonus: f64,
    /// `weighted + interaction_bonus`, capped at 1.0
    pub total: f64,
}

impl SymptomScore {
    #[must_use]
    pub fn compute(stress: u8, fatigue: u8, pain: u8) -> Self {
        let scale = |v: u8| f64::from(v.clamp(1, 10));
        let raw = STRESS_WEIGHT * scale(stress)
            + FATIGUE_WEIGHT * scale(fatigue)
            + PAIN_WEIGHT * scale(pain);
        let weighted = (raw - 1.0) / 9.0;

        let high_stress = stress >= SYMPTOM_INTERACTION_LEVEL;
        let high_fatigue = fatigue >= SYMPTOM_INTERACTION_LEVEL;
        let high_pain = pain >= SYMPTOM_INTERACTION_LEVEL;

        let mut interaction_bonus = 0.0;
        if high_stress && high_fatigue {
            interaction_bonus += STRESS_FATIGUE_BONUS;
        }
        if high_fatigue && high_pain {
            interaction_bonus += FATIGUE_PAIN_BONUS;
        }
        if high_stress && high_pain {
            interaction_bonus += STRESS_PAIN_BONUS;
        }
        if high_stress && high_fatigue && high_pain {
            interaction_bonus += ALL_SYMPTOMS_BONUS;
        }

        Self {
            weighted,
            interaction_bonus,
            total: (weighted + interaction_bonus).min(1.0),
        }
    }

    #[must_use]
    pub fn factor(&self) -> f64 {
        1.0 - MAX_SYMPTOM_REDUCTION * self.total
    }
}

/// Body-surface-area factor, `(BSA / 1.73)^0.4`.
#[must_use]
pub fn body_surface_factor(body_surface_area: f64) -> f64 {
    (body_surface_area / BSA_REFERENCE)
        .powf(BSA_EXPONENT)
        .clamp(BSA_FACTOR_MIN, BSA_FACTOR_MAX)
}

/// Every component of a profile-based estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileFactors {
    pub baseline: f64,
    pub sex: f64,
    pub bmi_category: BmiCategory,
    pub bmi: f64,
    pub hydration: f64,
    pub blood_pressure_category: BloodPressureCategory,
    pub blood_pressure: f64,
    pub symptom_score: SymptomScore,
    pub symptoms: f64,
    pub body_surface: f64,
}

impl ProfileFactors {
    #[must_use]
    pub fn compute(profile: &PatientProfile) -> Self {
        let bmi_category = BmiCategory::from_bmi(profile.bmi());
        let blood_pressure_category =
            BloodPressureCategory::from_readings(profile.systolic_bp, profile.diastolic_bp);
        let symptom_score = SymptomScore::compute(profile.stress, profile.fatigue, profile.pain);

        Self {
            baseline: age_baseline(profile.age),
            sex: match profile.sex {
                Sex::Female => FEMALE_FACTOR,
                Sex::Male => 1.0,
            },
            bmi_category,
            bmi: bmi_category.factor(),
            hydration: hydration_factor(profile.hydration_level),
            blood_pressure_category,
            blood_pressure: blood_pressure_category.factor(),
            symptom_score,
            symptoms: symptom_score.factor(),
            body_surface: body_surface_factor(profile.body_surface_area()),
        }
    }

    /// Unclamped estimate: baseline times every factor.
    #[must_use]
    pub fn raw_estimate(&self) -> f64 {
        self.baseline
            * self.sex
            * self.bmi
            * self.hydration
            * self.blood_pressure
            * self.symptoms
            * self.body_surface
    }
}

/// Confidence score (0.0 to 1.0) for a profile-based estimate.
///
/// Starts at 0.75, loses points for each extreme input and gains a little
/// for normal blood pressure and BMI.
#[must_use]
pub fn confidence_score(profile: &PatientProfile, factors: &ProfileFactors) -> f64 {
    let mut score = BASE_CONFIDENCE;

    score += factors.blood_pressure_category.confidence_adjustment();

    if profile.hydration_level <= 2 || profile.hydration_level >= 9 {
        score -= 0.05;
    }

    let bmi = profile.bmi();
    if !(16.0..=35.0).contains(&bmi) {
        score -= 0.10;
    } else if factors.bmi_category == BmiCategory::Normal {
        score += 0.05;
    }

    if factors.symptom_score.total > HIGH_SYMPTOM_SCORE {
        score -= 0.10;
    }

    score.clamp(0.0, 1.0)
}

/// Estimate GFR from a validated profile.
#[must_use]
pub fn estimate(profile: &PatientProfile) -> GfrResult {
    let factors = ProfileFactors::compute(profile);
    let raw = factors.raw_estimate();
    let gfr_estimate = round_to(clamp_gfr(raw), 2);
    let score = confidence_score(profile, &factors);

    tracing::debug!(
        "Profile factors: baseline={:.1}, sex={:.2}, bmi={:.2} ({:?}), hydration={:.3}, bp={:.2} ({:?}), symptoms={:.3}, bsa={:.3}",
        factors.baseline,
        factors.sex,
        factors.bmi,
        factors.bmi_category,
        factors.hydration,
        factors.blood_pressure,
        factors.blood_pressure_category,
        factors.symptoms,
        factors.body_surface
    );

    GfrResult {
        gfr_estimate,
        method: Method::SymptomVitalBased,
        confidence: Confidence::from_profile_score(score),
        confidence_score: to_percent(score),
        calculation_label: PROFILE_LABEL,
    }
}
