//! Patient-facing guidance text.

use super::estimate::Method;
use super::patient::PatientProfile;
use super::stage::CkdStage;

/// Symptom score at which self-care guidance is added.
const HIGH_SYMPTOM_LEVEL: u8 = 7;

const PROFILE_DISCLAIMER: &str = "This is an estimate based on your symptoms and vital signs, \
not a laboratory measurement. Please consult your healthcare provider for a blood test to \
confirm your kidney function.";

const SYMPTOM_GUIDANCE: &str = "You are reporting high levels of stress, fatigue or pain. \
Rest when you need to, stay well hydrated, and contact your healthcare provider if these \
symptoms persist or get worse.";

/// Build guidance text for a stage and calculation method.
#[must_use]
pub fn generate_recommendation(stage: CkdStage, method: Method) -> String {
    let guidance = match stage {
        CkdStage::G1 | CkdStage::G2 => format!(
            "Your estimated kidney function is in stage {stage} ({}). Keep up healthy habits \
             and have your kidney function checked during routine visits with your primary care provider.",
            stage.description().to_lowercase()
        ),
        CkdStage::G3a | CkdStage::G3b => format!(
            "Your estimated kidney function is in stage {stage} ({}). Regular monitoring is \
             recommended; ask your provider whether a referral to a nephrologist is appropriate.",
            stage.description().to_lowercase()
        ),
        CkdStage::G4 => format!(
            "Your estimated kidney function is in stage {stage} ({}). Care from a nephrologist \
             is recommended, including planning for possible future treatment options.",
            stage.description().to_lowercase()
        ),
        CkdStage::G5 => format!(
            "Your estimated kidney function is in stage {stage} ({}). Please contact your \
             nephrologist promptly to discuss dialysis or transplant options.",
            stage.description().to_lowercase()
        ),
    };

    match method {
        Method::SymptomVitalBased => format!("{PROFILE_DISCLAIMER} {guidance}"),
        Method::CreatinineBased => guidance,
    }
}

/// Self-care note for high self-reported symptom levels (any score of 7 or more).
#[must_use]
pub fn symptom_guidance(profile: &PatientProfile) -> Option<&'static str> {
    profile
        .any_symptom_at_least(HIGH_SYMPTOM_LEVEL)
        .then_some(SYMPTOM_GUIDANCE)
}
