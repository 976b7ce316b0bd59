//! Patient profile types for GFR estimation.
//!
//! The profile is the validated form of the caller's input record: the sex
//! string is parsed into a closed category and every numeric field is range
//! checked before any formula sees it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Biological sex category used by the estimating equations.
///
/// Deserialization goes through [`FromStr`], so serialized records accept the
/// same synonyms as free-form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sex {
    Female,
    Male,
}

impl FromStr for Sex {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" | "woman" | "girl" | "feminine" | "mujer" => Ok(Self::Female),
            "male" | "m" | "man" | "boy" | "masculine" | "hombre" => Ok(Self::Male),
            _ => Err(ProfileError::UnrecognizedSex(s.to_string())),
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = ProfileError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => write!(f, "female"),
            Self::Male => write!(f, "male"),
        }
    }
}

/// A single validation failure on a patient profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("Unrecognized sex value: '{0}' (expected female or male)")]
    UnrecognizedSex(String),

    #[error("{field} {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// Symptom and vital-sign profile of a patient.
///
/// Symptom and hydration scales run 1-10; hydration 10 means well hydrated,
/// symptom 10 means worst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Age in years
    pub age: u32,

    pub sex: Sex,

    /// Body weight in kg
    pub weight_kg: f64,

    /// Height in cm
    pub height_cm: f64,

    /// Self-reported hydration (1 = severely dehydrated, 10 = well hydrated)
    pub hydration_level: u8,

    /// Systolic blood pressure in mmHg
    pub systolic_bp: u16,

    /// Diastolic blood pressure in mmHg
    pub diastolic_bp: u16,

    pub stress: u8,
    pub fatigue: u8,
    pub pain: u8,

    /// Serum creatinine in mg/dL, when a lab value is available
    pub serum_creatinine: Option<f64>,
}

impl PatientProfile {
    /// Body mass index (kg/m²).
    #[must_use]
    pub fn bmi(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    /// Body surface area (m²) by the Du Bois formula.
    #[must_use]
    pub fn body_surface_area(&self) -> f64 {
        0.007_184 * self.height_cm.powf(0.725) * self.weight_kg.powf(0.425)
    }

    /// Creatinine value usable by the lab branch.
    ///
    /// Non-positive or non-finite values count as absent.
    #[must_use]
    pub fn usable_creatinine(&self) -> Option<f64> {
        self.serum_creatinine.filter(|c| c.is_finite() && *c > 0.0)
    }

    /// Whether any of stress, fatigue or pain is at or above `level`.
    #[must_use]
    pub fn any_symptom_at_least(&self, level: u8) -> bool {
        self.stress >= level || self.fatigue >= level || self.pain >= level
    }

    /// Validate that all fields are within accepted ranges.
    ///
    /// # Errors
    /// Returns every violation found, not just the first.
    pub fn validate(&self) -> Result<(), Vec<ProfileError>> {
        let mut errors = Vec::new();

        check_range(&mut errors, "Age", f64::from(self.age), 1.0, 120.0);
        check_finite_range(&mut errors, "Weight (kg)", self.weight_kg, 1.0, 400.0);
        check_finite_range(&mut errors, "Height (cm)", self.height_cm, 30.0, 272.0);
        check_range(
            &mut errors,
            "Hydration level",
            f64::from(self.hydration_level),
            1.0,
            10.0,
        );
        check_range(
            &mut errors,
            "Systolic BP",
            f64::from(self.systolic_bp),
            50.0,
            300.0,
        );
        check_range(
            &mut errors,
            "Diastolic BP",
            f64::from(self.diastolic_bp),
            20.0,
            200.0,
        );
        check_range(&mut errors, "Stress", f64::from(self.stress), 1.0, 10.0);
        check_range(&mut errors, "Fatigue", f64::from(self.fatigue), 1.0, 10.0);
        check_range(&mut errors, "Pain", f64::from(self.pain), 1.0, 10.0);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_range(errors: &mut Vec<ProfileError>, field: &'static str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(ProfileError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

fn check_finite_range(
    errors: &mut Vec<ProfileError>,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) {
    if value.is_finite() {
        check_range(errors, field, value, min, max);
    } else {
        errors.push(ProfileError::NonFinite { field });
    }
}

#[cfg(test)]
pub(crate) fn sample_profile() -> PatientProfile {
    PatientProfile {
        age: 58,
        sex: Sex::Female,
        weight_kg: 78.0,
        height_cm: 162.0,
        hydration_level: 5,
        systolic_bp: 138,
        diastolic_bp: 85,
        stress: 6,
        fatigue: 7,
        pain: 4,
        serum_creatinine: None,
    }
}
