//! Trend analysis result types.
//!
//! Categorizes how a patient's GFR is moving relative to prior readings.

use serde::{Deserialize, Serialize};

/// Short-term trend category from percent change against the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendCategory {
    Stable,
    SlightDecline,
    ModerateDecline,
    SevereDecline,
    SlightImprovement,
    ModerateImprovement,
    SignificantImprovement,
    /// No usable prior readings
    InsufficientData,
}

impl TrendCategory {
    /// Classify a percent change (not rounded).
    #[must_use]
    pub fn from_percent_change(percent: f64) -> Self {
        if percent.abs() < 3.0 {
            Self::Stable
        } else if percent < -15.0 {
            Self::SevereDecline
        } else if percent < -7.0 {
            Self::ModerateDecline
        } else if percent < 0.0 {
            Self::SlightDecline
        } else if percent > 15.0 {
            Self::SignificantImprovement
        } else if percent > 7.0 {
            Self::ModerateImprovement
        } else {
            Self::SlightImprovement
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Stable => "Your kidney function is stable compared to your last reading.",
            Self::SlightDecline => {
                "Your kidney function shows a slight decline since your last reading."
            }
            Self::ModerateDecline => {
                "Your kidney function shows a moderate decline. Consider discussing this with your healthcare provider."
            }
            Self::SevereDecline => {
                "Your kidney function shows a significant decline. Please contact your healthcare provider soon."
            }
            Self::SlightImprovement => {
                "Your kidney function shows a slight improvement since your last reading."
            }
            Self::ModerateImprovement => {
                "Your kidney function shows a moderate improvement since your last reading."
            }
            Self::SignificantImprovement => {
                "Your kidney function shows a significant improvement since your last reading."
            }
            Self::InsufficientData => "Not enough previous readings to determine a trend.",
        }
    }

    #[must_use]
    pub fn is_decline(&self) -> bool {
        matches!(
            self,
            Self::SlightDecline | Self::ModerateDecline | Self::SevereDecline
        )
    }
}

/// Long-term direction over the whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongTermTrend {
    Improving,
    Declining,
    Consistent,
    Fluctuating,
    InsufficientData,
}

impl LongTermTrend {
    /// Classify by regression slope (GFR units per reading).
    #[must_use]
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < 0.5 {
            Self::Consistent
        } else if slope > 1.0 {
            Self::Improving
        } else if slope < -1.0 {
            Self::Declining
        } else {
            Self::Fluctuating
        }
    }
}

/// Shape of the reading-to-reading movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    ConsistentlyImproving,
    ConsistentlyDeclining,
    Stable,
    Oscillating,
    Fluctuating,
    InsufficientData,
}

impl Pattern {
    /// The long-term trend this pattern implies.
    #[must_use]
    pub fn long_term(&self) -> LongTermTrend {
        match self {
            Self::ConsistentlyImproving => LongTermTrend::Improving,
            Self::ConsistentlyDeclining => LongTermTrend::Declining,
            Self::Stable => LongTermTrend::Consistent,
            Self::Oscillating | Self::Fluctuating => LongTermTrend::Fluctuating,
            Self::InsufficientData => LongTermTrend::InsufficientData,
        }
    }
}

/// Spread of recent readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    ModeratelyVariable,
    HighlyVariable,
    Unknown,
}

impl Stability {
    /// Classify a standard deviation (GFR units).
    #[must_use]
    pub fn from_variability(std_dev: f64) -> Self {
        if std_dev < 2.0 {
            Self::Stable
        } else if std_dev < 5.0 {
            Self::ModeratelyVariable
        } else {
            Self::HighlyVariable
        }
    }
}

/// How much clinical attention a change warrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalSignificance {
    Low,
    Medium,
    High,
}

impl ClinicalSignificance {
    /// Classify from unrounded percent and absolute change.
    #[must_use]
    pub fn from_change(percent: f64, absolute: f64) -> Self {
        if percent.abs() > 15.0 && absolute.abs() > 10.0 {
            Self::High
        } else if percent.abs() > 7.0 && absolute.abs() > 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Full trend characterization of a new estimate against history.
///
/// Values are unrounded; rounding happens when the output record is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub trend: TrendCategory,

    pub absolute_change: f64,

    pub percent_change: f64,

    /// Current estimate minus the mean of up to three most recent readings
    pub average_change: f64,

    pub long_term_trend: LongTermTrend,

    pub stability: Stability,

    /// Population standard deviation of recent values
    pub variability: f64,

    /// Least-squares slope, GFR units per reading
    pub rate_of_change: f64,

    pub pattern: Pattern,

    /// Share of transitions consistent with `pattern` (0.0 to 1.0)
    pub pattern_confidence: f64,

    pub clinical_significance: ClinicalSignificance,

    /// Number of values in the analyzed series, including the current estimate
    pub data_points: usize,
}

impl TrendResult {
    /// Result for a history with no usable readings.
    #[must_use]
    pub fn insufficient_data() -> Self {
        Self {
            trend: TrendCategory::InsufficientData,
            absolute_change: 0.0,
            percent_change: 0.0,
            average_change: 0.0,
            long_term_trend: LongTermTrend::InsufficientData,
            stability: Stability::Unknown,
            variability: 0.0,
            rate_of_change: 0.0,
            pattern: Pattern::InsufficientData,
            pattern_confidence: 0.0,
            clinical_significance: ClinicalSignificance::Low,
            data_points: 0,
        }
    }

    #[must_use]
    pub fn trend_description(&self) -> &'static str {
        self.trend.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_boundaries() {
        assert_eq!(TrendCategory::from_percent_change(0.0), TrendCategory::Stable);
        assert_eq!(TrendCategory::from_percent_change(2.9), TrendCategory::Stable);
        assert_eq!(TrendCategory::from_percent_change(-2.9), TrendCategory::Stable);
        assert_eq!(
            TrendCategory::from_percent_change(3.0),
            TrendCategory::SlightImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(3.1),
            TrendCategory::SlightImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(-3.0),
            TrendCategory::SlightDecline
        );
        assert_eq!(
            TrendCategory::from_percent_change(-3.1),
            TrendCategory::SlightDecline
        );
        assert_eq!(
            TrendCategory::from_percent_change(7.0),
            TrendCategory::SlightImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(7.1),
            TrendCategory::ModerateImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(-7.0),
            TrendCategory::SlightDecline
        );
        assert_eq!(
            TrendCategory::from_percent_change(-7.1),
            TrendCategory::ModerateDecline
        );
        assert_eq!(
            TrendCategory::from_percent_change(15.0),
            TrendCategory::ModerateImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(15.1),
            TrendCategory::SignificantImprovement
        );
        assert_eq!(
            TrendCategory::from_percent_change(-15.0),
            TrendCategory::ModerateDecline
        );
        assert_eq!(
            TrendCategory::from_percent_change(-15.1),
            TrendCategory::SevereDecline
        );
    }

    #[test]
    fn test_long_term_from_slope() {
        assert_eq!(LongTermTrend::from_slope(0.2), LongTermTrend::Consistent);
        assert_eq!(LongTermTrend::from_slope(-0.49), LongTermTrend::Consistent);
        assert_eq!(LongTermTrend::from_slope(1.5), LongTermTrend::Improving);
        assert_eq!(LongTermTrend::from_slope(-1.5), LongTermTrend::Declining);
        assert_eq!(LongTermTrend::from_slope(0.8), LongTermTrend::Fluctuating);
        assert_eq!(LongTermTrend::from_slope(-0.8), LongTermTrend::Fluctuating);
    }

    #[test]
    fn test_clinical_significance() {
        assert_eq!(
            ClinicalSignificance::from_change(-20.0, -12.0),
            ClinicalSignificance::High
        );
        // Large percent on a small base is not enough for "high".
        assert_eq!(
            ClinicalSignificance::from_change(-20.0, -8.0),
            ClinicalSignificance::Medium
        );
        // Both bounds are exclusive.
        assert_eq!(
            ClinicalSignificance::from_change(15.0, 10.0),
            ClinicalSignificance::Medium
        );
        assert_eq!(
            ClinicalSignificance::from_change(-15.01, -10.01),
            ClinicalSignificance::High
        );
        assert_eq!(
            ClinicalSignificance::from_change(7.0, 5.0),
            ClinicalSignificance::Low
        );
        assert_eq!(
            ClinicalSignificance::from_change(-7.01, -5.01),
            ClinicalSignificance::Medium
        );
        assert_eq!(
            ClinicalSignificance::from_change(8.0, 4.0),
            ClinicalSignificance::Low
        );
        assert_eq!(
            ClinicalSignificance::from_change(-2.0, -1.0),
            ClinicalSignificance::Low
        );
    }

    #[test]
    fn test_stability_and_pattern_mapping() {
        assert_eq!(Stability::from_variability(1.2), Stability::Stable);
        assert_eq!(Stability::from_variability(3.0), Stability::ModeratelyVariable);
        assert_eq!(Stability::from_variability(7.5), Stability::HighlyVariable);
        assert_eq!(
            Pattern::ConsistentlyDeclining.long_term(),
            LongTermTrend::Declining
        );
        assert_eq!(Pattern::Oscillating.long_term(), LongTermTrend::Fluctuating);
    }

    #[test]
    fn test_insufficient_data_result() {
        let result = TrendResult::insufficient_data();
        assert_eq!(result.trend, TrendCategory::InsufficientData);
        assert_eq!(result.data_points, 0);
        assert_eq!(
            result.trend_description(),
            "Not enough previous readings to determine a trend."
        );
    }
}
