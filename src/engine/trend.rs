//! Trend analysis over prior GFR readings.
//!
//! The analyzed series is the valid prior readings in chronological order
//! followed by the current estimate. Short-term trend compares the current
//! estimate with the latest prior reading; slope, variability and pattern are
//! computed over the whole series once it is long enough.

use crate::domain::{
    valid_readings, ClinicalSignificance, HistoricalReading, HistoryEntry, LongTermTrend,
    Pattern, Stability, TrendCategory, TrendResult,
};

/// Number of most recent prior readings averaged for `average_change`.
const RECENT_AVERAGE_COUNT: usize = 3;

/// Number of most recent series values used for variability.
const VARIABILITY_WINDOW: usize = 10;

const MIN_POINTS_FOR_REGRESSION: usize = 3;
const MIN_POINTS_FOR_VARIABILITY: usize = 3;
const MIN_POINTS_FOR_LONG_TERM: usize = 4;
const MIN_POINTS_FOR_PATTERN: usize = 5;

/// Share of transitions in one direction needed for a consistent pattern.
const CONSISTENT_DIRECTION_RATIO: f64 = 0.8;

/// Share of alternating triplets needed for an oscillating pattern.
const OSCILLATION_RATIO: f64 = 0.7;

/// Standard deviation (and step size) below which readings count as stable.
const LOW_VARIABILITY: f64 = 2.0;

/// Pattern confidence above which the pattern decides the long-term trend.
const PATTERN_CONFIDENCE_FOR_LONG_TERM: f64 = 0.8;

/// Analyze a new estimate against raw history.
///
/// Unusable entries are discarded first; if none remain the result is
/// [`TrendCategory::InsufficientData`].
#[must_use]
pub fn analyze(current: f64, history: &[HistoryEntry]) -> TrendResult {
    analyze_readings(current, &valid_readings(history))
}

/// Analyze a new estimate against validated readings in any order.
#[must_use]
pub fn analyze_readings(current: f64, readings: &[HistoricalReading]) -> TrendResult {
    if readings.is_empty() || !current.is_finite() {
        return TrendResult::insufficient_data();
    }

    let mut chronological = readings.to_vec();
    chronological.sort_by_key(|r| r.date);

    let newest_first: Vec<f64> = chronological
        .iter()
        .rev()
        .map(|r| r.estimated_gfr)
        .collect();
    let latest_previous = newest_first[0];

    let absolute_change = current - latest_previous;
    let percent_change = if latest_previous > 0.0 {
        absolute_change / latest_previous * 100.0
    } else {
        0.0
    };

    let recent = &newest_first[..newest_first.len().min(RECENT_AVERAGE_COUNT)];
    let average_change = current - mean(recent);

    let mut series: Vec<f64> = chronological.iter().map(|r| r.estimated_gfr).collect();
    series.push(current);
    let data_points = series.len();

    let rate_of_change = regression_slope(&series);

    let window = &series[data_points.saturating_sub(VARIABILITY_WINDOW)..];
    let (variability, stability) = if data_points >= MIN_POINTS_FOR_VARIABILITY {
        let std_dev = population_std_dev(window);
        (std_dev, Stability::from_variability(std_dev))
    } else {
        (0.0, Stability::Unknown)
    };

    let (pattern, pattern_confidence) = if data_points >= MIN_POINTS_FOR_PATTERN {
        detect_pattern(&series, variability)
    } else {
        (Pattern::InsufficientData, 0.0)
    };

    let long_term_trend = if data_points < MIN_POINTS_FOR_LONG_TERM {
        LongTermTrend::InsufficientData
    } else if pattern != Pattern::InsufficientData
        && pattern_confidence > PATTERN_CONFIDENCE_FOR_LONG_TERM
    {
        pattern.long_term()
    } else {
        LongTermTrend::from_slope(rate_of_change)
    };

    let mut clinical_significance = ClinicalSignificance::from_change(percent_change, absolute_change);
    if long_term_trend == LongTermTrend::Declining {
        clinical_significance = clinical_significance.max(ClinicalSignificance::Medium);
    }

    let trend = TrendCategory::from_percent_change(percent_change);

    tracing::debug!(
        "Trend over {} points: {:?} ({:+.2}%), long-term {:?}, pattern {:?} ({:.0}%), slope {:.3}",
        data_points,
        trend,
        percent_change,
        long_term_trend,
        pattern,
        pattern_confidence * 100.0,
        rate_of_change
    );

    TrendResult {
        trend,
        absolute_change,
        percent_change,
        average_change,
        long_term_trend,
        stability,
        variability,
        rate_of_change,
        pattern,
        pattern_confidence,
        clinical_significance,
        data_points,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Average change per step between the first and last value.
fn endpoint_slope(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) if values.len() > 1 => (last - first) / (values.len() - 1) as f64,
        _ => 0.0,
    }
}

/// Least-squares slope of `(index, value)` pairs.
///
/// Falls back to the endpoint slope for fewer than three points or a
/// degenerate denominator.
fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < MIN_POINTS_FOR_REGRESSION {
        return endpoint_slope(values);
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n_f * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return endpoint_slope(values);
    }
    (n_f * sum_xy - sum_x * sum_y) / denominator
}

/// Classify the shape of a series of at least two values.
///
/// Returns the pattern and the share of transitions (or triplets, for
/// oscillation) consistent with it.
fn detect_pattern(values: &[f64], variability: f64) -> (Pattern, f64) {
    let deltas: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    if deltas.is_empty() {
        return (Pattern::InsufficientData, 0.0);
    }
    let transitions = deltas.len() as f64;

    let increases = deltas.iter().filter(|d| **d > 0.0).count() as f64;
    let decreases = deltas.iter().filter(|d| **d < 0.0).count() as f64;
    let increase_ratio = increases / transitions;
    let decrease_ratio = decreases / transitions;

    if increase_ratio > CONSISTENT_DIRECTION_RATIO {
        return (Pattern::ConsistentlyImproving, increase_ratio);
    }
    if decrease_ratio > CONSISTENT_DIRECTION_RATIO {
        return (Pattern::ConsistentlyDeclining, decrease_ratio);
    }

    let small_steps = deltas.iter().filter(|d| d.abs() < LOW_VARIABILITY).count() as f64;
    if variability < LOW_VARIABILITY {
        return (Pattern::Stable, small_steps / transitions);
    }

    let triplets = deltas.len().saturating_sub(1);
    if triplets > 0 {
        let alternating = deltas.windows(2).filter(|d| d[0] * d[1] < 0.0).count();
        let alternation = alternating as f64 / triplets as f64;
        if alternation >= OSCILLATION_RATIO {
            return (Pattern::Oscillating, alternation);
        }
    }

    (Pattern::Fluctuating, (transitions - small_steps) / transitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekly(values: &[f64]) -> Vec<HistoryEntry> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| HistoryEntry::new(format!("2025-04-{:02}T10:00:00Z", 1 + i * 7), *v))
            .collect()
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        let result = analyze(60.0, &[]);
        assert_eq!(result.trend, TrendCategory::InsufficientData);
        assert_eq!(result.data_points, 0);
    }

    #[test]
    fn test_unparsable_history_is_insufficient() {
        let history = vec![
            HistoryEntry::new("garbage", 60.0),
            HistoryEntry {
                date: Some("2025-04-01T10:00:00Z".to_string()),
                estimated_gfr: None,
            },
        ];
        let result = analyze(60.0, &history);
        assert_eq!(result.trend, TrendCategory::InsufficientData);
    }

    #[test]
    fn test_single_reading() {
        let result = analyze(55.0, &weekly(&[50.0]));
        assert_eq!(result.trend, TrendCategory::ModerateImprovement);
        assert!((result.absolute_change - 5.0).abs() < 1e-9);
        assert!((result.percent_change - 10.0).abs() < 1e-9);
        assert_eq!(result.data_points, 2);
        assert_eq!(result.stability, Stability::Unknown);
        assert_eq!(result.pattern, Pattern::InsufficientData);
        assert_eq!(result.long_term_trend, LongTermTrend::InsufficientData);
        // Endpoint slope over two points.
        assert!((result.rate_of_change - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_previous_value_guarded() {
        let result = analyze(40.0, &weekly(&[0.0]));
        assert!(result.percent_change.abs() < f64::EPSILON);
        assert_eq!(result.trend, TrendCategory::Stable);
        assert!((result.absolute_change - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_latest_previous_uses_newest_date() {
        // Supplied out of order; the newest reading is 62.
        let history = vec![
            HistoryEntry::new("2025-04-22T10:00:00Z", 62.0),
            HistoryEntry::new("2025-04-01T10:00:00Z", 70.0),
            HistoryEntry::new("2025-04-08T10:00:00Z", 68.0),
        ];
        let result = analyze(62.0, &history);
        assert!(result.absolute_change.abs() < 1e-9);
        assert_eq!(result.trend, TrendCategory::Stable);
        // Mean of the three most recent is 200/3.
        assert!((result.average_change - (62.0 - 200.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_decline_scenario() {
        let history = weekly(&[65.3, 64.1, 63.2, 62.6, 61.9]);
        let result = analyze(58.75, &history);

        assert!(result.trend.is_decline());
        assert_eq!(result.pattern, Pattern::ConsistentlyDeclining);
        assert!((result.pattern_confidence - 1.0).abs() < 1e-9);
        assert_eq!(result.long_term_trend, LongTermTrend::Declining);
        assert!(result.clinical_significance >= ClinicalSignificance::Medium);
        assert_eq!(result.data_points, 6);
        assert!(result.rate_of_change < 0.0);
    }

    #[test]
    fn test_regression_slope() {
        assert!((regression_slope(&[1.0, 2.0, 3.0, 4.0]) - 1.0).abs() < 1e-9);
        assert!((regression_slope(&[10.0, 10.0, 10.0]) - 0.0).abs() < 1e-9);
        assert!((regression_slope(&[5.0, 3.0]) + 2.0).abs() < 1e-9);
        assert!(regression_slope(&[7.0]).abs() < f64::EPSILON);
        assert!(regression_slope(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_population_std_dev() {
        let sd = population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.0).abs() < 1e-9);
        assert!(population_std_dev(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pattern_stable() {
        let values = [60.0, 60.5, 60.2, 60.8, 60.4, 60.6];
        let (pattern, confidence) = detect_pattern(&values, population_std_dev(&values));
        assert_eq!(pattern, Pattern::Stable);
        assert!((confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_oscillating() {
        let values = [60.0, 66.0, 59.0, 67.0, 58.0, 66.0];
        let (pattern, confidence) = detect_pattern(&values, population_std_dev(&values));
        assert_eq!(pattern, Pattern::Oscillating);
        assert!((confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pattern_fluctuating() {
        // Up, up, down, down, up: neither directional nor alternating.
        let values = [50.0, 55.0, 60.0, 54.0, 48.0, 53.0];
        let (pattern, _) = detect_pattern(&values, population_std_dev(&values));
        assert_eq!(pattern, Pattern::Fluctuating);
    }

    #[test]
    fn test_pattern_consistently_improving() {
        let values = [40.0, 42.0, 45.0, 47.0, 50.0];
        let (pattern, confidence) = detect_pattern(&values, population_std_dev(&values));
        assert_eq!(pattern, Pattern::ConsistentlyImproving);
        assert!((confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_term_from_slope_when_pattern_weak() {
        // Four points: no pattern, slope decides.
        let result = analyze(64.0, &weekly(&[60.0, 61.0, 63.0]));
        assert_eq!(result.pattern, Pattern::InsufficientData);
        assert_eq!(result.long_term_trend, LongTermTrend::Improving);
    }

    #[test]
    fn test_stable_pattern_decides_long_term() {
        // Slope is about 0.62, which alone would read as fluctuating.
        let result = analyze(63.5, &weekly(&[60.0, 61.5, 61.2, 62.7, 62.4]));
        assert_eq!(result.pattern, Pattern::Stable);
        assert!(result.pattern_confidence > PATTERN_CONFIDENCE_FOR_LONG_TERM);
        assert_eq!(LongTermTrend::from_slope(result.rate_of_change), LongTermTrend::Fluctuating);
        assert_eq!(result.long_term_trend, LongTermTrend::Consistent);
    }

    #[test]
    fn test_oscillating_pattern_decides_long_term() {
        // Slope is 0.4, which alone would read as consistent.
        let result = analyze(66.0, &weekly(&[60.0, 66.0, 59.0, 67.0, 58.0]));
        assert_eq!(result.pattern, Pattern::Oscillating);
        assert!((result.rate_of_change - 0.4).abs() < 1e-9);
        assert_eq!(result.long_term_trend, LongTermTrend::Fluctuating);
    }

    #[test]
    fn test_severe_drop_is_high_significance() {
        let result = analyze(45.0, &weekly(&[70.0, 69.0, 70.0]));
        assert_eq!(result.trend, TrendCategory::SevereDecline);
        assert_eq!(result.clinical_significance, ClinicalSignificance::High);
    }
}
