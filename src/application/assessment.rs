//! Assessment service: Orchestrates a full GFR assessment.
//!
//! This service coordinates:
//! - Request validation
//! - History lookup (when the request carries none)
//! - Estimation, staging and trend analysis
//! - Storing the new estimate as history

use std::sync::Arc;

use crate::domain::{HistoricalReading, HistoryEntry};
use crate::engine;
use crate::ports::HistoryStore;
use crate::request::{Assessment, AssessmentRequest};
use crate::NephraError;

use super::AssessmentConfig;

/// Service for running assessments against a history store.
pub struct AssessmentService<S>
where
    S: HistoryStore,
{
    store: Arc<S>,
    config: AssessmentConfig,
}

impl<S> AssessmentService<S>
where
    S: HistoryStore,
    S::Error: Into<crate::adapters::StorageError>,
{
    /// Create a new assessment service.
    pub fn new(store: Arc<S>, config: AssessmentConfig) -> Self {
        Self { store, config }
    }

    /// Run an assessment.
    ///
    /// History supplied in the request is used as-is. Otherwise, if the
    /// request names a patient, up to `history_limit` stored readings are
    /// loaded. A failure to store the new estimate is logged, not returned.
    ///
    /// # Errors
    /// Returns error if validation or the history lookup fails.
    pub fn assess(&self, request: &AssessmentRequest) -> Result<Assessment, NephraError> {
        let profile = request.to_profile()?;

        let history: Option<Vec<HistoryEntry>> = match (&request.history, &request.patient_id) {
            (Some(history), _) => Some(history.clone()),
            (None, Some(patient_id)) => Some(
                self.store
                    .load_history(patient_id, self.config.history_limit)
                    .map_err(|e| NephraError::Storage(e.into()))?,
            ),
            (None, None) => None,
        };

        let estimation = engine::estimate(&profile, history.as_deref())?;

        if self.config.persist_results {
            if let Some(patient_id) = &request.patient_id {
                let reading = HistoricalReading {
                    date: chrono::Utc::now(),
                    estimated_gfr: estimation.result.gfr_estimate,
                };
                if let Err(e) = self.store.save_reading(patient_id, &reading) {
                    tracing::warn!("Failed to store new reading: {}", e);
                }
            }
        }

        Ok(Assessment::from_estimation(&estimation, &profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryHistoryStore;
    use crate::domain::parse_timestamp;
    use crate::request::sample_request;

    fn create_test_service(config: AssessmentConfig) -> AssessmentService<InMemoryHistoryStore> {
        AssessmentService::new(Arc::new(InMemoryHistoryStore::new()), config)
    }

    fn stored(service: &AssessmentService<InMemoryHistoryStore>, patient_id: &str) -> usize {
        service
            .store
            .count_readings(patient_id)
            .expect("Should count")
    }

    fn seed(service: &AssessmentService<InMemoryHistoryStore>, patient_id: &str) {
        for (date, gfr) in [
            ("2025-04-01T10:00:00Z", 65.3),
            ("2025-04-08T10:00:00Z", 64.1),
            ("2025-04-15T10:00:00Z", 63.2),
            ("2025-04-22T10:00:00Z", 62.6),
            ("2025-05-01T10:00:00Z", 61.9),
        ] {
            let reading = HistoricalReading {
                date: parse_timestamp(date).expect("Should parse"),
                estimated_gfr: gfr,
            };
            service
                .store
                .save_reading(patient_id, &reading)
                .expect("Should save");
        }
    }

    #[test]
    fn test_anonymous_request_has_no_trend() {
        let service = create_test_service(AssessmentConfig::default());
        let assessment = service.assess(&sample_request()).expect("Should assess");
        assert!(assessment.trend.is_none());
    }

    #[test]
    fn test_stored_history_used_and_extended() {
        let service = create_test_service(AssessmentConfig::default());
        seed(&service, "p1");

        let request = AssessmentRequest {
            patient_id: Some("p1".to_string()),
            ..sample_request()
        };
        let assessment = service.assess(&request).expect("Should assess");

        let trend = assessment.trend.expect("Trend should be present");
        assert_eq!(trend.data_points, 6);
        assert!(trend.trend.is_decline());
        assert_eq!(stored(&service, "p1"), 6);
    }

    #[test]
    fn test_history_limit_applies() {
        let service = create_test_service(AssessmentConfig {
            history_limit: 2,
            persist_results: false,
        });
        seed(&service, "p1");

        let request = AssessmentRequest {
            patient_id: Some("p1".to_string()),
            ..sample_request()
        };
        let assessment = service.assess(&request).expect("Should assess");

        let trend = assessment.trend.expect("Trend should be present");
        assert_eq!(trend.data_points, 3);
        assert_eq!(stored(&service, "p1"), 5);
    }

    #[test]
    fn test_request_history_takes_precedence() {
        let service = create_test_service(AssessmentConfig::default());
        seed(&service, "p1");

        let request = AssessmentRequest {
            patient_id: Some("p1".to_string()),
            history: Some(vec![HistoryEntry::new("2025-05-01T10:00:00Z", 61.9)]),
            ..sample_request()
        };
        let assessment = service.assess(&request).expect("Should assess");

        let trend = assessment.trend.expect("Trend should be present");
        assert_eq!(trend.data_points, 2);
    }

    #[test]
    fn test_invalid_request_stores_nothing() {
        let service = create_test_service(AssessmentConfig::default());
        let request = AssessmentRequest {
            patient_id: Some("p1".to_string()),
            sex: "x".to_string(),
            ..sample_request()
        };
        assert!(service.assess(&request).is_err());
        assert_eq!(stored(&service, "p1"), 0);
    }
}
