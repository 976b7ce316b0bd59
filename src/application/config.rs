//! Assessment service configuration.

/// Configuration for the assessment service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentConfig {
    /// Maximum number of stored readings loaded per assessment
    pub history_limit: usize,

    /// Whether each new estimate is written back to the history store
    pub persist_results: bool,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            history_limit: 52,
            persist_results: true,
        }
    }
}

impl AssessmentConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - NEPHRA_HISTORY_LIMIT (positive integer)
    /// - NEPHRA_PERSIST_RESULTS (true/false, 1/0, yes/no)
    #[must_use]
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(v) = lookup("NEPHRA_HISTORY_LIMIT") {
            if let Ok(x) = v.trim().parse::<usize>() {
                if x > 0 {
                    cfg.history_limit = x;
                }
            }
        }

        if let Some(v) = lookup("NEPHRA_PERSIST_RESULTS") {
            match v.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => cfg.persist_results = true,
                "0" | "false" | "no" => cfg.persist_results = false,
                _ => tracing::warn!("Ignoring unrecognized NEPHRA_PERSIST_RESULTS value"),
            }
        }

        cfg
    }
}
