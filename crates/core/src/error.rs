//! Error and degradation types
//!
//! Two kinds of failure are kept deliberately separate:
//!
//! - [`PredictionError`] aborts a prediction. Bad burn attributes and numeric
//!   breakdowns inside the plume physics land here, because a result built
//!   on them would be physically meaningless.
//! - [`DegradedReason`] records auxiliary enrichment that could not be
//!   produced (footprint geometry, similarity encoding, conflict queries,
//!   historical context). The prediction still completes and the caller can
//!   see exactly what is missing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal prediction failure
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Missing or invalid burn/weather attribute
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Numeric failure inside the plume physics
    #[error("simulation failed during {stage}: {reason}")]
    Simulation { stage: &'static str, reason: String },

    /// Engine configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Historical context could not be loaded (explicit reload only)
    #[error("context error: {0}")]
    Context(String),
}

impl PredictionError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PredictionError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn simulation(stage: &'static str, reason: impl Into<String>) -> Self {
        PredictionError::Simulation {
            stage,
            reason: reason.into(),
        }
    }
}

/// Which conflict source a query-level degradation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSource {
    Schedule,
    SimilarityIndex,
}

impl std::fmt::Display for ConflictSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictSource::Schedule => f.write_str("schedule store"),
            ConflictSource::SimilarityIndex => f.write_str("similarity index"),
        }
    }
}

/// Why an enrichment step fell back instead of producing its full value
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DegradedReason {
    #[error("burn request has no field boundary")]
    MissingBoundary,

    #[error("field boundary is unusable: {detail}")]
    MalformedBoundary { detail: String },

    #[error("feature slot {index} is not finite")]
    NonFiniteFeature { index: usize },

    #[error("spatial conflict check skipped: {detail}")]
    SpatialCheckUnavailable { detail: String },

    #[error("{origin} query failed: {message}")]
    QueryFailed {
        origin: ConflictSource,
        message: String,
    },

    #[error("{origin} query timed out after {timeout_ms} ms")]
    QueryTimedOut {
        origin: ConflictSource,
        timeout_ms: u64,
    },

    #[error("historical dispersion data unavailable: {detail}")]
    HistoricalDataUnavailable { detail: String },
}

/// Value produced by an enrichment step that may have fallen back
///
/// Unlike a sentinel, a degraded value always carries its reason, so a
/// constant fallback vector can never be mistaken for a real encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Enrichment<T> {
    Complete { value: T },
    Degraded { fallback: T, reason: DegradedReason },
}

impl<T> Enrichment<T> {
    #[must_use]
    pub fn complete(value: T) -> Self {
        Enrichment::Complete { value }
    }

    #[must_use]
    pub fn degraded(fallback: T, reason: DegradedReason) -> Self {
        Enrichment::Degraded { fallback, reason }
    }

    /// The usable value, whether complete or fallback
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Enrichment::Complete { value } => value,
            Enrichment::Degraded { fallback, .. } => fallback,
        }
    }

    #[must_use]
    pub fn into_value(self) -> T {
        match self {
            Enrichment::Complete { value } => value,
            Enrichment::Degraded { fallback, .. } => fallback,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Enrichment::Degraded { .. })
    }

    #[must_use]
    pub fn reason(&self) -> Option<&DegradedReason> {
        match self {
            Enrichment::Complete { .. } => None,
            Enrichment::Degraded { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let err = PredictionError::invalid("acres", "must be positive, got 0");
        assert_eq!(err.to_string(), "invalid input `acres`: must be positive, got 0");

        let reason = DegradedReason::QueryTimedOut {
            origin: ConflictSource::Schedule,
            timeout_ms: 250,
        };
        assert_eq!(reason.to_string(), "schedule store query timed out after 250 ms");
    }

    #[test]
    fn enrichment_exposes_fallback() {
        let e = Enrichment::degraded(vec![0.1_f64; 2], DegradedReason::NonFiniteFeature { index: 3 });
        assert!(e.is_degraded());
        assert_eq!(e.value(), &vec![0.1, 0.1]);
        assert_eq!(e.reason(), Some(&DegradedReason::NonFiniteFeature { index: 3 }));

        let ok: Enrichment<u8> = Enrichment::complete(7);
        assert!(!ok.is_degraded());
        assert_eq!(ok.into_value(), 7);
    }
}
