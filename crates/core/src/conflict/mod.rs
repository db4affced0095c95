//! Conflict detection against other planned burns.
//!
//! Two independent sources are consulted concurrently:
//!
//! - the burn schedule, for burns on the same day whose fields are close
//!   enough for their smoke to overlap (`spatial`)
//! - the similarity index, for past burns whose predicted dispersion pattern
//!   looks like this one (`pattern_similarity`)
//!
//! Each lookup is bounded by a timeout. A failed or slow lookup contributes
//! no conflicts and records a [`DegradedReason`] instead of failing the
//! prediction. Results from the two sources are concatenated as-is.

mod memory;

pub use memory::{BurnStatus, InMemoryFeatureIndex, InMemoryScheduleStore, ScheduledBurn};

use crate::config::EngineConfig;
use crate::core_types::{BurnId, BurnRequest, LonLat, TimeWindow};
use crate::encoding::FeatureVector;
use crate::error::{ConflictSource, DegradedReason, Enrichment};
use crate::footprint::AffectedAreaPolygon;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Failure reported by a read interface
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Backend was reached but the query failed
    #[error("query failed: {0}")]
    Query(String),

    /// A stored record could not be decoded
    #[error("record {id} is corrupt: {detail}")]
    Corrupt { id: BurnId, detail: String },
}

/// Parameters of a same-day proximity lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleQuery {
    /// Requesting burn; never returned by the store
    pub burn_id: BurnId,
    pub date: NaiveDate,
    pub time_window: Option<TimeWindow>,
    /// Centroid of the requesting field
    pub centroid: LonLat,
    pub radius_m: f64,
}

/// A scheduled burn that overlaps the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMatch {
    pub burn_id: BurnId,
    pub farm_id: Option<String>,
    /// Centroid separation reported by the store (m)
    pub separation_m: f64,
}

/// Stored prediction close to the query vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarBurn {
    pub burn_id: BurnId,
    pub similarity: f64,
}

/// Read access to the burn schedule
#[async_trait]
pub trait BurnScheduleStore: Send + Sync {
    /// Pending or approved burns on the query date, near the query centroid
    async fn overlapping_burns(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleMatch>, StoreError>;
}

/// Read access to stored prediction vectors
#[async_trait]
pub trait FeatureIndex: Send + Sync {
    /// Up to `k` nearest stored vectors by cosine similarity, most similar
    /// first, excluding `exclude`
    async fn nearest(
        &self,
        vector: &FeatureVector,
        k: usize,
        exclude: &BurnId,
    ) -> Result<Vec<SimilarBurn>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Spatial,
    PatternSimilarity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

/// A detected conflict between two burns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub burn_id: BurnId,
    pub conflicting_burn_id: BurnId,
    pub conflict_type: ConflictType,
    pub severity: Severity,
    /// Separation (m), spatial conflicts only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    /// Cosine similarity, pattern conflicts only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Conflicts found plus whatever could not be checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    pub degraded: Vec<DegradedReason>,
}

impl ConflictReport {
    #[must_use]
    pub fn has_high_severity(&self) -> bool {
        self.conflicts.iter().any(|c| c.severity == Severity::High)
    }

    #[must_use]
    pub fn of_type(&self, conflict_type: ConflictType) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(move |c| c.conflict_type == conflict_type)
    }
}

/// Run a store lookup under a timeout, folding every failure into a
/// degradation reason.
async fn bounded<T, F>(origin: ConflictSource, timeout: Duration, lookup: F) -> Result<T, DegradedReason>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(rows)) => Ok(rows),
        Ok(Err(e)) => {
            warn!(%origin, error = %e, "Conflict lookup failed");
            Err(DegradedReason::QueryFailed {
                origin,
                message: e.to_string(),
            })
        }
        Err(_) => {
            warn!(%origin, timeout_ms = timeout.as_millis() as u64, "Conflict lookup timed out");
            Err(DegradedReason::QueryTimedOut {
                origin,
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}

/// Finds spatial and pattern conflicts for a prediction
#[derive(Clone)]
pub struct ConflictDetector {
    schedule: Arc<dyn BurnScheduleStore>,
    index: Arc<dyn FeatureIndex>,
}

impl std::fmt::Debug for ConflictDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictDetector").finish_non_exhaustive()
    }
}

impl ConflictDetector {
    #[must_use]
    pub fn new(schedule: Arc<dyn BurnScheduleStore>, index: Arc<dyn FeatureIndex>) -> Self {
        Self { schedule, index }
    }

    async fn spatial(
        &self,
        burn: &BurnRequest,
        polygon: &Result<AffectedAreaPolygon, DegradedReason>,
        config: &EngineConfig,
    ) -> Result<Vec<Conflict>, DegradedReason> {
        let polygon = polygon.as_ref().map_err(|reason| DegradedReason::SpatialCheckUnavailable {
            detail: reason.to_string(),
        })?;
        let date = burn.requested_date.ok_or_else(|| DegradedReason::SpatialCheckUnavailable {
            detail: "burn request has no requested date".into(),
        })?;

        let query = ScheduleQuery {
            burn_id: burn.id.clone(),
            date,
            time_window: burn.time_window,
            centroid: polygon.centroid,
            radius_m: config.spatial_search_radius_m,
        };

        let rows = bounded(
            ConflictSource::Schedule,
            config.query_timeout(),
            self.schedule.overlapping_burns(&query),
        )
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Conflict {
                burn_id: burn.id.clone(),
                conflicting_burn_id: row.burn_id,
                conflict_type: ConflictType::Spatial,
                severity: if row.separation_m < config.high_severity_separation_m {
                    Severity::High
                } else {
                    Severity::Medium
                },
                distance_m: Some(row.separation_m),
                similarity: None,
            })
            .collect())
    }

    async fn pattern(
        &self,
        burn: &BurnRequest,
        vector: &Enrichment<FeatureVector>,
        config: &EngineConfig,
    ) -> Result<Vec<Conflict>, DegradedReason> {
        // A fallback vector is still searched; its tag marks the relevance as reduced
        let neighbours = bounded(
            ConflictSource::SimilarityIndex,
            config.query_timeout(),
            self.index.nearest(vector.value(), config.similarity_top_k, &burn.id),
        )
        .await?;

        Ok(neighbours
            .into_iter()
            .filter(|n| n.similarity > config.similarity_threshold)
            .map(|n| Conflict {
                burn_id: burn.id.clone(),
                conflicting_burn_id: n.burn_id,
                conflict_type: ConflictType::PatternSimilarity,
                severity: if n.similarity > config.high_similarity_threshold {
                    Severity::High
                } else {
                    Severity::Medium
                },
                distance_m: None,
                similarity: Some(n.similarity),
            })
            .collect())
    }

    /// Query both sources concurrently and merge their conflicts.
    ///
    /// # Arguments
    ///
    /// * `burn` - The burn being predicted
    /// * `polygon` - Its affected area, or why there is none
    /// * `vector` - Its feature encoding
    /// * `config` - Thresholds, radius, top-k and timeout
    ///
    /// # Returns
    ///
    /// Spatial conflicts followed by pattern conflicts, without
    /// deduplication, and the reasons for any check that was skipped.
    pub async fn detect(
        &self,
        burn: &BurnRequest,
        polygon: &Result<AffectedAreaPolygon, DegradedReason>,
        vector: &Enrichment<FeatureVector>,
        config: &EngineConfig,
    ) -> ConflictReport {
        let (spatial, pattern) = tokio::join!(
            self.spatial(burn, polygon, config),
            self.pattern(burn, vector, config)
        );

        let mut report = ConflictReport::default();
        for outcome in [spatial, pattern] {
            match outcome {
                Ok(mut conflicts) => report.conflicts.append(&mut conflicts),
                Err(reason) => report.degraded.push(reason),
            }
        }

        debug!(
            burn = %burn.id,
            conflicts = report.conflicts.len(),
            degraded = report.degraded.len(),
            "Conflict detection finished"
        );
        report
    }
}
