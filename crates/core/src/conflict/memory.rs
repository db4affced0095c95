//! In-memory implementations of the conflict read interfaces.
//!
//! Both stores are filled up front and only read afterwards, so they need
//! no interior locking. The command-line tool loads them from JSON and the
//! test suites build them directly.

use super::{BurnScheduleStore, FeatureIndex, ScheduleMatch, ScheduleQuery, SimilarBurn, StoreError};
use crate::core_types::{BurnId, BurnRequest, FieldBoundary, TimeWindow};
use crate::encoding::FeatureVector;
use async_trait::async_trait;
use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle state of a scheduled burn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl BurnStatus {
    /// Still going to happen, so it can conflict
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, BurnStatus::Pending | BurnStatus::Approved)
    }
}

/// One row of the burn schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledBurn {
    pub id: BurnId,
    #[serde(default)]
    pub farm_id: Option<String>,
    pub status: BurnStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    pub boundary: FieldBoundary,
}

impl ScheduledBurn {
    /// Schedule row for a request; `None` without a date or boundary
    #[must_use]
    pub fn from_request(burn: &BurnRequest, status: BurnStatus) -> Option<Self> {
        Some(Self {
            id: burn.id.clone(),
            farm_id: burn.farm_id.clone(),
            status,
            date: burn.requested_date?,
            time_window: burn.time_window,
            boundary: burn.field_boundary.clone()?,
        })
    }
}

/// Burn schedule held in a hash map keyed by burn id
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    burns: FxHashMap<BurnId, ScheduledBurn>,
}

impl InMemoryScheduleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a scheduled burn
    pub fn insert(&mut self, burn: ScheduledBurn) {
        self.burns.insert(burn.id.clone(), burn);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.burns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.burns.is_empty()
    }
}

impl FromIterator<ScheduledBurn> for InMemoryScheduleStore {
    fn from_iter<I: IntoIterator<Item = ScheduledBurn>>(iter: I) -> Self {
        let mut store = Self::new();
        for burn in iter {
            store.insert(burn);
        }
        store
    }
}

#[async_trait]
impl BurnScheduleStore for InMemoryScheduleStore {
    async fn overlapping_burns(&self, query: &ScheduleQuery) -> Result<Vec<ScheduleMatch>, StoreError> {
        let mut matches: Vec<ScheduleMatch> = self
            .burns
            .values()
            .filter(|b| b.id != query.burn_id && b.status.is_active() && b.date == query.date)
            .filter(|b| match (&b.time_window, &query.time_window) {
                (Some(theirs), Some(ours)) => theirs.overlaps(ours),
                _ => true,
            })
            .filter_map(|b| match b.boundary.centroid() {
                Ok(centroid) => Some((b, query.centroid.haversine_distance(&centroid))),
                Err(defect) => {
                    debug!(burn = %b.id, %defect, "Skipping scheduled burn with unusable boundary");
                    None
                }
            })
            .filter(|(_, separation)| *separation <= query.radius_m)
            .map(|(b, separation_m)| ScheduleMatch {
                burn_id: b.id.clone(),
                farm_id: b.farm_id.clone(),
                separation_m,
            })
            .collect();

        matches.sort_by(|a, b| a.separation_m.total_cmp(&b.separation_m));
        Ok(matches)
    }
}

/// Stored prediction vectors searched by brute-force cosine similarity
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatureIndex {
    vectors: FxHashMap<BurnId, FeatureVector>,
}

impl InMemoryFeatureIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the vector stored for a burn
    pub fn insert(&mut self, id: BurnId, vector: FeatureVector) {
        self.vectors.insert(id, vector);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FromIterator<(BurnId, FeatureVector)> for InMemoryFeatureIndex {
    fn from_iter<I: IntoIterator<Item = (BurnId, FeatureVector)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl FeatureIndex for InMemoryFeatureIndex {
    async fn nearest(
        &self,
        vector: &FeatureVector,
        k: usize,
        exclude: &BurnId,
    ) -> Result<Vec<SimilarBurn>, StoreError> {
        let mut scored: Vec<SimilarBurn> = self
            .vectors
            .iter()
            .filter(|(id, _)| *id != exclude)
            .map(|(id, stored)| SimilarBurn {
                burn_id: id.clone(),
                similarity: vector.cosine_similarity(stored),
            })
            .collect();

        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        Ok(scored)
    }
}
