//! Planned burn requests
//!
//! A `BurnRequest` is created by the upstream intake flow and is immutable
//! once a prediction runs on it. Only the canonical, strongly-typed shape
//! lives here; loose external records are normalized in [`crate::adapter`].

use super::crop::CropType;
use super::geo::FieldBoundary;
use super::units::Acres;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a burn request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BurnId(pub String);

impl BurnId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for records that arrive without one
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Daily window during which ignition is planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test; touching windows (one ends as the other
    /// starts) do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A planned agricultural burn, in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRequest {
    pub id: BurnId,
    pub farm_id: Option<String>,
    /// `None` when the record carried no usable boundary
    pub field_boundary: Option<FieldBoundary>,
    pub area: Acres,
    pub crop_type: CropType,
    pub requested_date: Option<NaiveDate>,
    pub time_window: Option<TimeWindow>,
}

impl BurnRequest {
    /// Minimal request with no boundary, date or window
    #[must_use]
    pub fn new(id: BurnId, area: Acres, crop_type: CropType) -> Self {
        Self {
            id,
            farm_id: None,
            field_boundary: None,
            area,
            crop_type,
            requested_date: None,
            time_window: None,
        }
    }

    #[must_use]
    pub fn with_boundary(mut self, boundary: FieldBoundary) -> Self {
        self.field_boundary = Some(boundary);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.requested_date = Some(date);
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    #[must_use]
    pub fn with_farm(mut self, farm_id: impl Into<String>) -> Self {
        self.farm_id = Some(farm_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn window_overlap() {
        let morning = TimeWindow::new(t(8), t(11));
        let late_morning = TimeWindow::new(t(10), t(13));
        let afternoon = TimeWindow::new(t(11), t(15));

        assert!(morning.overlaps(&late_morning));
        assert!(late_morning.overlaps(&morning));
        assert!(!morning.overlaps(&afternoon));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(BurnId::generate(), BurnId::generate());
    }
}
