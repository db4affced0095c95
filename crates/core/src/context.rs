//! Historical dispersion context shared by predictions.
//!
//! The context is an immutable value: predictions read it, nothing mutates
//! it. Picking up new history means loading a fresh context and handing it
//! to [`crate::SmokePredictor::refresh_context`].

use crate::atmosphere::StabilityClass;
use crate::core_types::{Acres, BurnId, CropType};
use crate::error::{DegradedReason, PredictionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one past burn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub burn_id: BurnId,
    pub crop_type: CropType,
    pub acres: Acres,
    pub stability: StabilityClass,
    /// Peak centerline concentration (µg/m³)
    pub max_concentration: f64,
    /// Effective reach (m)
    pub max_distance_m: f64,
}

/// Immutable snapshot of historical dispersion records
#[derive(Debug, Clone)]
pub struct EngineContext {
    records: Arc<[HistoricalRecord]>,
    unavailable: Option<DegradedReason>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl EngineContext {
    /// Context with no history
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_records(records: Vec<HistoricalRecord>) -> Self {
        Self {
            records: records.into(),
            unavailable: None,
        }
    }

    /// Load records from a JSON array file.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Context`] if the file cannot be read or
    /// parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PredictionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PredictionError::Context(format!("cannot read {}: {e}", path.display())))?;
        let records: Vec<HistoricalRecord> = serde_json::from_str(&contents)
            .map_err(|e| PredictionError::Context(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), records = records.len(), "Loaded historical context");
        Ok(Self::from_records(records))
    }

    /// Load records, falling back to an empty history on any failure.
    ///
    /// The failure is logged and kept as [`EngineContext::unavailable_reason`]
    /// so predictions can report it.
    #[must_use]
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "Historical context unavailable, continuing without history");
                Self {
                    unavailable: Some(DegradedReason::HistoricalDataUnavailable { detail: e.to_string() }),
                    ..Self::empty()
                }
            }
        }
    }

    /// Number of historical records
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// Why history is missing, if the last load failed
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&DegradedReason> {
        self.unavailable.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> HistoricalRecord {
        HistoricalRecord {
            burn_id: BurnId::new(id),
            crop_type: CropType::Rice,
            acres: Acres::new(80.0),
            stability: StabilityClass::C,
            max_concentration: 120.0,
            max_distance_m: 2000.0,
        }
    }

    #[test]
    fn loads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let json = serde_json::to_string(&vec![record("a"), record("b")]).unwrap();
        std::fs::write(&path, json).unwrap();

        let context = EngineContext::load(&path).unwrap();
        assert_eq!(context.history_len(), 2);
        assert_eq!(context.records()[1].burn_id, BurnId::new("b"));
        assert!(context.unavailable_reason().is_none());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let context = EngineContext::load_or_empty(dir.path().join("nope.json"));
        assert_eq!(context.history_len(), 0);
        assert!(matches!(
            context.unavailable_reason(),
            Some(DegradedReason::HistoricalDataUnavailable { .. })
        ));
    }

    #[test]
    fn malformed_file_is_a_context_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EngineContext::load(&path), Err(PredictionError::Context(_))));
    }

    #[test]
    fn clones_share_records() {
        let context = EngineContext::from_records(vec![record("a")]);
        let copy = context.clone();
        assert!(std::ptr::eq(context.records().as_ptr(), copy.records().as_ptr()));
    }
}
