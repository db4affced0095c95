//! Engine configuration
//!
//! Every tunable constant of the prediction pipeline lives in
//! [`EngineConfig`]. Defaults reproduce the reference model; a JSON file may
//! override any subset of fields.

use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// EPA 24-hour PM2.5 standard (µg/m³)
pub const EPA_DAILY_PM25: f64 = 35.0;

/// Concentration treated as unhealthy for the general public (µg/m³)
pub const EPA_UNHEALTHY_PM25: f64 = 55.0;

/// Downwind receptor distances (m) at which the plume is evaluated
pub const DEFAULT_DISTANCE_LADDER: [f64; 7] = [100.0, 250.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0];

/// Tunable parameters for the whole prediction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Receptor distances (m); must be strictly increasing
    pub distance_ladder: Vec<f64>,

    /// Release height before buoyant rise (m)
    pub ground_release_height_m: f64,

    /// Flame temperature above ambient (K)
    pub flame_temperature_excess_k: f64,

    /// Upper bound on buoyant plume rise (m)
    pub max_plume_rise_m: f64,

    /// Wind speed floor used by the plume formula (m/s)
    pub min_wind_speed_ms: f64,

    /// Daily-standard threshold (µg/m³)
    pub daily_threshold: f64,

    /// Unhealthy threshold (µg/m³)
    pub unhealthy_threshold: f64,

    /// Fraction of the plume reach used for the upwind footprint
    pub upwind_factor: f64,

    /// Fraction of the plume reach used for the crosswind footprint
    pub crosswind_factor: f64,

    /// Separation below which a spatial conflict is high severity (m)
    pub high_severity_separation_m: f64,

    /// Search radius for other burns on the same day (m)
    pub spatial_search_radius_m: f64,

    /// Number of neighbours requested from the similarity index
    pub similarity_top_k: usize,

    /// Similarity above which a pattern conflict is reported
    pub similarity_threshold: f64,

    /// Similarity above which a pattern conflict is high severity
    pub high_similarity_threshold: f64,

    /// Per-query timeout for conflict lookups (ms)
    pub query_timeout_ms: u64,

    /// Historical records needed for the confidence bonus
    pub history_confidence_min_records: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distance_ladder: DEFAULT_DISTANCE_LADDER.to_vec(),
            ground_release_height_m: 2.0,
            flame_temperature_excess_k: 400.0,
            max_plume_rise_m: 100.0,
            min_wind_speed_ms: 1.0,
            daily_threshold: EPA_DAILY_PM25,
            unhealthy_threshold: EPA_UNHEALTHY_PM25,
            upwind_factor: 0.1,
            crosswind_factor: 0.5,
            high_severity_separation_m: 1000.0,
            spatial_search_radius_m: 10_000.0,
            similarity_top_k: 5,
            similarity_threshold: 0.8,
            high_similarity_threshold: 0.9,
            query_timeout_ms: 2_000,
            history_confidence_min_records: 50,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; absent fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] if the file cannot be read, is not
    /// valid JSON, or fails [`EngineConfig::validate`].
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PredictionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PredictionError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Parse configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] on malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> Result<Self, PredictionError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PredictionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<(), PredictionError> {
        for (name, value) in [
            ("ground_release_height_m", self.ground_release_height_m),
            ("flame_temperature_excess_k", self.flame_temperature_excess_k),
            ("max_plume_rise_m", self.max_plume_rise_m),
            ("min_wind_speed_ms", self.min_wind_speed_ms),
            ("daily_threshold", self.daily_threshold),
            ("unhealthy_threshold", self.unhealthy_threshold),
            ("upwind_factor", self.upwind_factor),
            ("crosswind_factor", self.crosswind_factor),
            ("high_severity_separation_m", self.high_severity_separation_m),
            ("spatial_search_radius_m", self.spatial_search_radius_m),
            ("similarity_threshold", self.similarity_threshold),
            ("high_similarity_threshold", self.high_similarity_threshold),
        ] {
            if !value.is_finite() {
                return Err(PredictionError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.distance_ladder.is_empty() {
            return Err(PredictionError::Config("distance_ladder is empty".into()));
        }
        if self.distance_ladder.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(PredictionError::Config(
                "distance_ladder entries must be finite and positive".into(),
            ));
        }
        if self.distance_ladder.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PredictionError::Config(
                "distance_ladder must be strictly increasing".into(),
            ));
        }
        if self.min_wind_speed_ms <= 0.0 {
            return Err(PredictionError::Config("min_wind_speed_ms must be positive".into()));
        }
        if self.daily_threshold <= 0.0 || self.unhealthy_threshold < self.daily_threshold {
            return Err(PredictionError::Config(
                "thresholds must satisfy 0 < daily <= unhealthy".into(),
            ));
        }
        for (name, value) in [
            ("upwind_factor", self.upwind_factor),
            ("crosswind_factor", self.crosswind_factor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PredictionError::Config(format!("{name} must be in [0, 1], got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold)
            || self.high_similarity_threshold < self.similarity_threshold
        {
            return Err(PredictionError::Config(
                "similarity thresholds must satisfy 0 <= threshold <= high <= 1".into(),
            ));
        }
        Ok(())
    }

    /// Conflict query timeout as a `Duration`
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "upwind_factor": 0.2 }"#).unwrap();
        assert_eq!(config.upwind_factor, 0.2);
        assert_eq!(config.crosswind_factor, 0.5);
        assert_eq!(config.distance_ladder, DEFAULT_DISTANCE_LADDER.to_vec());
    }

    #[test]
    fn rejects_unsorted_ladder() {
        let err = EngineConfig::from_json_str(r#"{ "distance_ladder": [100, 50] }"#).unwrap_err();
        assert!(matches!(err, PredictionError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_factor() {
        let config = EngineConfig {
            crosswind_factor: 1.5,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_scalars() {
        for config in [
            EngineConfig {
                min_wind_speed_ms: f64::NAN,
                ..EngineConfig::default()
            },
            EngineConfig {
                daily_threshold: f64::NAN,
                ..EngineConfig::default()
            },
            EngineConfig {
                spatial_search_radius_m: f64::INFINITY,
                ..EngineConfig::default()
            },
        ] {
            let err = config.validate().unwrap_err();
            assert!(matches!(&err, PredictionError::Config(msg) if msg.contains("finite")), "{err}");
        }
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "query_timeout_ms": 50 }"#).unwrap();

        let config = EngineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.query_timeout(), Duration::from_millis(50));

        assert!(EngineConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
