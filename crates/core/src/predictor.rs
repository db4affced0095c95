//! Prediction entry point.
//!
//! [`SmokePredictor`] wires the pipeline together:
//!
//! ```text
//! emissions ─┐
//!            ├─► plume ─► concentration map ─► footprint ─► encoding ─► conflicts
//! stability ─┘                                                │
//!                                                 confidence ◄┘
//! ```
//!
//! The physics is synchronous and pure; only conflict detection touches
//! external storage and is therefore async. Batches of physics-only runs
//! are spread across the rayon thread pool.

use crate::atmosphere::{classify_stability, StabilityClass};
use crate::concentration::{build_concentration_map, ConcentrationMap};
use crate::confidence::{estimate_confidence, ConfidenceFactors, ConfidenceScore};
use crate::config::EngineConfig;
use crate::conflict::{Conflict, ConflictDetector};
use crate::context::EngineContext;
use crate::core_types::{BurnId, BurnRequest, WeatherSnapshot};
use crate::emission::{estimate_emissions, EmissionProfile};
use crate::encoding::{encode_features, FeatureVector};
use crate::error::{DegradedReason, Enrichment, PredictionError};
use crate::footprint::{generate_affected_area, AffectedAreaPolygon};
use crate::plume::{simulate_plume, PlumeModel};
use crate::recommendations::{Recommendation, SafetyAdvisor};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Physics-only outcome of one burn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmokeSimulation {
    pub burn_id: BurnId,
    pub emissions: EmissionProfile,
    pub stability: StabilityClass,
    pub plume: PlumeModel,
    pub concentration: ConcentrationMap,
    pub affected_area: Result<AffectedAreaPolygon, DegradedReason>,
    pub features: Enrichment<FeatureVector>,
    pub confidence: ConfidenceScore,
    /// Every enrichment that fell back, in pipeline order
    pub degradations: Vec<DegradedReason>,
}

/// Full prediction: the simulation plus conflicts with other burns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub burn_id: BurnId,
    pub emissions: EmissionProfile,
    pub stability: StabilityClass,
    pub plume: PlumeModel,
    pub concentration: ConcentrationMap,
    pub affected_area: Result<AffectedAreaPolygon, DegradedReason>,
    pub features: Enrichment<FeatureVector>,
    pub conflicts: Vec<Conflict>,
    pub confidence: ConfidenceScore,
    pub degradations: Vec<DegradedReason>,
}

impl PredictionResult {
    fn from_simulation(sim: SmokeSimulation, conflicts: Vec<Conflict>, mut extra: Vec<DegradedReason>) -> Self {
        let mut degradations = sim.degradations;
        degradations.append(&mut extra);
        Self {
            burn_id: sim.burn_id,
            emissions: sim.emissions,
            stability: sim.stability,
            plume: sim.plume,
            concentration: sim.concentration,
            affected_area: sim.affected_area,
            features: sim.features,
            conflicts,
            confidence: sim.confidence,
            degradations,
        }
    }

    /// Whether any enrichment fell back
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Smoke dispersion predictor with its configuration, history and stores
#[derive(Debug, Clone)]
pub struct SmokePredictor {
    config: EngineConfig,
    context: EngineContext,
    detector: ConflictDetector,
}

impl SmokePredictor {
    /// Create a predictor with an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Config`] if `config` fails validation.
    pub fn new(config: EngineConfig, detector: ConflictDetector) -> Result<Self, PredictionError> {
        config.validate()?;
        Ok(Self {
            config,
            context: EngineContext::empty(),
            detector,
        })
    }

    /// Use an already loaded historical context
    #[must_use]
    pub fn with_context(mut self, context: EngineContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Swap in a new historical context, returning the previous one
    pub fn refresh_context(&mut self, context: EngineContext) -> EngineContext {
        info!(records = context.history_len(), "Refreshing historical context");
        std::mem::replace(&mut self.context, context)
    }

    /// Reload history from disk, keeping the current context on failure.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::Context`] if the file cannot be loaded.
    pub fn reload_context<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PredictionError> {
        let context = EngineContext::load(path)?;
        self.refresh_context(context);
        Ok(())
    }

    /// Run the physics pipeline for one burn.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::InvalidInput`] for an unusable burn area
    /// and [`PredictionError::Simulation`] if the plume physics breaks down.
    /// Boundary or encoding problems only degrade the result.
    pub fn simulate(&self, burn: &BurnRequest, weather: &WeatherSnapshot) -> Result<SmokeSimulation, PredictionError> {
        let config = &self.config;

        let emissions = estimate_emissions(burn.crop_type, burn.area)?;
        let stability = classify_stability(weather);
        let plume = simulate_plume(&emissions, weather, stability, burn.field_boundary.as_ref(), config)?;
        let concentration = build_concentration_map(&plume, config);
        let affected_area = generate_affected_area(
            burn.field_boundary.as_ref(),
            &plume,
            concentration.max_dispersion_radius_m,
            config,
        );
        let features = encode_features(burn, weather, &plume, &concentration, config);

        let confidence = estimate_confidence(&ConfidenceFactors {
            stability,
            wind_speed_ms: weather.wind_speed_ms().value(),
            area: burn.area,
            history_records: self.context.history_len(),
            history_threshold: config.history_confidence_min_records,
        });

        let degradations: Vec<DegradedReason> = [
            affected_area.as_ref().err(),
            features.reason(),
            self.context.unavailable_reason(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        debug!(
            burn = %burn.id,
            %stability,
            max_concentration = concentration.max_concentration,
            radius_m = concentration.max_dispersion_radius_m,
            %confidence,
            degraded = degradations.len(),
            "Simulated burn"
        );

        Ok(SmokeSimulation {
            burn_id: burn.id.clone(),
            emissions,
            stability,
            plume,
            concentration,
            affected_area,
            features,
            confidence,
            degradations,
        })
    }

    /// Full prediction including conflicts with other burns.
    ///
    /// # Errors
    ///
    /// Same as [`SmokePredictor::simulate`]. Conflict lookups never fail the
    /// prediction; their problems show up in `degradations`.
    pub async fn predict(&self, burn: &BurnRequest, weather: &WeatherSnapshot) -> Result<PredictionResult, PredictionError> {
        let simulation = self.simulate(burn, weather)?;
        let report = self
            .detector
            .detect(burn, &simulation.affected_area, &simulation.features, &self.config)
            .await;

        info!(
            burn = %burn.id,
            conflicts = report.conflicts.len(),
            confidence = %simulation.confidence,
            "Prediction complete"
        );

        Ok(PredictionResult::from_simulation(simulation, report.conflicts, report.degraded))
    }

    /// Physics for many burns in parallel; results keep input order.
    #[must_use]
    pub fn simulate_batch(
        &self,
        items: &[(BurnRequest, WeatherSnapshot)],
    ) -> Vec<Result<SmokeSimulation, PredictionError>> {
        items
            .par_iter()
            .map(|(burn, weather)| self.simulate(burn, weather))
            .collect()
    }

    /// Safety advice for a finished prediction
    #[must_use]
    pub fn recommend(&self, result: &PredictionResult) -> Vec<Recommendation> {
        SafetyAdvisor::new(&self.config).recommend(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::{InMemoryFeatureIndex, InMemoryScheduleStore};
    use crate::context::HistoricalRecord;
    use crate::core_types::{Acres, CropType, MilesPerHour, Percent};
    use crate::recommendations::AdvisoryLevel;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::Arc;

    fn predictor() -> SmokePredictor {
        let detector = ConflictDetector::new(
            Arc::new(InMemoryScheduleStore::new()),
            Arc::new(InMemoryFeatureIndex::new()),
        );
        SmokePredictor::new(EngineConfig::default(), detector).unwrap()
    }

    fn noon() -> WeatherSnapshot {
        WeatherSnapshot::calm(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
                .unwrap(),
        )
    }

    fn burn(acres: f64) -> BurnRequest {
        BurnRequest::new(BurnId::new("b-1"), Acres::new(acres), CropType::Rice)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let detector = ConflictDetector::new(
            Arc::new(InMemoryScheduleStore::new()),
            Arc::new(InMemoryFeatureIndex::new()),
        );
        let config = EngineConfig {
            distance_ladder: Vec::new(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            SmokePredictor::new(config, detector),
            Err(PredictionError::Config(_))
        ));
    }

    #[test]
    fn missing_boundary_is_recorded_not_fatal() {
        let sim = predictor().simulate(&burn(100.0), &noon()).unwrap();
        assert_eq!(sim.affected_area, Err(DegradedReason::MissingBoundary));
        assert_eq!(sim.degradations, vec![DegradedReason::MissingBoundary]);
        assert!(!sim.features.is_degraded());
    }

    #[test]
    fn history_raises_confidence() {
        let mut p = predictor();
        let before = p.simulate(&burn(100.0), &noon()).unwrap().confidence;

        let records = (0..60)
            .map(|i| HistoricalRecord {
                burn_id: BurnId::new(format!("h-{i}")),
                crop_type: CropType::Rice,
                acres: Acres::new(100.0),
                stability: StabilityClass::C,
                max_concentration: 100.0,
                max_distance_m: 2000.0,
            })
            .collect();
        let old = p.refresh_context(EngineContext::from_records(records));
        assert_eq!(old.history_len(), 0);

        let after = p.simulate(&burn(100.0), &noon()).unwrap().confidence;
        assert!((after.value() - before.value() - 0.05).abs() < 1e-9, "{before} → {after}");
    }

    /// Calm air is penalised even though the plume runs on the 1 m/s floor.
    #[test]
    fn calm_wind_lowers_confidence() {
        let mut weather = noon();
        weather.wind_speed = MilesPerHour::new(0.0);
        weather.cloud_cover = Percent::new(50.0);

        let sim = predictor().simulate(&burn(50.0), &weather).unwrap();
        assert_eq!(sim.stability, StabilityClass::A);
        assert_eq!(sim.plume.wind_speed_ms, 1.0);
        // 0.8 base, -0.1 class A, -0.1 calm
        assert!((sim.confidence.value() - 0.6).abs() < 1e-9, "{}", sim.confidence);
    }

    #[test]
    fn batch_keeps_order_and_errors() {
        let p = predictor();
        let items = vec![(burn(100.0), noon()), (burn(0.0), noon()), (burn(500.0), noon())];
        let results = p.simulate_batch(&items);

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(PredictionError::InvalidInput { .. })));
        assert_eq!(
            results[2].as_ref().unwrap().emissions,
            estimate_emissions(CropType::Rice, Acres::new(500.0)).unwrap()
        );
    }

    #[tokio::test]
    async fn predict_produces_advice() {
        let p = predictor();
        let result = p.predict(&burn(100.0), &noon()).await.unwrap();
        assert!(result.is_degraded());

        let advice = p.recommend(&result);
        assert_eq!(advice[0].level, AdvisoryLevel::Warning, "{advice:?}");
        assert!(advice.iter().any(|r| r.message.contains("boundary")));
    }
}
