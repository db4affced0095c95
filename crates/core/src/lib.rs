//! Smoke Simulation Core Library
//!
//! Smoke dispersion prediction and conflict detection for agricultural field
//! burns. Given a planned burn and a weather reading, the engine estimates
//! particulate emissions, runs a steady-state Gaussian plume, maps where
//! ground-level PM2.5 crosses air-quality thresholds, projects the affected
//! area, and checks the result against other scheduled and historical burns.
//!
//! ## Pipeline
//!
//! - Emission inventory from crop residue load and area
//! - Pasquill-Gifford stability from wind, cloud cover and time of day
//! - Buoyant plume rise and Pasquill-Gifford dispersion coefficients
//! - Threshold contours and effective reach of the smoke
//! - Directional affected-area polygon around the field
//! - 64-slot feature encoding for similarity search
//! - Concurrent, timeout-bounded conflict lookups
//!
//! Auxiliary steps never abort a prediction: they return a tagged
//! [`DegradedReason`] and the physics result is still delivered.

// Core types and utilities
pub mod core_types;
pub mod config;
pub mod error;

// Physics
pub mod atmosphere;
pub mod emission;
pub mod plume;
pub mod concentration;
pub mod footprint;

// Enrichment and orchestration
pub mod adapter;
pub mod confidence;
pub mod conflict;
pub mod context;
pub mod encoding;
pub mod predictor;
pub mod recommendations;

// Re-export core types
pub use core_types::{BurnId, BurnRequest, CropType, FieldBoundary, LonLat, TimeWindow, WeatherSnapshot};
pub use config::EngineConfig;
pub use error::{DegradedReason, Enrichment, PredictionError};

// Re-export physics
pub use atmosphere::{classify_stability, StabilityClass};
pub use concentration::{build_concentration_map, ConcentrationMap};
pub use emission::{estimate_emissions, EmissionProfile};
pub use footprint::{generate_affected_area, AffectedAreaPolygon};
pub use plume::{simulate_plume, PlumeModel, PlumePoint};

// Re-export enrichment and orchestration
pub use adapter::{RawBurnRecord, RawPredictionRequest, RawWeatherRecord};
pub use confidence::{estimate_confidence, ConfidenceScore};
pub use conflict::{
    BurnScheduleStore, Conflict, ConflictDetector, ConflictReport, ConflictType, FeatureIndex,
    InMemoryFeatureIndex, InMemoryScheduleStore, Severity, StoreError,
};
pub use context::{EngineContext, HistoricalRecord};
pub use encoding::{encode_features, FeatureVector, FEATURE_DIM};
pub use predictor::{PredictionResult, SmokePredictor, SmokeSimulation};
pub use recommendations::{AdvisoryLevel, Recommendation, SafetyAdvisor};
