//! Heuristic confidence in a plume prediction.
//!
//! The Gaussian model is most trustworthy in neutral, moderately windy
//! conditions over sizeable fields, and when there is enough local history
//! to compare against. The score starts at 0.8 and is nudged by each factor:
//!
//! ```text
//! stability   D +0.10        A or F −0.10
//! wind (m/s)  2..=10 +0.05   <1 or >15 −0.10
//! history     ≥ N records +0.05
//! area (ac)   >100 +0.05     <10 −0.05
//! result clamped to [0.3, 1.0]
//! ```

use crate::atmosphere::StabilityClass;
use crate::core_types::Acres;
use serde::{Deserialize, Serialize};

const BASE_CONFIDENCE: f64 = 0.8;

/// Lowest score ever reported
pub const MIN_CONFIDENCE: f64 = 0.3;

/// Highest score ever reported
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Prediction confidence in [0.3, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Inputs to the confidence heuristic
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceFactors {
    pub stability: StabilityClass,
    /// Observed wind speed before the transport floor (m/s)
    pub wind_speed_ms: f64,
    pub area: Acres,
    /// Historical dispersion records available
    pub history_records: usize,
    /// Records needed for the history bonus
    pub history_threshold: usize,
}

/// Score a prediction.
///
/// Non-finite wind or area simply earns no adjustment for that factor.
#[must_use]
pub fn estimate_confidence(factors: &ConfidenceFactors) -> ConfidenceScore {
    let mut score = BASE_CONFIDENCE;

    if factors.stability == StabilityClass::NEUTRAL {
        score += 0.1;
    } else if factors.stability.is_extreme() {
        score -= 0.1;
    }

    let wind = factors.wind_speed_ms;
    if (2.0..=10.0).contains(&wind) {
        score += 0.05;
    } else if wind < 1.0 || wind > 15.0 {
        score -= 0.1;
    }

    if factors.history_records >= factors.history_threshold {
        score += 0.05;
    }

    let acres = factors.area.value();
    if acres > 100.0 {
        score += 0.05;
    } else if acres < 10.0 {
        score -= 0.05;
    }

    ConfidenceScore(score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE))
}
