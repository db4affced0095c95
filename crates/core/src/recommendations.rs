//! Safety recommendations derived from a finished prediction.

use crate::config::EngineConfig;
use crate::conflict::Severity;
use crate::error::DegradedReason;
use crate::predictor::PredictionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reach beyond which downwind communities should be notified (m)
pub const NOTIFY_DOWNWIND_DISTANCE_M: f64 = 5_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryLevel {
    Info,
    Caution,
    Warning,
}

impl fmt::Display for AdvisoryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryLevel::Info => f.write_str("info"),
            AdvisoryLevel::Caution => f.write_str("caution"),
            AdvisoryLevel::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub level: AdvisoryLevel,
    pub message: String,
}

impl Recommendation {
    fn new(level: AdvisoryLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// What a degradation means for the person reading the advice
fn describe_gap(reason: &DegradedReason) -> String {
    match reason {
        DegradedReason::MissingBoundary | DegradedReason::MalformedBoundary { .. } => {
            "Affected area map unavailable: field boundary missing or invalid".to_string()
        }
        DegradedReason::NonFiniteFeature { .. } => {
            "Similarity matching unavailable: prediction could not be encoded".to_string()
        }
        DegradedReason::SpatialCheckUnavailable { detail } => {
            format!("Nearby burn check skipped ({detail}); confirm neighbouring burns manually")
        }
        DegradedReason::QueryFailed { .. } | DegradedReason::QueryTimedOut { .. } => {
            format!("Conflict check incomplete: {reason}")
        }
        DegradedReason::HistoricalDataUnavailable { .. } => {
            "Historical dispersion data unavailable; confidence is based on physics alone".to_string()
        }
    }
}

/// Rule table turning a prediction into advice
#[derive(Debug, Clone)]
pub struct SafetyAdvisor {
    daily_threshold: f64,
    unhealthy_threshold: f64,
}

impl SafetyAdvisor {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            daily_threshold: config.daily_threshold,
            unhealthy_threshold: config.unhealthy_threshold,
        }
    }

    /// Recommendations for a prediction, most severe first.
    #[must_use]
    pub fn recommend(&self, result: &PredictionResult) -> Vec<Recommendation> {
        let mut advice = Vec::new();
        let peak = result.concentration.max_concentration;

        if peak > self.unhealthy_threshold {
            advice.push(Recommendation::new(
                AdvisoryLevel::Warning,
                format!(
                    "Peak PM2.5 of {peak:.1} µg/m³ exceeds the unhealthy level of {:.0} µg/m³; \
                     consider postponing or burning a smaller area",
                    self.unhealthy_threshold
                ),
            ));
        } else if peak > self.daily_threshold {
            advice.push(Recommendation::new(
                AdvisoryLevel::Caution,
                format!(
                    "Peak PM2.5 of {peak:.1} µg/m³ exceeds the daily standard of {:.0} µg/m³; \
                     monitor conditions during the burn",
                    self.daily_threshold
                ),
            ));
        } else {
            advice.push(Recommendation::new(
                AdvisoryLevel::Info,
                format!("Predicted PM2.5 stays within the daily standard of {:.0} µg/m³", self.daily_threshold),
            ));
        }

        let high: Vec<&str> = result
            .conflicts
            .iter()
            .filter(|c| c.severity == Severity::High)
            .map(|c| c.conflicting_burn_id.as_str())
            .collect();
        if !high.is_empty() {
            advice.push(Recommendation::new(
                AdvisoryLevel::Warning,
                format!("High-severity conflict with burn(s) {}; coordinate timing before ignition", high.join(", ")),
            ));
        }

        let reach = result.concentration.max_dispersion_radius_m;
        if reach > NOTIFY_DOWNWIND_DISTANCE_M {
            advice.push(Recommendation::new(
                AdvisoryLevel::Info,
                format!(
                    "Smoke may travel {:.1} km; notify downwind communities",
                    reach / 1000.0
                ),
            ));
        }

        advice.extend(
            result
                .degradations
                .iter()
                .map(|r| Recommendation::new(AdvisoryLevel::Info, describe_gap(r))),
        );

        advice.sort_by(|a, b| b.level.cmp(&a.level));
        advice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictSource;

    #[test]
    fn levels_order_by_severity() {
        assert!(AdvisoryLevel::Warning > AdvisoryLevel::Caution);
        assert!(AdvisoryLevel::Caution > AdvisoryLevel::Info);
    }

    #[test]
    fn gaps_name_what_is_missing() {
        let text = describe_gap(&DegradedReason::QueryTimedOut {
            origin: ConflictSource::SimilarityIndex,
            timeout_ms: 50,
        });
        assert!(text.contains("similarity index"), "{text}");
        assert!(describe_gap(&DegradedReason::MissingBoundary).contains("boundary"));
    }
}
