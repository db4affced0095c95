//! Fixed-length feature encoding of a prediction for similarity search.
//!
//! Each prediction is packed into a 64-slot vector and L2-normalized so
//! that cosine similarity between two burns reduces to a dot product.
//!
//! ```text
//! slot   content
//! 0-5    peak concentration, reach, effective height, wind, sin/cos direction
//! 6-11   stability class one-hot (A..F)
//! 12-27  first 16 centerline samples, relative to peak
//! 28-30  mean σy, mean σz, fraction of samples above the daily standard
//! 36     burn area
//! 37-46  crop one-hot
//! 47-50  temperature, humidity, pressure, cloud cover
//! 56-58  month, hour, weekday of the burn
//! 59-60  daily / unhealthy exceedance flags
//! ```
//!
//! Unlisted slots stay zero.

use crate::atmosphere::StabilityClass;
use crate::concentration::ConcentrationMap;
use crate::config::EngineConfig;
use crate::core_types::{BurnRequest, CropType, WeatherSnapshot};
use crate::error::{DegradedReason, Enrichment};
use crate::plume::PlumeModel;
use chrono::{Datelike, Timelike};
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of slots in a feature vector
pub const FEATURE_DIM: usize = 64;

/// Value of every slot in the degraded fallback vector
pub const FALLBACK_VALUE: f64 = 0.1;

/// Number of centerline samples carried in the vector
const PROFILE_SLOTS: usize = 16;

const STABILITY_OFFSET: usize = 6;
const PROFILE_OFFSET: usize = 12;
const SPREAD_OFFSET: usize = 28;
const AREA_SLOT: usize = 36;
const CROP_OFFSET: usize = 37;
const WEATHER_OFFSET: usize = 47;
const CALENDAR_OFFSET: usize = 56;
const FLAG_OFFSET: usize = 59;

/// Normalization scales
const CONCENTRATION_SCALE: f64 = 10_000.0;
const DISTANCE_SCALE_M: f64 = 10_000.0;
const HEIGHT_SCALE_M: f64 = 100.0;
const WIND_SCALE_MS: f64 = 20.0;
const SIGMA_Y_SCALE_M: f64 = 2_000.0;
const SIGMA_Z_SCALE_M: f64 = 5_000.0;
const AREA_SCALE_ACRES: f64 = 1_000.0;
const TEMPERATURE_SCALE_F: f64 = 120.0;
const PRESSURE_BASE_HPA: f64 = 950.0;
const PRESSURE_SCALE_HPA: f64 = 100.0;

/// Raw 64-slot storage
pub type FeatureArray = SVector<f64, FEATURE_DIM>;

/// L2-normalized 64-slot feature vector (or the zero vector)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(FeatureArray);

impl FeatureVector {
    #[must_use]
    pub fn zeros() -> Self {
        Self(FeatureArray::zeros())
    }

    /// Constant vector used when encoding fails
    #[must_use]
    pub fn fallback() -> Self {
        Self(FeatureArray::repeat(FALLBACK_VALUE))
    }

    /// Scale to unit length; a zero-magnitude input stays the zero vector
    #[must_use]
    pub fn normalized(raw: FeatureArray) -> Self {
        let norm = raw.norm();
        if norm > 0.0 {
            Self(raw / norm)
        } else {
            Self(FeatureArray::zeros())
        }
    }

    /// Normalize a slice of exactly [`FEATURE_DIM`] values
    #[must_use]
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        (values.len() == FEATURE_DIM).then(|| Self::normalized(FeatureArray::from_column_slice(values)))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    #[must_use]
    pub fn norm(&self) -> f64 {
        self.0.norm()
    }

    /// Cosine similarity in [-1, 1]; 0 when either vector is zero
    #[must_use]
    pub fn cosine_similarity(&self, other: &FeatureVector) -> f64 {
        let denom = self.0.norm() * other.0.norm();
        if denom > 0.0 {
            self.0.dot(&other.0) / denom
        } else {
            0.0
        }
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Fill the raw, un-normalized slots
fn raw_features(
    burn: &BurnRequest,
    weather: &WeatherSnapshot,
    plume: &PlumeModel,
    map: &ConcentrationMap,
    config: &EngineConfig,
) -> FeatureArray {
    let mut raw = FeatureArray::zeros();
    let max_c = map.max_concentration;

    // Dispersion summary
    raw[0] = max_c.max(0.0).ln_1p() / CONCENTRATION_SCALE.ln_1p();
    raw[1] = map.max_dispersion_radius_m / DISTANCE_SCALE_M;
    raw[2] = plume.effective_height_m / HEIGHT_SCALE_M;
    raw[3] = plume.wind_speed_ms / WIND_SCALE_MS;
    raw[4] = plume.wind_direction_rad.sin();
    raw[5] = plume.wind_direction_rad.cos();

    for class in StabilityClass::ALL {
        raw[STABILITY_OFFSET + class.index()] = flag(plume.stability == class);
    }

    for (i, point) in plume.points.iter().take(PROFILE_SLOTS).enumerate() {
        raw[PROFILE_OFFSET + i] = if max_c > 0.0 { point.concentration / max_c } else { 0.0 };
    }

    raw[SPREAD_OFFSET] = mean(plume.points.iter().map(|p| p.sigma_y)) / SIGMA_Y_SCALE_M;
    raw[SPREAD_OFFSET + 1] = mean(plume.points.iter().map(|p| p.sigma_z)) / SIGMA_Z_SCALE_M;
    raw[SPREAD_OFFSET + 2] = map.daily_exceedance_fraction();

    // Burn attributes
    raw[AREA_SLOT] = burn.area.value() / AREA_SCALE_ACRES;
    for crop in CropType::ALL {
        raw[CROP_OFFSET + crop.index()] = flag(burn.crop_type == crop);
    }

    // Weather
    raw[WEATHER_OFFSET] = weather.temperature.value() / TEMPERATURE_SCALE_F;
    raw[WEATHER_OFFSET + 1] = weather.humidity.to_fraction();
    raw[WEATHER_OFFSET + 2] = (weather.pressure - PRESSURE_BASE_HPA) / PRESSURE_SCALE_HPA;
    raw[WEATHER_OFFSET + 3] = weather.cloud_cover.to_fraction();

    // Calendar: the requested date and window start when known
    let date = burn
        .requested_date
        .unwrap_or_else(|| weather.timestamp.date_naive());
    let hour = burn
        .time_window
        .map_or_else(|| weather.local_hour(), |w| w.start.hour());
    raw[CALENDAR_OFFSET] = f64::from(date.month0()) / 11.0;
    raw[CALENDAR_OFFSET + 1] = f64::from(hour) / 23.0;
    raw[CALENDAR_OFFSET + 2] = f64::from(date.weekday().num_days_from_monday()) / 6.0;

    raw[FLAG_OFFSET] = flag(max_c > config.daily_threshold);
    raw[FLAG_OFFSET + 1] = flag(max_c > config.unhealthy_threshold);

    raw
}

/// Encode a prediction into a feature vector.
///
/// # Returns
///
/// A complete, L2-normalized vector; or, if any slot came out non-finite,
/// the constant [`FeatureVector::fallback`] tagged with the offending slot.
#[must_use]
pub fn encode_features(
    burn: &BurnRequest,
    weather: &WeatherSnapshot,
    plume: &PlumeModel,
    map: &ConcentrationMap,
    config: &EngineConfig,
) -> Enrichment<FeatureVector> {
    let raw = raw_features(burn, weather, plume, map, config);

    if let Some(index) = raw.iter().position(|v| !v.is_finite()) {
        warn!(burn = %burn.id, index, "Non-finite feature, using fallback vector");
        return Enrichment::degraded(FeatureVector::fallback(), DegradedReason::NonFiniteFeature { index });
    }

    Enrichment::complete(FeatureVector::normalized(raw))
}
