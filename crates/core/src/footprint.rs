//! Directional footprint of the smoke plume on the map.
//!
//! The affected area is a 16-point star around the field centroid. Bearings
//! within 45° of the wind direction get the full plume reach, bearings more
//! than 135° away get a short upwind fringe, and everything in between gets
//! a crosswind fraction.

use crate::config::EngineConfig;
use crate::core_types::{Degrees, FieldBoundary, LonLat, Offset};
use crate::error::DegradedReason;
use crate::plume::PlumeModel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of bearings sampled around the source
pub const BEARING_COUNT: usize = 16;

/// Angle between sampled bearings (degrees)
pub const BEARING_STEP_DEG: f64 = 360.0 / BEARING_COUNT as f64;

/// Angular difference to the wind within which the full reach applies
const DOWNWIND_SECTOR_DEG: f64 = 45.0;

/// Angular difference beyond which a bearing counts as upwind
const UPWIND_SECTOR_DEG: f64 = 135.0;

/// Closed polygon approximating the plume footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedAreaPolygon {
    /// Closed ring, first point repeated as last
    pub ring: Vec<LonLat>,
    /// Field centroid the ring was projected from
    pub centroid: LonLat,
}

impl AffectedAreaPolygon {
    /// First and last ring positions coincide
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.ring.len() > 1 && self.ring.first() == self.ring.last()
    }
}

/// Reach along one bearing.
///
/// # Arguments
///
/// * `bearing` - Compass bearing being sampled
/// * `wind_direction` - Bearing the plume travels toward
/// * `max_distance_m` - Full downwind reach (m)
/// * `config` - Supplies the upwind and crosswind fractions
#[must_use]
pub fn reach_along(bearing: Degrees, wind_direction: Degrees, max_distance_m: f64, config: &EngineConfig) -> f64 {
    let diff = bearing.separation(wind_direction);
    if diff <= DOWNWIND_SECTOR_DEG {
        max_distance_m
    } else if diff > UPWIND_SECTOR_DEG {
        config.upwind_factor * max_distance_m
    } else {
        config.crosswind_factor * max_distance_m
    }
}

/// Project the plume footprint around the field centroid.
///
/// # Errors
///
/// Returns [`DegradedReason::MissingBoundary`] when there is no boundary and
/// [`DegradedReason::MalformedBoundary`] when it cannot be reduced to a
/// centroid. Neither is fatal to the prediction.
pub fn generate_affected_area(
    boundary: Option<&FieldBoundary>,
    plume: &PlumeModel,
    max_distance_m: f64,
    config: &EngineConfig,
) -> Result<AffectedAreaPolygon, DegradedReason> {
    let boundary = boundary.ok_or(DegradedReason::MissingBoundary)?;
    let centroid = boundary
        .centroid()
        .map_err(|defect| DegradedReason::MalformedBoundary {
            detail: defect.to_string(),
        })?;

    let mut ring: Vec<LonLat> = (0..BEARING_COUNT)
        .map(|i| {
            let bearing = Degrees::new(i as f64 * BEARING_STEP_DEG);
            let reach = reach_along(bearing, plume.wind_direction, max_distance_m, config);
            let theta = bearing.to_radians();
            centroid.offset_by(Offset::new(reach * theta.sin(), reach * theta.cos()))
        })
        .collect();
    ring.push(ring[0]);

    debug!(
        lon = centroid.lon,
        lat = centroid.lat,
        max_distance_m,
        "Projected affected area"
    );

    Ok(AffectedAreaPolygon { ring, centroid })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::StabilityClass;
    use crate::core_types::geo::{METERS_PER_DEGREE_LAT, METERS_PER_DEGREE_LON};
    use approx::assert_relative_eq;

    fn plume_toward(direction: f64) -> PlumeModel {
        PlumeModel {
            effective_height_m: 2.0,
            plume_rise_m: 0.0,
            wind_speed_ms: 2.0,
            wind_direction: Degrees::new(direction),
            wind_direction_rad: direction.to_radians(),
            stability: StabilityClass::D,
            emission_rate_gs: 100.0,
            source: None,
            points: Vec::new(),
        }
    }

    fn square() -> FieldBoundary {
        FieldBoundary::new(vec![
            LonLat::new(-121.71, 38.49),
            LonLat::new(-121.71, 38.51),
            LonLat::new(-121.69, 38.51),
            LonLat::new(-121.69, 38.49),
            LonLat::new(-121.71, 38.49),
        ])
    }

    #[test]
    fn ring_is_closed_with_seventeen_points() {
        let poly = generate_affected_area(Some(&square()), &plume_toward(45.0), 5000.0, &EngineConfig::default())
            .unwrap();
        assert_eq!(poly.ring.len(), BEARING_COUNT + 1);
        assert!(poly.is_closed());
        assert_relative_eq!(poly.centroid.lon, -121.70, epsilon = 1e-9);
        assert_relative_eq!(poly.centroid.lat, 38.50, epsilon = 1e-9);
    }

    /// Wind toward the east stretches the ring eastward.
    #[test]
    fn downwind_vertex_gets_full_reach() {
        let poly = generate_affected_area(Some(&square()), &plume_toward(90.0), 5000.0, &EngineConfig::default())
            .unwrap();
        let c = poly.centroid;

        // index 4 = 90°, index 12 = 270°, index 0 = 0°
        let east = poly.ring[4];
        let west = poly.ring[12];
        let north = poly.ring[0];
        assert_relative_eq!((east.lon - c.lon) * METERS_PER_DEGREE_LON, 5000.0, epsilon = 1e-6);
        assert_relative_eq!((c.lon - west.lon) * METERS_PER_DEGREE_LON, 500.0, epsilon = 1e-6);
        assert_relative_eq!((north.lat - c.lat) * METERS_PER_DEGREE_LAT, 2500.0, epsilon = 1e-6);
    }

    #[test]
    fn sector_boundaries() {
        let config = EngineConfig::default();
        let wind = Degrees::new(0.0);
        assert_eq!(reach_along(Degrees::new(45.0), wind, 1000.0, &config), 1000.0);
        assert_eq!(reach_along(Degrees::new(67.5), wind, 1000.0, &config), 500.0);
        assert_eq!(reach_along(Degrees::new(135.0), wind, 1000.0, &config), 500.0);
        assert_eq!(reach_along(Degrees::new(157.5), wind, 1000.0, &config), 100.0);
        assert_eq!(reach_along(Degrees::new(337.5), wind, 1000.0, &config), 1000.0);
    }

    #[test]
    fn missing_or_malformed_boundary_degrades() {
        let plume = plume_toward(0.0);
        let config = EngineConfig::default();

        assert_eq!(
            generate_affected_area(None, &plume, 1000.0, &config),
            Err(DegradedReason::MissingBoundary)
        );

        let line = FieldBoundary::new(vec![LonLat::new(0.0, 0.0), LonLat::new(0.1, 0.1)]);
        let err = generate_affected_area(Some(&line), &plume, 1000.0, &config).unwrap_err();
        assert!(matches!(err, DegradedReason::MalformedBoundary { .. }), "{err:?}");
    }
}
