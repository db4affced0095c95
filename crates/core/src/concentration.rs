//! Threshold analysis of the centerline concentration profile.
//!
//! Turns the plume's distance ladder into the quantities the safety layer
//! reasons about: where the profile crosses regulatory thresholds, how
//! large an area sits above them, and how far the smoke effectively
//! reaches.
//!
//! Threshold crossings are found by linear interpolation between adjacent
//! ladder points:
//!
//! ```text
//! f = (T - C₁) / (C₂ - C₁)
//! d = d₁ + f × (d₂ - d₁)
//! area ≈ π × d × σy(d) / 2        (half-ellipse footprint)
//! ```

use crate::config::EngineConfig;
use crate::plume::{sigma_y, PlumeModel, PlumePoint};
use serde::{Deserialize, Serialize};

/// Fraction of the peak concentration used as the fallback reach cut-off
const REACH_FRACTION_OF_MAX: f64 = 0.1;

/// Centerline sample with its daily-standard flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterlinePoint {
    pub distance_m: f64,
    pub concentration: f64,
    pub exceeds_daily: bool,
}

/// Where the profile crosses a threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContourPoint {
    /// Interpolated crossing distance (m)
    pub distance_m: f64,
    /// σy at the crossing (m)
    pub lateral_extent_m: f64,
    /// Half-ellipse area enclosed up to the crossing (m²)
    pub area_m2: f64,
}

/// All crossings of one threshold, nearest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdContour {
    /// Concentration level (µg/m³)
    pub threshold: f64,
    pub points: Vec<ContourPoint>,
}

impl ThresholdContour {
    /// Largest enclosed area over all crossings (m²), 0 when never crossed
    #[must_use]
    pub fn exceedance_area_m2(&self) -> f64 {
        self.points.iter().map(|p| p.area_m2).fold(0.0, f64::max)
    }
}

/// Distance-indexed concentration summary of one plume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationMap {
    pub centerline: Vec<CenterlinePoint>,
    /// One contour per configured threshold, daily then unhealthy
    pub contours: Vec<ThresholdContour>,
    /// Peak centerline concentration (µg/m³)
    pub max_concentration: f64,
    /// Effective reach of the smoke (m)
    pub max_dispersion_radius_m: f64,
}

impl ConcentrationMap {
    /// Contour for an exact threshold value, if one was computed
    #[must_use]
    pub fn contour(&self, threshold: f64) -> Option<&ThresholdContour> {
        self.contours
            .iter()
            .find(|c| (c.threshold - threshold).abs() < f64::EPSILON)
    }

    /// Fraction of centerline samples above the daily standard
    #[must_use]
    pub fn daily_exceedance_fraction(&self) -> f64 {
        if self.centerline.is_empty() {
            return 0.0;
        }
        let over = self.centerline.iter().filter(|p| p.exceeds_daily).count();
        over as f64 / self.centerline.len() as f64
    }
}

/// Linear interpolation of the distance at which the profile between two
/// samples reaches `level`; `None` if the pair does not straddle it.
fn crossing(a: &PlumePoint, b: &PlumePoint, level: f64) -> Option<f64> {
    let straddles = (a.concentration >= level && b.concentration < level)
        || (a.concentration < level && b.concentration >= level);
    if !straddles {
        return None;
    }
    let fraction = (level - a.concentration) / (b.concentration - a.concentration);
    Some(a.distance_m + fraction * (b.distance_m - a.distance_m))
}

fn threshold_contour(plume: &PlumeModel, threshold: f64) -> ThresholdContour {
    let points = plume
        .points
        .windows(2)
        .filter_map(|pair| crossing(&pair[0], &pair[1], threshold))
        .map(|distance_m| {
            let lateral_extent_m = sigma_y(plume.stability, distance_m);
            ContourPoint {
                distance_m,
                lateral_extent_m,
                area_m2: std::f64::consts::PI * distance_m * lateral_extent_m / 2.0,
            }
        })
        .collect();

    ThresholdContour { threshold, points }
}

/// Effective reach of the plume.
///
/// The farthest ladder distance still above the daily standard. When no
/// point exceeds it, the interpolated distance at which the profile first
/// falls to 10% of its peak, or the last ladder distance if it never does.
/// A profile with zero peak has zero reach.
#[must_use]
pub fn max_dispersion_radius(plume: &PlumeModel, daily_threshold: f64) -> f64 {
    if let Some(p) = plume
        .points
        .iter()
        .rev()
        .find(|p| p.concentration > daily_threshold)
    {
        return p.distance_m;
    }

    let max = plume.max_concentration();
    if max <= 0.0 {
        return 0.0;
    }

    let cutoff = max * REACH_FRACTION_OF_MAX;
    let peak_index = plume
        .points
        .iter()
        .position(|p| p.concentration >= max)
        .unwrap_or(0);

    plume.points[peak_index..]
        .windows(2)
        .find_map(|pair| {
            (pair[0].concentration > cutoff && pair[1].concentration <= cutoff).then(|| {
                let fraction =
                    (cutoff - pair[0].concentration) / (pair[1].concentration - pair[0].concentration);
                pair[0].distance_m + fraction * (pair[1].distance_m - pair[0].distance_m)
            })
        })
        .unwrap_or_else(|| plume.max_distance())
}

/// Build the concentration map for a simulated plume.
#[must_use]
pub fn build_concentration_map(plume: &PlumeModel, config: &EngineConfig) -> ConcentrationMap {
    let centerline = plume
        .points
        .iter()
        .map(|p| CenterlinePoint {
            distance_m: p.distance_m,
            concentration: p.concentration,
            exceeds_daily: p.concentration > config.daily_threshold,
        })
        .collect();

    let contours = [config.daily_threshold, config.unhealthy_threshold]
        .into_iter()
        .map(|t| threshold_contour(plume, t))
        .collect();

    ConcentrationMap {
        centerline,
        contours,
        max_concentration: plume.max_concentration(),
        max_dispersion_radius_m: max_dispersion_radius(plume, config.daily_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::StabilityClass;
    use crate::core_types::Degrees;
    use approx::assert_relative_eq;

    fn plume_from(profile: &[(f64, f64)]) -> PlumeModel {
        let class = StabilityClass::D;
        PlumeModel {
            effective_height_m: 2.0,
            plume_rise_m: 0.0,
            wind_speed_ms: 2.0,
            wind_direction: Degrees::new(90.0),
            wind_direction_rad: std::f64::consts::FRAC_PI_2,
            stability: class,
            emission_rate_gs: 100.0,
            source: None,
            points: profile
                .iter()
                .map(|&(distance_m, concentration)| {
                    let sy = sigma_y(class, distance_m);
                    PlumePoint {
                        distance_m,
                        concentration,
                        lateral_spread_m: 2.0 * sy,
                        sigma_y: sy,
                        sigma_z: crate::plume::sigma_z(class, distance_m),
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn contour_is_interpolated() {
        let plume = plume_from(&[(100.0, 200.0), (1000.0, 60.0), (2000.0, 10.0)]);
        let map = build_concentration_map(&plume, &EngineConfig::default());

        let daily = map.contour(35.0).unwrap();
        assert_eq!(daily.points.len(), 1);
        // 60 → 10 crosses 35 halfway
        assert_relative_eq!(daily.points[0].distance_m, 1500.0, epsilon = 1e-9);
        let sy = sigma_y(StabilityClass::D, 1500.0);
        assert_relative_eq!(daily.points[0].lateral_extent_m, sy);
        assert_relative_eq!(daily.points[0].area_m2, std::f64::consts::PI * 1500.0 * sy / 2.0);

        let unhealthy = map.contour(55.0).unwrap();
        assert_eq!(unhealthy.points.len(), 1, "{unhealthy:?}");
        // 60 → 10 crosses 55 a tenth of the way
        assert_relative_eq!(unhealthy.points[0].distance_m, 1100.0, epsilon = 1e-9);
    }

    #[test]
    fn max_concentration_matches_profile() {
        let plume = plume_from(&[(100.0, 20.0), (250.0, 80.0), (500.0, 30.0)]);
        let map = build_concentration_map(&plume, &EngineConfig::default());
        assert_eq!(map.max_concentration, 80.0);
        assert!(map.centerline[1].exceeds_daily);
        assert!(!map.centerline[2].exceeds_daily);
        assert_relative_eq!(map.daily_exceedance_fraction(), 1.0 / 3.0);
    }

    #[test]
    fn rising_then_falling_profile_crosses_twice() {
        let plume = plume_from(&[(100.0, 10.0), (250.0, 90.0), (500.0, 20.0)]);
        let map = build_concentration_map(&plume, &EngineConfig::default());
        let daily = map.contour(35.0).unwrap();
        assert_eq!(daily.points.len(), 2);
        assert!(daily.points[0].distance_m < daily.points[1].distance_m);
        assert_relative_eq!(daily.exceedance_area_m2(), daily.points[1].area_m2);
    }

    #[test]
    fn radius_is_farthest_exceeding_point() {
        let plume = plume_from(&[(100.0, 500.0), (1000.0, 50.0), (5000.0, 36.0), (10_000.0, 5.0)]);
        assert_eq!(max_dispersion_radius(&plume, 35.0), 5000.0);
    }

    /// Below the standard everywhere: reach is where the profile drops to 10% of peak.
    #[test]
    fn radius_falls_back_to_tenth_of_peak() {
        let plume = plume_from(&[(100.0, 20.0), (1000.0, 10.0), (2000.0, 1.0)]);
        // 10 → 1 crosses 2 at 8/9 of the way
        assert_relative_eq!(max_dispersion_radius(&plume, 35.0), 1000.0 + 8.0 / 9.0 * 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn radius_uses_last_distance_when_profile_stays_high() {
        let plume = plume_from(&[(100.0, 20.0), (1000.0, 15.0), (2000.0, 10.0)]);
        assert_eq!(max_dispersion_radius(&plume, 35.0), 2000.0);
    }

    #[test]
    fn zero_profile_has_zero_radius() {
        let plume = plume_from(&[(100.0, 0.0), (1000.0, 0.0)]);
        let map = build_concentration_map(&plume, &EngineConfig::default());
        assert_eq!(map.max_dispersion_radius_m, 0.0);
        assert!(map.contours.iter().all(|c| c.points.is_empty()));
    }
}
