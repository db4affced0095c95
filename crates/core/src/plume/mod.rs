//! Steady-state Gaussian plume simulation for a single field burn.
//!
//! The burn is treated as a continuous point source at the field centroid,
//! released just above the ground and lifted by buoyancy. Ground-level
//! centerline concentrations are evaluated on a fixed ladder of downwind
//! distances; everything downstream (contours, footprint, encoding) works
//! from that ladder.

pub mod dispersion;

pub use dispersion::{
    centerline_concentration, receptor_concentration, sigma_y, sigma_z, SigmaCoefficients,
};

use crate::atmosphere::{BuoyantRise, StabilityClass};
use crate::config::EngineConfig;
use crate::core_types::{Degrees, FieldBoundary, LonLat, WeatherSnapshot};
use crate::emission::EmissionProfile;
use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Concentration sample on the plume centerline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlumePoint {
    /// Downwind distance from the source (m)
    pub distance_m: f64,
    /// Ground-level centerline PM2.5 (µg/m³)
    pub concentration: f64,
    /// Full plume width containing ~95% of the mass, 2σy (m)
    pub lateral_spread_m: f64,
    pub sigma_y: f64,
    pub sigma_z: f64,
}

/// Result of the plume simulation.
///
/// Points are ordered by strictly increasing distance and every
/// concentration is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlumeModel {
    /// Release height plus buoyant rise (m)
    pub effective_height_m: f64,
    /// Buoyant rise component (m)
    pub plume_rise_m: f64,
    /// Transport wind speed after flooring (m/s)
    pub wind_speed_ms: f64,
    /// Bearing the plume travels toward
    pub wind_direction: Degrees,
    pub wind_direction_rad: f64,
    pub stability: StabilityClass,
    /// Emission rate the concentrations were computed from (g/s)
    pub emission_rate_gs: f64,
    /// Field centroid, when the boundary was usable
    pub source: Option<LonLat>,
    pub points: Vec<PlumePoint>,
}

impl PlumeModel {
    /// Highest centerline concentration (µg/m³), 0 for an empty profile
    #[must_use]
    pub fn max_concentration(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.concentration)
            .fold(0.0, f64::max)
    }

    /// Farthest distance on the ladder (m)
    #[must_use]
    pub fn max_distance(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_m)
    }

    /// Concentration at any receptor around the source.
    ///
    /// # Arguments
    ///
    /// * `downwind_m` - Distance along the plume axis (m)
    /// * `crosswind_m` - Offset perpendicular to the axis (m)
    /// * `height_m` - Receptor height above ground (m)
    #[must_use]
    pub fn concentration_at(&self, downwind_m: f64, crosswind_m: f64, height_m: f64) -> f64 {
        receptor_concentration(
            self.emission_rate_gs,
            self.wind_speed_ms,
            self.effective_height_m,
            downwind_m,
            crosswind_m,
            height_m,
            self.stability,
        )
    }
}

fn ensure_finite(stage: &'static str, name: &str, value: f64) -> Result<f64, PredictionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictionError::simulation(stage, format!("{name} is {value}")))
    }
}

/// Run the Gaussian plume model.
///
/// # Arguments
///
/// * `emissions` - Emission profile of the burn
/// * `weather` - Weather at the site
/// * `stability` - Stability class for this weather
/// * `boundary` - Field boundary, used only to locate the source
/// * `config` - Engine configuration (distance ladder, rise parameters)
///
/// # Errors
///
/// Returns [`PredictionError::Simulation`] if any intermediate quantity
/// (temperature, wind, rise, spreads or concentration) is not finite.
pub fn simulate_plume(
    emissions: &EmissionProfile,
    weather: &WeatherSnapshot,
    stability: StabilityClass,
    boundary: Option<&FieldBoundary>,
    config: &EngineConfig,
) -> Result<PlumeModel, PredictionError> {
    let emission_rate = ensure_finite("emission", "emission rate", emissions.emission_rate_gs)?;

    let wind = weather.wind_speed_ms();
    ensure_finite("wind", "wind speed", wind.value())?;
    let wind = wind.at_least(config.min_wind_speed_ms);

    let wind_direction = weather.wind_direction;
    ensure_finite("wind", "wind direction", wind_direction.value())?;
    let wind_direction = wind_direction.normalized();

    let ambient = weather.temperature.to_kelvin();
    ensure_finite("plume rise", "ambient temperature", ambient.value())?;
    if ambient.value() <= 0.0 {
        return Err(PredictionError::simulation(
            "plume rise",
            format!("ambient temperature {ambient} is not physical"),
        ));
    }

    let rise = BuoyantRise::calculate(
        emission_rate,
        ambient,
        config.flame_temperature_excess_k,
        wind,
        config.max_plume_rise_m,
    );
    let plume_rise = ensure_finite("plume rise", "plume rise", rise.rise_m)?;
    let effective_height = config.ground_release_height_m + plume_rise;

    let source = boundary.and_then(|b| match b.centroid() {
        Ok(c) => Some(c),
        Err(defect) => {
            warn!(%defect, "Field boundary unusable, plume source has no location");
            None
        }
    });

    let mut points = Vec::with_capacity(config.distance_ladder.len());
    for &distance in &config.distance_ladder {
        let sy = ensure_finite("dispersion", "sigma_y", sigma_y(stability, distance))?;
        let sz = ensure_finite("dispersion", "sigma_z", sigma_z(stability, distance))?;
        let concentration = centerline_concentration(emission_rate, wind.value(), effective_height, sy, sz);

        if !concentration.is_finite() {
            return Err(PredictionError::simulation(
                "concentration",
                format!("concentration at {distance} m is {concentration}"),
            ));
        }

        points.push(PlumePoint {
            distance_m: distance,
            concentration,
            lateral_spread_m: 2.0 * sy,
            sigma_y: sy,
            sigma_z: sz,
        });
    }

    debug!(
        %stability,
        effective_height,
        wind_ms = wind.value(),
        points = points.len(),
        "Plume simulated"
    );

    Ok(PlumeModel {
        effective_height_m: effective_height,
        plume_rise_m: plume_rise,
        wind_speed_ms: wind.value(),
        wind_direction,
        wind_direction_rad: wind_direction.to_radians(),
        stability,
        emission_rate_gs: emission_rate,
        source,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Acres, CropType, Fahrenheit, MilesPerHour};
    use crate::emission::estimate_emissions;
    use chrono::{FixedOffset, TimeZone};

    fn noon_weather(mph: f64) -> WeatherSnapshot {
        let ts = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
            .unwrap();
        let mut w = WeatherSnapshot::calm(ts);
        w.wind_speed = MilesPerHour::new(mph);
        w
    }

    fn rice_emissions() -> EmissionProfile {
        estimate_emissions(CropType::Rice, Acres::new(100.0)).unwrap()
    }

    #[test]
    fn points_follow_the_ladder() {
        let config = EngineConfig::default();
        let plume = simulate_plume(&rice_emissions(), &noon_weather(5.0), StabilityClass::B, None, &config).unwrap();

        let distances: Vec<f64> = plume.points.iter().map(|p| p.distance_m).collect();
        assert_eq!(distances, config.distance_ladder);
        assert!(plume.points.windows(2).all(|w| w[0].distance_m < w[1].distance_m));
        for p in &plume.points {
            assert!(p.concentration.is_finite() && p.concentration >= 0.0);
            assert_eq!(p.lateral_spread_m, 2.0 * p.sigma_y);
        }
    }

    #[test]
    fn concentration_decays_downwind() {
        let config = EngineConfig::default();
        for class in StabilityClass::ALL {
            let plume = simulate_plume(&rice_emissions(), &noon_weather(5.0), class, None, &config).unwrap();
            let near = plume.points.first().unwrap().concentration;
            let far = plume.points.last().unwrap().concentration;
            assert!(near > far, "class {class}: {near} should exceed {far}");
        }
    }

    #[test]
    fn calm_wind_is_floored() {
        let config = EngineConfig::default();
        let plume = simulate_plume(&rice_emissions(), &noon_weather(0.0), StabilityClass::A, None, &config).unwrap();
        assert_eq!(plume.wind_speed_ms, 1.0);
    }

    #[test]
    fn effective_height_includes_ground_release() {
        let config = EngineConfig::default();
        let plume = simulate_plume(&rice_emissions(), &noon_weather(5.0), StabilityClass::D, None, &config).unwrap();
        assert!(plume.effective_height_m >= 2.0);
        assert!((plume.effective_height_m - 2.0 - plume.plume_rise_m).abs() < 1e-12);
    }

    #[test]
    fn non_finite_temperature_is_a_simulation_error() {
        let mut weather = noon_weather(5.0);
        weather.temperature = Fahrenheit::new(f64::NAN);
        let err = simulate_plume(&rice_emissions(), &weather, StabilityClass::D, None, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, PredictionError::Simulation { stage: "plume rise", .. }));
    }

    #[test]
    fn source_comes_from_centroid() {
        let boundary = FieldBoundary::new(vec![
            LonLat::new(-121.7, 38.5),
            LonLat::new(-121.7, 38.6),
            LonLat::new(-121.6, 38.6),
            LonLat::new(-121.6, 38.5),
        ]);
        let plume = simulate_plume(
            &rice_emissions(),
            &noon_weather(5.0),
            StabilityClass::C,
            Some(&boundary),
            &EngineConfig::default(),
        )
        .unwrap();
        let source = plume.source.unwrap();
        assert!((source.lon + 121.65).abs() < 1e-9);
        assert!((source.lat - 38.55).abs() < 1e-9);
    }

    #[test]
    fn receptor_on_axis_matches_profile() {
        let plume = simulate_plume(
            &rice_emissions(),
            &noon_weather(5.0),
            StabilityClass::C,
            None,
            &EngineConfig::default(),
        )
        .unwrap();
        let p = plume.points[3];
        let at = plume.concentration_at(p.distance_m, 0.0, 0.0);
        assert!((at - p.concentration).abs() <= 1e-9 * p.concentration.max(1.0));
    }
}
