//! Buoyant rise of a field-burn smoke plume.
//!
//! Hot combustion gases rise until the wind bends the plume over. A field
//! burn has no stack, so the Holland-style formulation is driven by a rough
//! equivalent source diameter derived from the emission rate.
//!
//! ```text
//! T_flame = T_ambient + ΔT
//! D       = sqrt(Q / 1000)
//! F_b     = g × ΔT / T_ambient × Q × 0.001
//! Δh      = clamp(F_b / (π × D × u), 0, Δh_max)
//! ```
//!
//! Where:
//! - Q: emission rate (g/s)
//! - u: wind speed (m/s)
//! - `F_b`: buoyancy flux term
//!
//! # References
//!
//! - Holland, J.Z. (1953). "A meteorological survey of the Oak Ridge area."
//!   USAEC Report ORO-99.
//! - Briggs, G.A. (1975). "Plume rise predictions." NOAA Technical Memorandum.

use crate::core_types::{Kelvin, MetersPerSecond};
use serde::{Deserialize, Serialize};

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Buoyant rise of the smoke plume above its release height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuoyantRise {
    /// Ambient air temperature (K)
    pub ambient_temp_k: f64,
    /// Assumed flame temperature (K)
    pub flame_temp_k: f64,
    /// Equivalent source diameter (m)
    pub source_diameter_m: f64,
    /// Buoyancy flux term
    pub buoyancy_flux: f64,
    /// Plume rise (m)
    pub rise_m: f64,
}

impl BuoyantRise {
    /// Compute plume rise.
    ///
    /// # Arguments
    ///
    /// * `emission_rate_gs` - Emission rate (g/s)
    /// * `ambient` - Ambient air temperature
    /// * `temperature_excess_k` - Flame temperature above ambient (K)
    /// * `wind` - Wind speed, already floored away from zero
    /// * `max_rise_m` - Cap on the returned rise
    ///
    /// # Returns
    ///
    /// The rise and its intermediate terms. A non-positive emission rate
    /// produces zero rise.
    #[must_use]
    pub fn calculate(
        emission_rate_gs: f64,
        ambient: Kelvin,
        temperature_excess_k: f64,
        wind: MetersPerSecond,
        max_rise_m: f64,
    ) -> Self {
        let ambient_temp_k = ambient.value();
        let flame_temp_k = (ambient + temperature_excess_k).value();
        let delta_t = flame_temp_k - ambient_temp_k;

        let source_diameter_m = (emission_rate_gs.max(0.0) / 1000.0).sqrt();
        let buoyancy_flux = GRAVITY * delta_t / ambient_temp_k * emission_rate_gs * 0.001;

        let denominator = std::f64::consts::PI * source_diameter_m * wind.value();
        let rise_m = if denominator > 0.0 {
            (buoyancy_flux / denominator).clamp(0.0, max_rise_m)
        } else {
            0.0
        };

        Self {
            ambient_temp_k,
            flame_temp_k,
            source_diameter_m,
            buoyancy_flux,
            rise_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Fahrenheit;
    use approx::assert_relative_eq;

    fn rise(rate: f64, wind: f64) -> f64 {
        BuoyantRise::calculate(
            rate,
            Fahrenheit::new(70.0).to_kelvin(),
            400.0,
            MetersPerSecond::new(wind),
            100.0,
        )
        .rise_m
    }

    #[test]
    fn matches_hand_calculation() {
        let r = BuoyantRise::calculate(
            1000.0,
            Kelvin::new(300.0),
            400.0,
            MetersPerSecond::new(2.0),
            100.0,
        );
        // D = 1 m, F = 9.81 × 400/300 × 1000 × 0.001 = 13.08
        assert_relative_eq!(r.source_diameter_m, 1.0);
        assert_relative_eq!(r.buoyancy_flux, 13.08, epsilon = 1e-9);
        assert_relative_eq!(r.rise_m, 13.08 / (std::f64::consts::PI * 2.0), epsilon = 1e-9);
        assert_relative_eq!(r.flame_temp_k, 700.0);
    }

    /// Higher wind bends the plume over.
    #[test]
    fn rise_decreases_with_wind() {
        assert!(rise(500.0, 1.0) > rise(500.0, 8.0));
    }

    #[test]
    fn rise_is_capped() {
        assert_relative_eq!(rise(1.0e9, 1.0), 100.0);
    }

    #[test]
    fn zero_emissions_give_zero_rise() {
        assert_relative_eq!(rise(0.0, 3.0), 0.0);
    }
}
