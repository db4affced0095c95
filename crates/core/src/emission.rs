//! Particulate emission estimate for a field burn
//!
//! Emission inventory approach used for open agricultural burning:
//!
//! ```text
//! biomass   = area × residue_load          (tons)
//! emissions = biomass × emission_factor    (kg PM2.5)
//! duration  = clamp(area / 50, 2, 8)       (hours)
//! rate      = emissions × 1000 / (duration × 3600)   (g/s)
//! ```
//!
//! Duration grows with field size because larger fields are lit in
//! sections, but a single day's burn is never shorter than two hours or
//! longer than eight.

use crate::core_types::{Acres, CropType};
use crate::error::PredictionError;
use serde::{Deserialize, Serialize};

/// Acres burned per hour when estimating duration
const ACRES_PER_HOUR: f64 = 50.0;

/// Shortest and longest modelled burn (hours)
const MIN_DURATION_H: f64 = 2.0;
const MAX_DURATION_H: f64 = 8.0;

/// Derived emission characteristics of one burn. Recomputed per prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionProfile {
    /// Total PM2.5 emitted (kg)
    pub total_emissions_kg: f64,
    /// Average emission rate over the burn (g/s)
    pub emission_rate_gs: f64,
    /// Assumed burn duration (hours)
    pub burn_duration_h: f64,
    /// Residue load used (tons/acre)
    pub biomass_factor: f64,
    /// Emission factor used (kg PM2.5 per ton)
    pub emission_factor: f64,
    /// Residue burned (tons)
    pub total_biomass_tons: f64,
}

/// Estimate emissions from crop and area.
///
/// # Errors
///
/// Returns [`PredictionError::InvalidInput`] when `area` is not a finite
/// positive number of acres.
pub fn estimate_emissions(crop: CropType, area: Acres) -> Result<EmissionProfile, PredictionError> {
    let acres = area.value();
    if !acres.is_finite() || acres <= 0.0 {
        return Err(PredictionError::invalid(
            "acres",
            format!("burn area must be a positive number of acres, got {acres}"),
        ));
    }

    let biomass_factor = crop.biomass_tons_per_acre();
    let emission_factor = crop.pm25_kg_per_ton();

    let total_biomass_tons = acres * biomass_factor;
    let total_emissions_kg = total_biomass_tons * emission_factor;

    let burn_duration_h = (area / ACRES_PER_HOUR).clamp(MIN_DURATION_H, MAX_DURATION_H);
    let emission_rate_gs = total_emissions_kg * 1000.0 / (burn_duration_h * 3600.0);

    Ok(EmissionProfile {
        total_emissions_kg,
        emission_rate_gs,
        burn_duration_h,
        biomass_factor,
        emission_factor,
        total_biomass_tons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rice_hundred_acres() {
        let profile = estimate_emissions(CropType::Rice, Acres::new(100.0)).unwrap();

        // 100 ac × 3.0 t/ac × 3.5 kg/t = 1050 kg over 2 h
        assert_relative_eq!(profile.total_biomass_tons, 300.0);
        assert_relative_eq!(profile.total_emissions_kg, 1050.0);
        assert_relative_eq!(profile.burn_duration_h, 2.0);
        assert_relative_eq!(profile.emission_rate_gs, 1_050_000.0 / 7200.0, epsilon = 1e-9);
    }

    #[test]
    fn duration_is_clamped() {
        let small = estimate_emissions(CropType::Wheat, Acres::new(5.0)).unwrap();
        assert_relative_eq!(small.burn_duration_h, 2.0);

        let mid = estimate_emissions(CropType::Wheat, Acres::new(200.0)).unwrap();
        assert_relative_eq!(mid.burn_duration_h, 4.0);

        let huge = estimate_emissions(CropType::Wheat, Acres::new(5000.0)).unwrap();
        assert_relative_eq!(huge.burn_duration_h, 8.0);
    }

    #[test]
    fn zero_or_negative_area_is_invalid() {
        for acres in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = estimate_emissions(CropType::Corn, Acres::new(acres)).unwrap_err();
            assert!(
                matches!(err, PredictionError::InvalidInput { field: "acres", .. }),
                "area {acres} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn other_crop_uses_defaults() {
        let profile = estimate_emissions(CropType::Other, Acres::new(10.0)).unwrap();
        assert_relative_eq!(profile.biomass_factor, 2.0);
        assert_relative_eq!(profile.emission_factor, 2.5);
        assert_relative_eq!(profile.total_emissions_kg, 50.0);
    }
}
