//! Pasquill-Gifford dispersion coefficients and the Gaussian plume equation.
//!
//! The plume's crosswind (σy) and vertical (σz) standard deviations grow
//! with downwind distance following power laws whose coefficients depend on
//! the stability class:
//!
//! ```text
//! σ = a × x_km^b        (x_km floored at 0.1, σ floored at 1 m)
//! ```
//!
//! Ground-level concentration with total ground reflection:
//!
//! ```text
//! C(x,y,z) = Q / (2π u σy σz) × exp(-y²/2σy²)
//!            × [exp(-(z-H)²/2σz²) + exp(-(z+H)²/2σz²)]
//! ```
//!
//! On the centerline at ground level (y = 0, z = 0) this reduces to
//! `Q / (π u σy σz) × exp(-½ (H/σz)²)`.
//!
//! # References
//!
//! - Turner, D.B. (1970). "Workbook of Atmospheric Dispersion Estimates." EPA.
//! - Martin, D.O. (1976). "Comment on the change of concentration standard
//!   deviations with distance." JAPCA, 26(2), 145-147.

use crate::atmosphere::StabilityClass;
use serde::{Deserialize, Serialize};

/// Micrograms per gram, for Q in g/s → concentration in µg/m³
pub const MICROGRAMS_PER_GRAM: f64 = 1.0e6;

/// Nearest distance the power laws are evaluated at (km)
const MIN_DISTANCE_KM: f64 = 0.1;

/// Smallest spread the model will report (m)
const MIN_SIGMA_M: f64 = 1.0;

/// Shared power-law exponent for both axes
const SIGMA_EXPONENT: f64 = 0.894;

/// Power-law coefficient triple: `coefficient × x_km^exponent`, floored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmaCoefficients {
    pub coefficient: f64,
    pub exponent: f64,
    pub floor_m: f64,
}

impl SigmaCoefficients {
    const fn new(coefficient: f64) -> Self {
        Self {
            coefficient,
            exponent: SIGMA_EXPONENT,
            floor_m: MIN_SIGMA_M,
        }
    }

    /// Evaluate at a downwind distance in meters
    #[must_use]
    pub fn evaluate(&self, distance_m: f64) -> f64 {
        let x_km = (distance_m / 1000.0).max(MIN_DISTANCE_KM);
        (self.coefficient * x_km.powf(self.exponent)).max(self.floor_m)
    }
}

/// Crosswind spread coefficients for a stability class
#[must_use]
pub const fn sigma_y_coefficients(class: StabilityClass) -> SigmaCoefficients {
    match class {
        StabilityClass::A => SigmaCoefficients::new(213.0),
        StabilityClass::B => SigmaCoefficients::new(156.0),
        StabilityClass::C => SigmaCoefficients::new(104.0),
        StabilityClass::D => SigmaCoefficients::new(68.0),
        StabilityClass::E => SigmaCoefficients::new(50.5),
        StabilityClass::F => SigmaCoefficients::new(34.0),
    }
}

/// Vertical spread coefficients for a stability class
#[must_use]
pub const fn sigma_z_coefficients(class: StabilityClass) -> SigmaCoefficients {
    match class {
        StabilityClass::A => SigmaCoefficients::new(440.8),
        StabilityClass::B => SigmaCoefficients::new(106.6),
        StabilityClass::C => SigmaCoefficients::new(61.0),
        StabilityClass::D => SigmaCoefficients::new(33.2),
        StabilityClass::E => SigmaCoefficients::new(22.8),
        StabilityClass::F => SigmaCoefficients::new(14.35),
    }
}

/// Crosswind standard deviation σy (m) at a downwind distance (m)
#[must_use]
pub fn sigma_y(class: StabilityClass, distance_m: f64) -> f64 {
    sigma_y_coefficients(class).evaluate(distance_m)
}

/// Vertical standard deviation σz (m) at a downwind distance (m)
#[must_use]
pub fn sigma_z(class: StabilityClass, distance_m: f64) -> f64 {
    sigma_z_coefficients(class).evaluate(distance_m)
}

/// Ground-level centerline concentration (µg/m³).
///
/// # Arguments
///
/// * `emission_rate_gs` - Source strength Q (g/s)
/// * `wind_ms` - Transport wind speed u (m/s)
/// * `effective_height_m` - Effective release height H (m)
/// * `sigma_y` - Crosswind spread (m)
/// * `sigma_z` - Vertical spread (m)
///
/// # Returns
///
/// Concentration floored at zero. May be non-finite if the inputs are; the
/// caller is responsible for checking.
#[must_use]
pub fn centerline_concentration(
    emission_rate_gs: f64,
    wind_ms: f64,
    effective_height_m: f64,
    sigma_y: f64,
    sigma_z: f64,
) -> f64 {
    let q = emission_rate_gs * MICROGRAMS_PER_GRAM;
    let vertical = (-0.5 * (effective_height_m / sigma_z).powi(2)).exp();
    let c = q / (std::f64::consts::PI * wind_ms * sigma_y * sigma_z) * vertical;
    // NaN passes through so the caller can detect it
    if c < 0.0 {
        0.0
    } else {
        c
    }
}

/// Concentration at an arbitrary receptor (µg/m³), with ground reflection.
///
/// # Arguments
///
/// * `emission_rate_gs` - Source strength Q (g/s)
/// * `wind_ms` - Transport wind speed u (m/s)
/// * `effective_height_m` - Effective release height H (m)
/// * `x` - Downwind distance (m); receptors at or behind the source see nothing
/// * `y` - Crosswind offset from the plume axis (m)
/// * `z` - Receptor height above ground (m)
/// * `class` - Stability class
#[must_use]
pub fn receptor_concentration(
    emission_rate_gs: f64,
    wind_ms: f64,
    effective_height_m: f64,
    x: f64,
    y: f64,
    z: f64,
    class: StabilityClass,
) -> f64 {
    if x <= 0.0 || wind_ms <= 0.0 {
        return 0.0;
    }

    let sy = sigma_y(class, x);
    let sz = sigma_z(class, x);
    let q = emission_rate_gs * MICROGRAMS_PER_GRAM;

    let lateral = (-0.5 * (y / sy).powi(2)).exp();
    let direct = (-0.5 * ((z - effective_height_m) / sz).powi(2)).exp();
    let reflected = (-0.5 * ((z + effective_height_m) / sz).powi(2)).exp();

    let c = q / (2.0 * std::f64::consts::PI * wind_ms * sy * sz) * lateral * (direct + reflected);
    if c < 0.0 {
        0.0
    } else {
        c
    }
}
