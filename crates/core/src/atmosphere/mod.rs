//! Surface-layer atmosphere for smoke transport.
//!
//! This module models the two atmospheric inputs of the plume model:
//! - Pasquill-Gifford stability class (turbulence intensity)
//! - Buoyant plume rise above the release height
//!
//! # References
//!
//! - Pasquill, F. (1961). "The estimation of the dispersion of windborne material."
//! - Turner, D.B. (1970). "Workbook of Atmospheric Dispersion Estimates." EPA.
//! - Briggs, G.A. (1975). "Plume rise predictions." NOAA.

mod convection;
mod stability;

pub use convection::{BuoyantRise, GRAVITY};
pub use stability::{classify_stability, pasquill_gifford, SolarRadiation, StabilityClass};
