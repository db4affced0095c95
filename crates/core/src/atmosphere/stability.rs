//! Pasquill-Gifford atmospheric stability classification.
//!
//! Turbulence in the surface layer controls how fast a plume spreads. The
//! Pasquill-Gifford scheme buckets it into six classes from surface wind
//! speed and incoming solar radiation (day) or cloud cover (night).
//!
//! # Scientific Background
//!
//! Strong sunshine and light wind drive vigorous convective mixing (class A);
//! clear, calm nights let a surface inversion form that traps smoke near the
//! ground (class F). Above about 6 m/s mechanical turbulence dominates and the
//! atmosphere is effectively neutral (class D) regardless of sun.
//!
//! # References
//!
//! - Pasquill, F. (1961). "The estimation of the dispersion of windborne material."
//!   Meteorological Magazine, 90, 33-49.
//! - Gifford, F.A. (1961). "Use of routine meteorological observations for
//!   estimating atmospheric dispersion." Nuclear Safety, 2(4), 47-51.
//! - Turner, D.B. (1970). "Workbook of Atmospheric Dispersion Estimates." EPA.

use crate::core_types::WeatherSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Pasquill-Gifford stability class.
///
/// - A: Very unstable
/// - B: Moderately unstable
/// - C: Slightly unstable
/// - D: Neutral
/// - E: Slightly stable
/// - F: Moderately stable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StabilityClass {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl StabilityClass {
    /// All classes in one-hot encoding order
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Neutral class used whenever inputs cannot be classified
    pub const NEUTRAL: StabilityClass = StabilityClass::D;

    /// Position in [`StabilityClass::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// A or F: the extremes where the Gaussian model is least reliable
    #[must_use]
    pub const fn is_extreme(self) -> bool {
        matches!(self, StabilityClass::A | StabilityClass::F)
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            StabilityClass::A => "A",
            StabilityClass::B => "B",
            StabilityClass::C => "C",
            StabilityClass::D => "D",
            StabilityClass::E => "E",
            StabilityClass::F => "F",
        };
        f.write_str(letter)
    }
}

/// Coarse incoming solar radiation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarRadiation {
    Strong,
    Moderate,
    Slight,
    /// Night-time
    None,
}

impl SolarRadiation {
    /// Bucket from cloud cover (%) and the daytime flag.
    ///
    /// ```text
    /// day:   cloud < 30% → strong, < 70% → moderate, otherwise slight
    /// night: none
    /// ```
    #[must_use]
    pub fn from_cloud_cover(cloud_cover_pct: f64, is_daytime: bool) -> Self {
        if !is_daytime {
            SolarRadiation::None
        } else if cloud_cover_pct < 30.0 {
            SolarRadiation::Strong
        } else if cloud_cover_pct < 70.0 {
            SolarRadiation::Moderate
        } else {
            SolarRadiation::Slight
        }
    }
}

/// Pasquill-Gifford lookup.
///
/// ```text
/// wind (m/s) | strong | moderate | slight | night ≥50% cloud | night <50% cloud
/// < 2        |   A    |    A     |   B    |        F         |        F
/// 2 - 3      |   B    |    B     |   C    |        E         |        F
/// 3 - 5      |   B    |    C     |   C    |        D         |        E
/// 5 - 6      |   C    |    C     |   D    |        D         |        D
/// ≥ 6        |   D    |    D     |   D    |        D         |        D
/// ```
#[must_use]
pub fn pasquill_gifford(wind_ms: f64, solar: SolarRadiation, cloud_cover_pct: f64) -> StabilityClass {
    use StabilityClass::{A, B, C, D, E, F};

    let overcast_night = cloud_cover_pct >= 50.0;

    match (solar, wind_ms) {
        (SolarRadiation::Strong | SolarRadiation::Moderate, w) if w < 2.0 => A,
        (SolarRadiation::Strong, w) if w < 5.0 => B,
        (SolarRadiation::Moderate, w) if w < 3.0 => B,
        (SolarRadiation::Strong | SolarRadiation::Moderate, w) if w < 6.0 => C,
        (SolarRadiation::Slight, w) if w < 2.0 => B,
        (SolarRadiation::Slight, w) if w < 5.0 => C,
        (SolarRadiation::None, w) if w < 2.0 => F,
        (SolarRadiation::None, w) if w < 3.0 && overcast_night => E,
        (SolarRadiation::None, w) if w < 3.0 => F,
        (SolarRadiation::None, w) if w < 5.0 && overcast_night => D,
        (SolarRadiation::None, w) if w < 5.0 => E,
        _ => D,
    }
}

/// Classify atmospheric stability for a weather snapshot.
///
/// Never fails: if wind speed or cloud cover is not a finite number the
/// neutral class `D` is returned.
#[must_use]
pub fn classify_stability(weather: &WeatherSnapshot) -> StabilityClass {
    let wind_ms = weather.wind_speed_ms().value();
    let cloud = weather.cloud_cover.value();

    if !wind_ms.is_finite() || wind_ms < 0.0 || !cloud.is_finite() {
        debug!(wind_ms, cloud, "Unclassifiable weather, using neutral stability");
        return StabilityClass::NEUTRAL;
    }

    let is_daytime = weather.is_daytime();
    let solar = SolarRadiation::from_cloud_cover(cloud, is_daytime);
    let class = pasquill_gifford(wind_ms, solar, cloud);

    debug!(wind_ms, cloud, is_daytime, ?solar, %class, "Classified stability");
    class
}
