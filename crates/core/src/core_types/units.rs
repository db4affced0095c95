//! Semantic unit types for type-safe physical quantity handling
//!
//! Burn requests and weather readings arrive in US customary units (acres,
//! °F, mph) while the plume physics works in SI. These newtype wrappers keep
//! the two apart so a wind speed in mph can never be fed into a formula that
//! expects m/s.
//!
//! # Design Philosophy
//! - All quantities use f64; the plume formula chains exponentials and
//!   power laws that lose precision quickly in f32
//! - Total ordering via `Ord` (NaN handled as greater than all values)
//! - Explicit conversion methods between related types
//! - Serde support, serialized transparently as the bare number
//!
//! # Usage
//! ```
//! use smoke_sim_core::core_types::units::{Fahrenheit, MilesPerHour};
//!
//! let temp = Fahrenheit::new(32.0);
//! assert!((*temp.to_kelvin() - 273.15).abs() < 1e-9);
//!
//! let wind = MilesPerHour::new(10.0);
//! assert!((*wind.to_meters_per_second() - 4.4704).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Div, Mul, Sub};

/// Shared boilerplate for an f64 newtype: total ordering, `Deref`, raw access
/// and `From` conversions in both directions.
macro_rules! unit_newtype {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl $name {
            /// Create a new value
            #[inline]
            #[must_use]
            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }

            /// True when the underlying value is neither NaN nor infinite
            #[inline]
            #[must_use]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2}{}", self.0, $suffix)
            }
        }
    };
}

// ============================================================================
// TEMPERATURE
// ============================================================================

unit_newtype!(
    /// Temperature in degrees Fahrenheit, as reported by weather feeds
    Fahrenheit,
    "°F"
);

unit_newtype!(
    /// Absolute temperature in Kelvin
    Kelvin,
    " K"
);

impl Fahrenheit {
    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin((self.0 - 32.0) * 5.0 / 9.0 + 273.15)
    }
}

impl From<Fahrenheit> for Kelvin {
    fn from(f: Fahrenheit) -> Kelvin {
        f.to_kelvin()
    }
}

impl Add<f64> for Kelvin {
    type Output = Kelvin;
    fn add(self, delta: f64) -> Kelvin {
        Kelvin(self.0 + delta)
    }
}

impl Sub for Kelvin {
    type Output = f64;
    fn sub(self, rhs: Kelvin) -> f64 {
        self.0 - rhs.0
    }
}

// ============================================================================
// SPEED
// ============================================================================

unit_newtype!(
    /// Wind speed in miles per hour
    MilesPerHour,
    " mph"
);

unit_newtype!(
    /// Speed in meters per second
    MetersPerSecond,
    " m/s"
);

impl MilesPerHour {
    /// Exact conversion factor, 1 mph = 0.44704 m/s
    const TO_MPS: f64 = 0.44704;

    /// Convert to meters per second
    #[inline]
    #[must_use]
    pub fn to_meters_per_second(self) -> MetersPerSecond {
        MetersPerSecond(self.0 * Self::TO_MPS)
    }
}

impl From<MilesPerHour> for MetersPerSecond {
    fn from(v: MilesPerHour) -> MetersPerSecond {
        v.to_meters_per_second()
    }
}

impl MetersPerSecond {
    /// Clamp below at `floor`
    #[inline]
    #[must_use]
    pub fn at_least(self, floor: f64) -> MetersPerSecond {
        MetersPerSecond(self.0.max(floor))
    }
}

// ============================================================================
// LENGTH AND AREA
// ============================================================================

unit_newtype!(
    /// Distance in meters
    Meters,
    " m"
);

unit_newtype!(
    /// Land area in acres
    Acres,
    " ac"
);

impl Meters {
    /// Convert to kilometers as a bare f64
    #[inline]
    #[must_use]
    pub fn to_kilometers(self) -> f64 {
        self.0 / 1000.0
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;
    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

impl Div<f64> for Acres {
    type Output = f64;
    fn div(self, rhs: f64) -> f64 {
        self.0 / rhs
    }
}

// ============================================================================
// ANGLES AND RATIOS
// ============================================================================

unit_newtype!(
    /// Compass bearing in degrees (0 = north, 90 = east)
    Degrees,
    "°"
);

unit_newtype!(
    /// Percentage on a 0-100 scale
    Percent,
    "%"
);

impl Degrees {
    /// Convert to radians
    #[inline]
    #[must_use]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    /// Wrap into the range [0, 360)
    #[inline]
    #[must_use]
    pub fn normalized(self) -> Degrees {
        Degrees(self.0.rem_euclid(360.0))
    }

    /// Smallest absolute angle between two bearings, in [0, 180]
    #[must_use]
    pub fn separation(self, other: Degrees) -> f64 {
        let diff = (self.0 - other.0).rem_euclid(360.0);
        if diff > 180.0 {
            360.0 - diff
        } else {
            diff
        }
    }
}

impl Percent {
    /// Convert to fraction (0-1)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f64 {
        self.0 / 100.0
    }
}
