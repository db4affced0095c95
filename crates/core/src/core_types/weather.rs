//! Weather snapshot consumed by the plume model
//!
//! Weather acquisition happens elsewhere; the engine reads one already
//! normalized observation per prediction. Units follow the feeds (mph, °F,
//! hPa) and are converted at the point of use.

use super::units::{Degrees, Fahrenheit, MetersPerSecond, MilesPerHour, Percent};
use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

/// Default wind speed when the reading has none
pub const DEFAULT_WIND_SPEED: MilesPerHour = MilesPerHour::new(5.0);

/// Default cloud cover when the reading has none
pub const DEFAULT_CLOUD_COVER: Percent = Percent::new(50.0);

/// Standard sea-level pressure (hPa)
pub const STANDARD_PRESSURE_HPA: f64 = 1013.25;

/// A single weather observation at the burn site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub wind_speed: MilesPerHour,
    /// Bearing the plume is carried toward
    pub wind_direction: Degrees,
    pub temperature: Fahrenheit,
    pub humidity: Percent,
    pub cloud_cover: Percent,
    /// Station pressure (hPa)
    pub pressure: f64,
    /// Observation time in the site's local offset
    pub timestamp: DateTime<FixedOffset>,
}

impl WeatherSnapshot {
    /// Wind speed converted to SI
    #[must_use]
    pub fn wind_speed_ms(&self) -> MetersPerSecond {
        self.wind_speed.to_meters_per_second()
    }

    /// Local hour of the observation (0-23)
    #[must_use]
    pub fn local_hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Daytime is local hour 6 through 18 inclusive
    #[must_use]
    pub fn is_daytime(&self) -> bool {
        (6..=18).contains(&self.local_hour())
    }

    /// Snapshot with feed defaults at the given time
    #[must_use]
    pub fn calm(timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            wind_speed: DEFAULT_WIND_SPEED,
            wind_direction: Degrees::new(0.0),
            temperature: Fahrenheit::new(70.0),
            humidity: Percent::new(50.0),
            cloud_cover: DEFAULT_CLOUD_COVER,
            pressure: STANDARD_PRESSURE_HPA,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_hour(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 1, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn daytime_bounds_are_inclusive() {
        assert!(!WeatherSnapshot::calm(at_hour(5)).is_daytime());
        assert!(WeatherSnapshot::calm(at_hour(6)).is_daytime());
        assert!(WeatherSnapshot::calm(at_hour(18)).is_daytime());
        assert!(!WeatherSnapshot::calm(at_hour(19)).is_daytime());
    }

    #[test]
    fn local_hour_uses_offset() {
        // 20:00 UTC is 12:00 at UTC-8
        let utc = chrono::Utc.with_ymd_and_hms(2025, 10, 1, 20, 0, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::west_opt(8 * 3600).unwrap());
        assert_eq!(WeatherSnapshot::calm(local).local_hour(), 12);
    }
}
