//! Normalization of loosely-typed external records.
//!
//! Burn and weather records come from several producers that disagree on
//! field names (`acres` vs `acreage`, `windSpeed` vs `wind_speed_mph`) and
//! on how boundaries are encoded. Everything is folded into the canonical
//! [`BurnRequest`] and [`WeatherSnapshot`] here, once, so the physics never
//! sees an alias or a missing value.
//!
//! Accepted boundary encodings:
//! - GeoJSON `Polygon` geometry (first ring is the exterior)
//! - GeoJSON `Feature` wrapping a `Polygon`
//! - a bare ring of `[lon, lat]` pairs
//! - any of the above serialized as a JSON string

use crate::core_types::weather::{DEFAULT_CLOUD_COVER, DEFAULT_WIND_SPEED, STANDARD_PRESSURE_HPA};
use crate::core_types::{
    Acres, BurnId, BurnRequest, CropType, Degrees, Fahrenheit, FieldBoundary, LonLat, MilesPerHour, Percent,
    TimeWindow, WeatherSnapshot,
};
use crate::error::PredictionError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Default temperature when the reading has none (°F)
pub const DEFAULT_TEMPERATURE_F: f64 = 70.0;

/// Default relative humidity when the reading has none (%)
pub const DEFAULT_HUMIDITY_PCT: f64 = 50.0;

/// Burn record as it arrives from upstream
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawBurnRecord {
    #[serde(alias = "burnId", alias = "burn_id")]
    pub id: Option<String>,
    #[serde(alias = "farmId")]
    pub farm_id: Option<String>,
    pub acres: Option<f64>,
    pub acreage: Option<f64>,
    #[serde(alias = "cropType", alias = "crop")]
    pub crop_type: Option<String>,
    #[serde(alias = "fieldBoundary", alias = "boundary")]
    pub field_boundary: Option<Value>,
    /// Requested date; `burn_date` wins over `requested_date`
    #[serde(alias = "burnDate")]
    pub burn_date: Option<String>,
    #[serde(alias = "requestedDate")]
    pub requested_date: Option<String>,
    #[serde(alias = "timeWindow")]
    pub time_window: Option<RawTimeWindow>,
}

/// Time window with `HH:MM` or `HH:MM:SS` strings
#[derive(Debug, Clone, Deserialize)]
pub struct RawTimeWindow {
    pub start: String,
    pub end: String,
}

/// Weather reading as it arrives from upstream
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWeatherRecord {
    /// Wind speed (mph); the first of `windSpeed`, `wind_speed_mph`,
    /// `wind_speed` present is used
    #[serde(rename = "windSpeed")]
    pub wind_speed_camel: Option<f64>,
    pub wind_speed_mph: Option<f64>,
    pub wind_speed: Option<f64>,
    #[serde(alias = "windDirection")]
    pub wind_direction: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Cloud cover (%); `cloudCover` wins over `cloud_cover`
    #[serde(rename = "cloudCover")]
    pub cloud_cover_camel: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub pressure: Option<f64>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// Combined request body: a burn plus the weather to run it under
#[derive(Debug, Clone, Deserialize)]
pub struct RawPredictionRequest {
    #[serde(alias = "burnData")]
    pub burn: RawBurnRecord,
    #[serde(default, alias = "weatherData")]
    pub weather: RawWeatherRecord,
}

impl RawPredictionRequest {
    /// Normalize both halves.
    ///
    /// # Errors
    ///
    /// Propagates [`PredictionError::InvalidInput`] from either record.
    pub fn normalize(self) -> Result<(BurnRequest, WeatherSnapshot), PredictionError> {
        Ok((self.burn.try_into()?, self.weather.try_into()?))
    }
}

#[derive(Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<Vec<LonLat>>,
}

#[derive(Deserialize)]
struct GeoJsonFeature {
    geometry: GeoJsonGeometry,
}

/// Decode a boundary value into its exterior ring.
///
/// Only the structure is checked here; geometric validity is left to
/// [`FieldBoundary::centroid`] so a bad ring still reaches the footprint
/// step and is reported there.
fn parse_boundary(value: &Value) -> Result<FieldBoundary, String> {
    match value {
        Value::String(text) => {
            let inner: Value = serde_json::from_str(text).map_err(|e| format!("boundary string is not JSON: {e}"))?;
            parse_boundary(&inner)
        }
        Value::Array(_) => serde_json::from_value::<Vec<LonLat>>(value.clone())
            .map(FieldBoundary::new)
            .map_err(|e| format!("boundary ring: {e}")),
        Value::Object(map) if map.contains_key("geometry") => {
            let feature: GeoJsonFeature =
                serde_json::from_value(value.clone()).map_err(|e| format!("boundary feature: {e}"))?;
            polygon_exterior(feature.geometry)
        }
        Value::Object(_) => {
            let geometry: GeoJsonGeometry =
                serde_json::from_value(value.clone()).map_err(|e| format!("boundary geometry: {e}"))?;
            polygon_exterior(geometry)
        }
        other => Err(format!("unsupported boundary encoding: {other}")),
    }
}

fn polygon_exterior(geometry: GeoJsonGeometry) -> Result<FieldBoundary, String> {
    if geometry.kind != "Polygon" {
        return Err(format!("expected a Polygon geometry, got {}", geometry.kind));
    }
    geometry
        .coordinates
        .into_iter()
        .next()
        .map(FieldBoundary::new)
        .ok_or_else(|| "polygon has no rings".to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

impl TryFrom<RawBurnRecord> for BurnRequest {
    type Error = PredictionError;

    fn try_from(raw: RawBurnRecord) -> Result<Self, Self::Error> {
        let area = [raw.acres, raw.acreage]
            .into_iter()
            .flatten()
            .find(|a| a.is_finite() && *a > 0.0)
            .ok_or_else(|| {
                PredictionError::invalid(
                    "acres",
                    format!(
                        "neither acres ({:?}) nor acreage ({:?}) is a positive number",
                        raw.acres, raw.acreage
                    ),
                )
            })?;

        let crop_type = match raw.crop_type.as_deref() {
            Some(name) => CropType::parse_lenient(name),
            None => {
                debug!("Burn record has no crop type, using default factors");
                CropType::Other
            }
        };

        let id = raw.id.map_or_else(BurnId::generate, BurnId::new);

        let field_boundary = raw.field_boundary.as_ref().and_then(|value| match parse_boundary(value) {
            Ok(boundary) => Some(boundary),
            Err(detail) => {
                warn!(burn = %id, %detail, "Dropping malformed field boundary");
                None
            }
        });

        let requested_date = match raw.burn_date.as_deref().or(raw.requested_date.as_deref()) {
            Some(text) => Some(parse_date(text).ok_or_else(|| {
                PredictionError::invalid("burn_date", format!("`{text}` is not a date"))
            })?),
            None => None,
        };

        let time_window = raw.time_window.and_then(|w| match (parse_time(&w.start), parse_time(&w.end)) {
            (Some(start), Some(end)) if start < end => Some(TimeWindow::new(start, end)),
            _ => {
                warn!(burn = %id, start = %w.start, end = %w.end, "Ignoring unusable time window");
                None
            }
        });

        Ok(BurnRequest {
            id,
            farm_id: raw.farm_id,
            field_boundary,
            area: Acres::new(area),
            crop_type,
            requested_date,
            time_window,
        })
    }
}

impl TryFrom<RawWeatherRecord> for WeatherSnapshot {
    type Error = PredictionError;

    fn try_from(raw: RawWeatherRecord) -> Result<Self, Self::Error> {
        let wind_speed = raw
            .wind_speed_camel
            .or(raw.wind_speed_mph)
            .or(raw.wind_speed)
            .map_or(DEFAULT_WIND_SPEED, MilesPerHour::new);
        if wind_speed.value() < 0.0 {
            return Err(PredictionError::invalid(
                "wind_speed",
                format!("wind speed cannot be negative, got {wind_speed}"),
            ));
        }

        let timestamp = raw.timestamp.unwrap_or_else(|| chrono::Local::now().fixed_offset());

        Ok(WeatherSnapshot {
            wind_speed,
            wind_direction: Degrees::new(raw.wind_direction.unwrap_or(0.0)),
            temperature: Fahrenheit::new(raw.temperature.unwrap_or(DEFAULT_TEMPERATURE_F)),
            humidity: Percent::new(raw.humidity.unwrap_or(DEFAULT_HUMIDITY_PCT)),
            cloud_cover: raw.cloud_cover_camel.or(raw.cloud_cover).map_or(DEFAULT_CLOUD_COVER, Percent::new),
            pressure: raw.pressure.unwrap_or(STANDARD_PRESSURE_HPA),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn burn(value: Value) -> Result<BurnRequest, PredictionError> {
        serde_json::from_value::<RawBurnRecord>(value).unwrap().try_into()
    }

    fn square_ring() -> Value {
        json!([[-121.7, 38.5], [-121.7, 38.6], [-121.6, 38.6], [-121.6, 38.5], [-121.7, 38.5]])
    }

    #[test]
    fn acreage_alias_and_defaults() {
        let req = burn(json!({ "acreage": 42.0, "cropType": "Wheat" })).unwrap();
        assert_eq!(req.area, Acres::new(42.0));
        assert_eq!(req.crop_type, CropType::Wheat);
        assert!(req.field_boundary.is_none());
        assert!(!req.id.as_str().is_empty(), "missing id should be generated");
    }

    #[test]
    fn first_positive_area_wins() {
        let req = burn(json!({ "acres": 0.0, "acreage": 12.5 })).unwrap();
        assert_eq!(req.area, Acres::new(12.5));
    }

    #[test]
    fn zero_area_is_invalid() {
        let err = burn(json!({ "acres": 0, "crop_type": "rice" })).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidInput { field: "acres", .. }));
    }

    #[test]
    fn unknown_crop_maps_to_other() {
        let req = burn(json!({ "acres": 10, "crop_type": "quinoa" })).unwrap();
        assert_eq!(req.crop_type, CropType::Other);
    }

    #[test]
    fn geojson_polygon_feature_and_string_are_accepted() {
        let polygon = json!({ "type": "Polygon", "coordinates": [square_ring()] });
        let feature = json!({ "type": "Feature", "geometry": polygon.clone(), "properties": {} });
        let text = Value::String(polygon.to_string());

        for boundary in [polygon, feature, text, square_ring()] {
            let req = burn(json!({ "acres": 10, "field_boundary": boundary })).unwrap();
            let ring = req.field_boundary.expect("boundary should parse");
            assert_eq!(ring.exterior.len(), 5);
            assert_eq!(ring.exterior[0], LonLat::new(-121.7, 38.5));
        }
    }

    #[test]
    fn malformed_boundary_is_dropped() {
        for boundary in [json!({ "type": "Point", "coordinates": [[[0, 0]]] }), json!(42), json!("nope")] {
            let req = burn(json!({ "acres": 10, "fieldBoundary": boundary })).unwrap();
            assert!(req.field_boundary.is_none());
        }
    }

    #[test]
    fn dates_and_windows() {
        let req = burn(json!({
            "id": "b-7",
            "acres": 10,
            "burnDate": "2025-10-01",
            "time_window": { "start": "09:00", "end": "12:30:00" }
        }))
        .unwrap();
        assert_eq!(req.id, BurnId::new("b-7"));
        assert_eq!(req.requested_date, NaiveDate::from_ymd_opt(2025, 10, 1));
        let window = req.time_window.unwrap();
        assert_eq!(window.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(window.end, NaiveTime::from_hms_opt(12, 30, 0).unwrap());

        let stamped = burn(json!({ "acres": 10, "requested_date": "2025-10-01T08:00:00-07:00" })).unwrap();
        assert_eq!(stamped.requested_date, NaiveDate::from_ymd_opt(2025, 10, 1));

        let err = burn(json!({ "acres": 10, "burn_date": "someday" })).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidInput { field: "burn_date", .. }));
    }

    #[test]
    fn weather_aliases_and_defaults() {
        let raw: RawWeatherRecord = serde_json::from_value(json!({
            "windSpeed": 12.0,
            "cloudCover": 20.0,
            "timestamp": "2025-10-01T12:00:00-07:00"
        }))
        .unwrap();
        let w = WeatherSnapshot::try_from(raw).unwrap();
        assert_eq!(w.wind_speed, MilesPerHour::new(12.0));
        assert_eq!(w.cloud_cover, Percent::new(20.0));
        assert_eq!(w.temperature, Fahrenheit::new(DEFAULT_TEMPERATURE_F));
        assert_eq!(w.pressure, STANDARD_PRESSURE_HPA);
        assert_eq!(w.local_hour(), 12);

        let empty = WeatherSnapshot::try_from(RawWeatherRecord::default()).unwrap();
        assert_eq!(empty.wind_speed, DEFAULT_WIND_SPEED);
        assert_eq!(empty.cloud_cover, DEFAULT_CLOUD_COVER);
    }

    #[test]
    fn records_carrying_both_spellings_are_accepted() {
        let req = burn(json!({
            "acres": 10,
            "burn_date": "2025-10-01",
            "requested_date": "2025-10-02"
        }))
        .unwrap();
        assert_eq!(req.requested_date, NaiveDate::from_ymd_opt(2025, 10, 1));

        let raw: RawWeatherRecord = serde_json::from_value(json!({
            "windSpeed": 8.0,
            "wind_speed_mph": 9.0,
            "wind_speed": 10.0,
            "cloudCover": 30.0,
            "cloud_cover": 40.0
        }))
        .unwrap();
        let w = WeatherSnapshot::try_from(raw).unwrap();
        assert_eq!(w.wind_speed, MilesPerHour::new(8.0));
        assert_eq!(w.cloud_cover, Percent::new(30.0));

        let snake: RawWeatherRecord = serde_json::from_value(json!({ "wind_speed": 0.0, "cloud_cover": 75.0 })).unwrap();
        let w = WeatherSnapshot::try_from(snake).unwrap();
        assert_eq!(w.wind_speed, MilesPerHour::new(0.0));
        assert_eq!(w.cloud_cover, Percent::new(75.0));
    }

    #[test]
    fn mph_alias_and_negative_wind() {
        let raw: RawWeatherRecord = serde_json::from_value(json!({ "wind_speed_mph": -3.0 })).unwrap();
        assert!(WeatherSnapshot::try_from(raw).is_err());
    }

    #[test]
    fn combined_request_accepts_camel_case_sections() {
        let request: RawPredictionRequest = serde_json::from_value(json!({
            "burnData": { "acres": 100, "crop_type": "rice", "field_boundary": { "type": "Polygon", "coordinates": [square_ring()] } },
            "weatherData": { "wind_speed": 5, "wind_direction": 90, "temperature": 75, "humidity": 40 }
        }))
        .unwrap();
        let (burn, weather) = request.normalize().unwrap();
        assert_eq!(burn.crop_type, CropType::Rice);
        assert!(burn.field_boundary.is_some());
        assert_eq!(weather.wind_direction, Degrees::new(90.0));
    }
}
