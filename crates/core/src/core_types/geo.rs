//! Geographic primitives: positions, field boundaries and local projections
//!
//! Field-scale geometry only. Offsets from a field centroid are converted to
//! degrees with fixed meters-per-degree constants (a flat-earth local
//! approximation that is accurate enough over a few kilometers), while
//! separations between fields use the haversine great-circle distance.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Local planar offset in meters as (east, north)
pub type Offset = Vector2<f64>;

/// Meters per degree of longitude used for local offsets.
pub const METERS_PER_DEGREE_LON: f64 = 111_320.0;

/// Meters per degree of latitude used for local offsets.
pub const METERS_PER_DEGREE_LAT: f64 = 110_540.0;

/// Mean Earth radius (m) for haversine distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic position, serialized as a GeoJSON `[lon, lat]` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Finite and inside the valid longitude/latitude ranges
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }

    /// Shift by a local offset in meters using the fixed flat-earth constants
    #[must_use]
    pub fn offset_by(&self, offset: Offset) -> LonLat {
        LonLat {
            lon: self.lon + offset.x / METERS_PER_DEGREE_LON,
            lat: self.lat + offset.y / METERS_PER_DEGREE_LAT,
        }
    }

    /// Great-circle distance in meters (haversine)
    #[must_use]
    pub fn haversine_distance(&self, other: &LonLat) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(pair: [f64; 2]) -> Self {
        LonLat::new(pair[0], pair[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(p: LonLat) -> Self {
        [p.lon, p.lat]
    }
}

/// Outer ring of a field, as it arrived from the request record.
///
/// Not validated on construction: a boundary can be present but unusable
/// (too few vertices, out-of-range coordinates). Use [`FieldBoundary::centroid`]
/// to find out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBoundary {
    pub exterior: Vec<LonLat>,
}

/// Why a boundary could not be reduced to a centroid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryDefect {
    /// Fewer than three distinct vertices
    TooFewVertices(usize),
    /// A vertex is non-finite or outside lon/lat ranges
    InvalidCoordinate(usize),
}

impl std::fmt::Display for BoundaryDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundaryDefect::TooFewVertices(n) => {
                write!(f, "boundary has {n} distinct vertices, need at least 3")
            }
            BoundaryDefect::InvalidCoordinate(i) => {
                write!(f, "boundary vertex {i} is not a valid lon/lat pair")
            }
        }
    }
}

impl FieldBoundary {
    #[must_use]
    pub fn new(exterior: Vec<LonLat>) -> Self {
        Self { exterior }
    }

    /// Vertices without the closing duplicate of a closed ring
    #[must_use]
    pub fn distinct_vertices(&self) -> &[LonLat] {
        match (self.exterior.first(), self.exterior.last()) {
            (Some(first), Some(last)) if self.exterior.len() > 1 && first == last => {
                &self.exterior[..self.exterior.len() - 1]
            }
            _ => &self.exterior,
        }
    }

    /// Simple (not area-weighted) average of the distinct vertices.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundaryDefect`] when the ring has fewer than three
    /// distinct vertices or contains an invalid coordinate.
    pub fn centroid(&self) -> Result<LonLat, BoundaryDefect> {
        let vertices = self.distinct_vertices();
        if let Some(bad) = vertices.iter().position(|p| !p.is_valid()) {
            return Err(BoundaryDefect::InvalidCoordinate(bad));
        }
        if vertices.len() < 3 {
            return Err(BoundaryDefect::TooFewVertices(vertices.len()));
        }

        let n = vertices.len() as f64;
        let (lon_sum, lat_sum) = vertices
            .iter()
            .fold((0.0, 0.0), |(lon, lat), p| (lon + p.lon, lat + p.lat));

        Ok(LonLat::new(lon_sum / n, lat_sum / n))
    }
}
