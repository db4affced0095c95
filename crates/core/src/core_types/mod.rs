//! Core types and utilities

pub mod burn;
pub mod crop;
pub mod geo;
pub mod units;
pub mod weather;

pub use burn::{BurnId, BurnRequest, TimeWindow};
pub use crop::CropType;
pub use geo::{BoundaryDefect, FieldBoundary, LonLat, Offset};
pub use units::*;
pub use weather::WeatherSnapshot;
