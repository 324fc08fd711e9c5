//! Geometry kernel: pure point-in-shape and distance functions.
//!
//! Distances use an equirectangular approximation that treats the earth as
//! locally flat. This is a known precision limit: it holds well for safe-zone
//! radii under a few kilometers and degrades near the poles and across the
//! antimeridian, which is acceptable for pet-scale geofences.

use geo::{Contains, LineString, Point, Polygon};

use crate::models::safe_zone::{GeoPoint, ZoneShape};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Approximate distance between two coordinates in meters.
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let mean_lat = ((a.latitude + b.latitude) / 2.0).to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let x = d_lon * mean_lat.cos();
    (x * x + d_lat * d_lat).sqrt() * EARTH_RADIUS_METERS
}

/// Whether `point` lies within (or on) a circle of `radius_meters` around
/// `center`.
pub fn point_in_circle(point: &GeoPoint, center: &GeoPoint, radius_meters: f64) -> bool {
    distance_meters(point, center) <= radius_meters
}

/// Whether `point` lies inside the closed ring described by `vertices`
/// (even-odd rule; the first and last vertices are implicitly connected).
pub fn point_in_polygon(point: &GeoPoint, vertices: &[GeoPoint]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let ring: Vec<(f64, f64)> = vertices
        .iter()
        .map(|v| (v.longitude, v.latitude))
        .collect();
    let polygon = Polygon::new(LineString::from(ring), vec![]);

    polygon.contains(&Point::new(point.longitude, point.latitude))
}

/// Whether `point` lies inside the given zone shape.
pub fn shape_contains(shape: &ZoneShape, point: &GeoPoint) -> bool {
    match shape {
        ZoneShape::Circle {
            center,
            radius_meters,
        } => point_in_circle(point, center, *radius_meters),
        ZoneShape::Polygon { vertices } => point_in_polygon(point, vertices),
    }
}
