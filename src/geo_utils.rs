//! # Geographic Utilities
//!
//! Core geographic computation utilities shared by the projector and scorer.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`polyline_length`] | Total length of a point sequence in meters |
//! | [`offset_geo`] | Apply a local meter offset to a geographic point |
//! | [`to_local_plane`] | Project a point into a local meter plane |
//! | [`point_to_segment_distance`] | Planar distance from a point to a segment |
//!
//! ## Coordinate systems
//!
//! All geographic functions expect WGS84 coordinates (latitude/longitude in
//! degrees). The local-plane functions use an equirectangular approximation:
//! accurate for the hundreds-to-low-thousands-of-meters radii this pipeline
//! works at, and intentionally ignoring ellipsoidal correction.

use crate::{GeoPoint, EARTH_RADIUS_METERS};
use geo::{Distance, Haversine, Point};

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two points using the
/// Haversine formula. Returns meters.
///
/// # Example
///
/// ```rust
/// use shape_route::{geo_utils, GeoPoint};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a point sequence in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point sequences return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Local Equirectangular Plane
// =============================================================================

/// Apply a local Cartesian offset (meters east, meters north) to a
/// geographic point.
///
/// Uses the equirectangular approximation:
/// `dLat = north / R`, `dLon = east / (R * cos(lat))`, both in radians.
#[inline]
pub fn offset_geo(origin: GeoPoint, east_meters: f64, north_meters: f64) -> GeoPoint {
    let lat_offset = (north_meters / EARTH_RADIUS_METERS).to_degrees();
    let lon_offset =
        (east_meters / (EARTH_RADIUS_METERS * origin.latitude.to_radians().cos())).to_degrees();

    GeoPoint::new(origin.latitude + lat_offset, origin.longitude + lon_offset)
}

/// Project a geographic point into a local meter plane centered on `origin`.
///
/// Returns `(east, north)` in meters. Inverse of [`offset_geo`] for points
/// near the origin.
#[inline]
pub fn to_local_plane(point: &GeoPoint, origin: &GeoPoint) -> (f64, f64) {
    let north = (point.latitude - origin.latitude).to_radians() * EARTH_RADIUS_METERS;
    let east = (point.longitude - origin.longitude).to_radians()
        * EARTH_RADIUS_METERS
        * origin.latitude.to_radians().cos();
    (east, north)
}

/// Planar distance from point `p` to the segment `a`-`b`.
///
/// All arguments are `(east, north)` meter coordinates from
/// [`to_local_plane`]. Degenerate segments (a == b) fall back to
/// point-to-point distance.
pub fn point_to_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (px, py) = p;
    let (ax, ay) = a;
    let (bx, by) = b;

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;

    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

// =============================================================================
// Unit Tests
// =============================================================================
