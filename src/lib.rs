//! # Shape Route
//!
//! Shape-to-route matching: turn a raster outline (a heart, a star, a logo)
//! into a real-world GPS track that approximates the shape on an actual
//! road network.
//!
//! The pipeline has five stages:
//! - **Contour extraction** — raster image to an ordered, normalized polygon
//! - **Geo projection** — normalized polygon to WGS84 coordinates around a
//!   center point and radius
//! - **Route synthesis** — waypoints to a continuous routed path, one
//!   provider call per leg, stitched in order
//! - **Accuracy scoring** — how closely the realized path matches the target
//! - **Track serialization** — GPX export of the final geometry
//!
//! ## Features
//!
//! - **`http`** - Enable the OSRM-compatible HTTP routing provider
//!
//! ## Quick Start
//!
//! ```rust
//! use shape_route::{scale_to_geo, score, GeoPoint, NormalizedPoint, NormalizedPolygon, RouteGeometry};
//!
//! // A unit-square outline, as the contour extractor would produce it
//! let polygon = NormalizedPolygon::new(
//!     vec![
//!         NormalizedPoint::new(0.0, 0.0),
//!         NormalizedPoint::new(1.0, 0.0),
//!         NormalizedPoint::new(1.0, 1.0),
//!         NormalizedPoint::new(0.0, 1.0),
//!     ],
//!     true,
//! )
//! .unwrap();
//!
//! // Project it onto geography: 500m around central London
//! let center = GeoPoint::new(51.5074, -0.1278);
//! let target = scale_to_geo(&polygon, center, 500.0).unwrap();
//!
//! // A route that traces the target exactly scores 100%
//! let route = RouteGeometry { points: target.points().to_vec(), distance_meters: 0.0 };
//! let result = score(&target, &route, 500.0);
//! assert_eq!(result.accuracy_percent, 100.0);
//! ```

use serde::{Deserialize, Serialize};

pub mod contour;
pub mod geo_utils;
pub mod gpx;
pub mod projection;
pub mod scoring;
pub mod synthesis;

// HTTP routing provider (OSRM-compatible)
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::OsrmProvider;

pub use contour::{extract_shape, ExtractionConfig};
pub use projection::scale_to_geo;
pub use scoring::score;
pub use synthesis::{synthesize_route, RoutingProvider, TransportMode};

/// Mean Earth radius in meters, matching the sphere used by `geo`'s
/// haversine implementation.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced by the pipeline stages.
///
/// Each stage either fully succeeds or fails outright; there is no
/// partial-success state passed downstream. The variant identifies which
/// stage failed so the caller can show stage-appropriate guidance.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No usable contour found in the input image. The caller should prompt
    /// for a different image; not retried automatically.
    #[error("contour extraction failed: {0}")]
    Extraction(String),

    /// A leg of route synthesis failed (provider error, timeout, no path
    /// found). Not retried automatically; the caller may retry the whole run.
    #[error("routing failed: {0}")]
    Routing(String),

    /// Malformed or empty polygon/route passed between stages. A
    /// programming-contract violation, not a user-recoverable condition.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ============================================================================
// Core Types
// ============================================================================

/// A point on the source image, normalized to `[0, 1]` with origin top-left.
///
/// Independent of the image's pixel resolution. Coordinates are clamped at
/// construction so the invariant `0 <= x, y <= 1` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Create a normalized point, clamping both coordinates into `[0, 1]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// An ordered polygon in normalized image space.
///
/// Insertion order is the traversal order of the shape's boundary.
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPolygon {
    points: Vec<NormalizedPoint>,
    closed: bool,
}

impl NormalizedPolygon {
    /// Create a polygon from ordered points.
    ///
    /// Returns [`PipelineError::InvalidInput`] for fewer than 3 points.
    pub fn new(points: Vec<NormalizedPoint>, closed: bool) -> Result<Self, PipelineError> {
        if points.len() < 3 {
            return Err(PipelineError::InvalidInput(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points, closed })
    }

    /// Ordered boundary points.
    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    /// Whether the shape wraps around from the last point back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction requires at least 3 points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A WGS84 coordinate with latitude and longitude in decimal degrees.
///
/// # Example
/// ```
/// use shape_route::GeoPoint;
/// let point = GeoPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// An ordered polygon in geographic coordinates.
///
/// Produced by [`scale_to_geo`]; preserves the point order and closure state
/// of the source [`NormalizedPolygon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    points: Vec<GeoPoint>,
    closed: bool,
}

impl GeoPolygon {
    /// Create a polygon from ordered waypoints.
    ///
    /// Returns [`PipelineError::InvalidInput`] for fewer than 3 points.
    pub fn new(points: Vec<GeoPoint>, closed: bool) -> Result<Self, PipelineError> {
        if points.len() < 3 {
            return Err(PipelineError::InvalidInput(format!(
                "polygon needs at least 3 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points, closed })
    }

    /// Ordered waypoints.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Whether a wrap-around leg from the last point back to the first is
    /// part of the shape.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: construction requires at least 3 points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Geometry returned by the routing provider for one origin-to-destination
/// waypoint pair, plus the provider's reported distance for that leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Ordered points from origin to destination.
    pub points: Vec<GeoPoint>,
    /// Provider-reported leg distance in meters.
    pub distance_meters: f64,
}

/// The final realized path: legs concatenated in waypoint order with
/// duplicate joint points removed.
///
/// `distance_meters` is the sum of provider-reported leg distances, not
/// recomputed from geometry, to match provider semantics. The display
/// length in [`AccuracyResult`] is geometry-derived instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub points: Vec<GeoPoint>,
    pub distance_meters: f64,
}

/// Result of scoring a realized route against its target polygon.
///
/// Derived, recomputed on every pipeline run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    /// Route length in meters, summed over the route geometry.
    pub length_meters: f64,
    /// Similarity to the target shape, in `[0, 100]`.
    pub accuracy_percent: f64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(51.5074, -0.1278).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_normalized_point_clamps() {
        let p = NormalizedPoint::new(-0.5, 1.5);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 1.0);

        let q = NormalizedPoint::new(0.25, 0.75);
        assert_eq!(q.x, 0.25);
        assert_eq!(q.y, 0.75);
    }

    #[test]
    fn test_polygon_requires_three_points() {
        let two = vec![NormalizedPoint::new(0.0, 0.0), NormalizedPoint::new(1.0, 1.0)];
        assert!(matches!(
            NormalizedPolygon::new(two, true),
            Err(PipelineError::InvalidInput(_))
        ));

        let three = vec![
            NormalizedPoint::new(0.0, 0.0),
            NormalizedPoint::new(1.0, 0.0),
            NormalizedPoint::new(0.5, 1.0),
        ];
        assert!(NormalizedPolygon::new(three, true).is_ok());
    }

    /// Full pipeline: image -> polygon -> geography -> route -> score -> GPX.
    #[tokio::test]
    async fn test_end_to_end_square_image() {
        use crate::geo_utils::haversine_distance;
        use image::{DynamicImage, Rgba, RgbaImage};

        struct StraightLineProvider;

        impl RoutingProvider for StraightLineProvider {
            async fn route_leg(
                &self,
                origin: GeoPoint,
                destination: GeoPoint,
                _mode: TransportMode,
            ) -> Result<RouteLeg, PipelineError> {
                Ok(RouteLeg {
                    points: vec![origin, destination],
                    distance_meters: haversine_distance(&origin, &destination),
                })
            }
        }

        // Black square on white background
        let mut img = RgbaImage::new(100, 100);
        for pixel in img.pixels_mut() {
            *pixel = Rgba([255, 255, 255, 255]);
        }
        for y in 25..75 {
            for x in 25..75 {
                img.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        let img = DynamicImage::ImageRgba8(img);

        let polygon =
            contour::extract_shape_from_image(&img, &ExtractionConfig::default()).unwrap();
        assert!(polygon.is_closed());

        let center = GeoPoint::new(51.5074, -0.1278);
        let target = scale_to_geo(&polygon, center, 500.0).unwrap();
        assert_eq!(target.len(), polygon.len());

        let route = synthesize_route(&StraightLineProvider, &target, TransportMode::Walking)
            .await
            .unwrap();

        let result = score(&target, &route, 500.0);
        // Straight-line legs trace the target exactly
        assert_eq!(result.accuracy_percent, 100.0);
        // A 1000m-wide square outline: perimeter near 4000m
        assert!(result.length_meters > 3000.0 && result.length_meters < 5000.0);

        let parsed = gpx::parse_track_file(&gpx::to_track_file(&route)).unwrap();
        assert_eq!(parsed.points, route.points);
    }

    #[test]
    fn test_geo_polygon_preserves_order_and_closure() {
        let points = vec![
            GeoPoint::new(51.50, -0.13),
            GeoPoint::new(51.51, -0.12),
            GeoPoint::new(51.52, -0.11),
        ];
        let open = GeoPolygon::new(points.clone(), false).unwrap();
        assert!(!open.is_closed());
        assert_eq!(open.points(), points.as_slice());

        let closed = GeoPolygon::new(points, true).unwrap();
        assert!(closed.is_closed());
    }
}
