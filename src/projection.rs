//! Geo projection: normalized polygon to WGS84 coordinates.
//!
//! The polygon's bounding box is centered on the user-chosen center point
//! and scaled so its longer dimension spans `2 x radius` meters. The
//! shorter dimension uses the same scale factor, preserving aspect ratio
//! rather than stretching to fill an ellipse.
//!
//! Meter offsets become latitude/longitude via an equirectangular
//! approximation (see [`crate::geo_utils::offset_geo`]), which is locally
//! accurate at the short ranges this pipeline targets.

use log::debug;

use crate::geo_utils::offset_geo;
use crate::{GeoPoint, GeoPolygon, NormalizedPolygon, PipelineError};

/// Project a normalized polygon onto geography around `center`.
///
/// Pure math, deterministic: repeated calls with the same inputs return
/// identical output. Point order and closure state are preserved.
///
/// Returns [`PipelineError::InvalidInput`] for a non-positive or non-finite
/// radius, an invalid center, or a degenerate (zero-extent) polygon.
pub fn scale_to_geo(
    polygon: &NormalizedPolygon,
    center: GeoPoint,
    radius_meters: f64,
) -> Result<GeoPolygon, PipelineError> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(PipelineError::InvalidInput(format!(
            "radius must be positive, got {}",
            radius_meters
        )));
    }
    if !center.is_valid() {
        return Err(PipelineError::InvalidInput(format!(
            "center is not a valid WGS84 coordinate: ({}, {})",
            center.latitude, center.longitude
        )));
    }

    // Bounding box of the normalized points
    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_y = f64::MAX;
    let mut max_y = f64::MIN;
    for p in polygon.points() {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let width = max_x - min_x;
    let height = max_y - min_y;
    let longer = width.max(height);
    if longer <= 0.0 {
        return Err(PipelineError::InvalidInput(
            "polygon has zero extent".to_string(),
        ));
    }

    // Longer bounding-box dimension spans the full diameter
    let meters_per_unit = (2.0 * radius_meters) / longer;
    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;

    debug!(
        "projecting {} points: bbox {:.3}x{:.3}, {:.1} m/unit",
        polygon.len(),
        width,
        height,
        meters_per_unit
    );

    // Image y grows downward; north grows upward
    let points: Vec<GeoPoint> = polygon
        .points()
        .iter()
        .map(|p| {
            let east = (p.x - center_x) * meters_per_unit;
            let north = (center_y - p.y) * meters_per_unit;
            offset_geo(center, east, north)
        })
        .collect();

    GeoPolygon::new(points, polygon.is_closed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::haversine_distance;
    use crate::NormalizedPoint;

    fn unit_square() -> NormalizedPolygon {
        NormalizedPolygon::new(
            vec![
                NormalizedPoint::new(0.0, 0.0),
                NormalizedPoint::new(1.0, 0.0),
                NormalizedPoint::new(1.0, 1.0),
                NormalizedPoint::new(0.0, 1.0),
            ],
            true,
        )
        .unwrap()
    }

    fn london() -> GeoPoint {
        GeoPoint::new(51.5074, -0.1278)
    }

    #[test]
    fn test_projection_is_deterministic() {
        let polygon = unit_square();
        let a = scale_to_geo(&polygon, london(), 500.0).unwrap();
        let b = scale_to_geo(&polygon, london(), 500.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_count_and_closure_preserved() {
        let polygon = unit_square();
        let geo = scale_to_geo(&polygon, london(), 500.0).unwrap();
        assert_eq!(geo.len(), polygon.len());
        assert!(geo.is_closed());

        let open = NormalizedPolygon::new(polygon.points().to_vec(), false).unwrap();
        let geo_open = scale_to_geo(&open, london(), 500.0).unwrap();
        assert!(!geo_open.is_closed());

        // First normalized point is top-left, so first geo point is the
        // north-west corner: highest latitude, lowest longitude.
        let first = geo.points()[0];
        for p in geo.points().iter().skip(1) {
            assert!(first.latitude >= p.latitude - 1e-12);
            assert!(first.longitude <= p.longitude + 1e-12);
        }
    }

    #[test]
    fn test_longer_dimension_spans_diameter() {
        let polygon = unit_square();
        let geo = scale_to_geo(&polygon, london(), 500.0).unwrap();
        let pts = geo.points();

        // East-west extent between the two top corners: 2 x radius
        let span = haversine_distance(&pts[0], &pts[1]);
        assert!((span - 1000.0).abs() < 5.0, "span was {}", span);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        // A 1.0 x 0.5 rectangle: height should span half the diameter
        let polygon = NormalizedPolygon::new(
            vec![
                NormalizedPoint::new(0.0, 0.0),
                NormalizedPoint::new(1.0, 0.0),
                NormalizedPoint::new(1.0, 0.5),
                NormalizedPoint::new(0.0, 0.5),
            ],
            true,
        )
        .unwrap();

        let geo = scale_to_geo(&polygon, london(), 500.0).unwrap();
        let pts = geo.points();

        let width = haversine_distance(&pts[0], &pts[1]);
        let height = haversine_distance(&pts[1], &pts[2]);
        assert!((width - 1000.0).abs() < 5.0, "width was {}", width);
        assert!((height - 500.0).abs() < 5.0, "height was {}", height);
    }

    #[test]
    fn test_invalid_radius_rejected() {
        let polygon = unit_square();
        assert!(matches!(
            scale_to_geo(&polygon, london(), 0.0),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(matches!(
            scale_to_geo(&polygon, london(), -10.0),
            Err(PipelineError::InvalidInput(_))
        ));
        assert!(matches!(
            scale_to_geo(&polygon, london(), f64::NAN),
            Err(PipelineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let polygon = NormalizedPolygon::new(
            vec![
                NormalizedPoint::new(0.5, 0.5),
                NormalizedPoint::new(0.5, 0.5),
                NormalizedPoint::new(0.5, 0.5),
            ],
            true,
        )
        .unwrap();
        assert!(matches!(
            scale_to_geo(&polygon, london(), 500.0),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}
