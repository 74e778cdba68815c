//! Accuracy scoring: how closely the realized route matches the target.
//!
//! Length is the sum of haversine distances over the route geometry. It
//! should agree closely with the provider-reported leg distances summed
//! during synthesis, but is computed independently so the displayed value
//! is consistent with the displayed geometry.
//!
//! Accuracy takes each target vertex's minimum distance to the route
//! polyline (point-to-segment, not point-to-point, so sparse route
//! sampling is not penalized), averages those distances, and normalizes by
//! the projection radius. Sharp polygon corners naturally route worse
//! because nearby roads may not exist at the exact corner; that lowers the
//! score rather than being smoothed away.
//!
//! Known limitation: the metric is asymmetric (target to route only) and
//! can score a route highly when it deviates between target vertices but
//! passes close to every vertex. Acceptable for vertex-anchored shape
//! fidelity; not a general shape-similarity measure.

use log::{debug, warn};

use crate::geo_utils::{point_to_segment_distance, polyline_length, to_local_plane};
use crate::{AccuracyResult, GeoPolygon, RouteGeometry};

/// Score a realized route against its target polygon.
///
/// Never fails for non-empty inputs. Returns `accuracy_percent = 0` when
/// the route has fewer than 2 points (no polyline to measure against).
pub fn score(target: &GeoPolygon, route: &RouteGeometry, radius_meters: f64) -> AccuracyResult {
    let length_meters = polyline_length(&route.points);

    if route.points.len() < 2 {
        return AccuracyResult {
            length_meters,
            accuracy_percent: 0.0,
        };
    }
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        warn!("scoring with non-positive radius {}", radius_meters);
        return AccuracyResult {
            length_meters,
            accuracy_percent: 0.0,
        };
    }

    // Work in a local meter plane anchored at the first target vertex;
    // the equirectangular error is negligible at these radii.
    let origin = target.points()[0];
    let route_plane: Vec<(f64, f64)> = route
        .points
        .iter()
        .map(|p| to_local_plane(p, &origin))
        .collect();

    let total_deviation: f64 = target
        .points()
        .iter()
        .map(|vertex| {
            let v = to_local_plane(vertex, &origin);
            route_plane
                .windows(2)
                .map(|seg| point_to_segment_distance(v, seg[0], seg[1]))
                .fold(f64::INFINITY, f64::min)
        })
        .sum();
    let average_deviation = total_deviation / target.len() as f64;

    let accuracy_percent =
        (100.0 * (1.0 - average_deviation / radius_meters)).clamp(0.0, 100.0);

    debug!(
        "score: length {:.0}m, avg deviation {:.1}m, accuracy {:.1}%",
        length_meters, average_deviation, accuracy_percent
    );

    AccuracyResult {
        length_meters,
        accuracy_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::offset_geo;
    use crate::GeoPoint;

    fn london() -> GeoPoint {
        GeoPoint::new(51.5074, -0.1278)
    }

    /// 10m square east/north of the center, as in a grid-city scenario.
    fn square_target() -> GeoPolygon {
        let c = london();
        GeoPolygon::new(
            vec![
                offset_geo(c, 0.0, 0.0),
                offset_geo(c, 0.0, 10.0),
                offset_geo(c, 10.0, 10.0),
                offset_geo(c, 10.0, 0.0),
            ],
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_identical_route_scores_100() {
        let target = square_target();
        let route = RouteGeometry {
            points: target.points().to_vec(),
            distance_meters: 0.0,
        };
        let result = score(&target, &route, 50.0);
        assert_eq!(result.accuracy_percent, 100.0);
    }

    #[test]
    fn test_square_scenario_length_and_accuracy() {
        let target = square_target();

        // Route traces the 4 corners and closes back to the start
        let mut points = target.points().to_vec();
        points.push(points[0]);
        let route = RouteGeometry {
            points,
            distance_meters: 40.0,
        };

        let result = score(&target, &route, 50.0);
        assert_eq!(result.accuracy_percent, 100.0);
        assert!(
            (result.length_meters - 40.0).abs() < 0.05,
            "length was {}",
            result.length_meters
        );
    }

    #[test]
    fn test_distant_route_scores_0() {
        let target = square_target();

        // Route parked 60m+ east of every target vertex, radius 50
        let c = london();
        let route = RouteGeometry {
            points: vec![offset_geo(c, 80.0, 0.0), offset_geo(c, 80.0, 10.0)],
            distance_meters: 10.0,
        };

        let result = score(&target, &route, 50.0);
        assert_eq!(result.accuracy_percent, 0.0);
    }

    #[test]
    fn test_partial_deviation_within_bounds() {
        let target = square_target();

        // Route shifted 10m east: deviation 10m of a 50m radius
        let c = london();
        let mut points: Vec<GeoPoint> = vec![
            offset_geo(c, 10.0, 0.0),
            offset_geo(c, 10.0, 10.0),
            offset_geo(c, 20.0, 10.0),
            offset_geo(c, 20.0, 0.0),
        ];
        points.push(points[0]);
        let route = RouteGeometry {
            points,
            distance_meters: 40.0,
        };

        let result = score(&target, &route, 50.0);
        assert!(result.accuracy_percent > 0.0);
        assert!(result.accuracy_percent < 100.0);
        // Two corners deviate by 10m, two lie on the route: ~5m average
        // deviation of a 50m radius, accuracy near 90%
        assert!((result.accuracy_percent - 90.0).abs() < 2.0);
    }

    #[test]
    fn test_short_route_scores_0() {
        let target = square_target();
        let single = RouteGeometry {
            points: vec![london()],
            distance_meters: 0.0,
        };
        let result = score(&target, &single, 50.0);
        assert_eq!(result.accuracy_percent, 0.0);
        assert_eq!(result.length_meters, 0.0);

        let empty = RouteGeometry {
            points: vec![],
            distance_meters: 0.0,
        };
        assert_eq!(score(&target, &empty, 50.0).accuracy_percent, 0.0);
    }

    #[test]
    fn test_segment_interpolation_not_penalized() {
        // Target vertex sits on a long route segment with no nearby route
        // vertex; point-to-segment keeps the deviation at zero.
        let c = london();
        let target = GeoPolygon::new(
            vec![
                offset_geo(c, 0.0, 0.0),
                offset_geo(c, 50.0, 0.0),
                offset_geo(c, 100.0, 0.0),
            ],
            false,
        )
        .unwrap();

        let route = RouteGeometry {
            points: vec![offset_geo(c, 0.0, 0.0), offset_geo(c, 100.0, 0.0)],
            distance_meters: 100.0,
        };

        let result = score(&target, &route, 100.0);
        assert!(result.accuracy_percent > 99.0);
    }
}
