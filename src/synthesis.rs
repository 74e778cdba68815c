//! Route synthesis: ordered waypoints to a continuous routed path.
//!
//! For a polygon with `n` waypoints the synthesizer requests one routed
//! path per consecutive pair (plus the wrap-around pair when the shape is
//! closed), one request per leg rather than one multi-waypoint request.
//! That keeps failures isolated to a single leg and per-request payloads
//! small.
//!
//! Leg requests run concurrently but results are gathered **by leg index**,
//! so concurrency affects wall-clock latency, never result ordering or
//! content. The first failing leg aborts the whole run: a partial shape is
//! considered more misleading than an explicit failure. Dropping the
//! returned future cancels all in-flight leg requests.

use futures::future::try_join_all;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{GeoPoint, GeoPolygon, PipelineError, RouteGeometry, RouteLeg};

/// Transport mode, passed through to the routing provider per leg.
///
/// The synthesizer does not interpret mode semantics itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walking,
    Cycling,
    Driving,
}

impl TransportMode {
    /// Stable lowercase name, used for logging and provider URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
            Self::Driving => "driving",
        }
    }
}

/// External routing collaborator: resolves one origin-to-destination leg
/// against a real road/path network.
///
/// The pipeline depends only on this contract, not on any specific
/// provider's wire format. Implementations should bound each call with
/// their own timeout; a timed-out leg is reported as
/// [`PipelineError::Routing`] like any other leg failure.
pub trait RoutingProvider {
    /// Resolve a routed path from `origin` to `destination`.
    fn route_leg(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> impl std::future::Future<Output = Result<RouteLeg, PipelineError>> + Send;
}

/// Synthesize a continuous route through the polygon's waypoints.
///
/// Issues one provider call per leg, concurrently, and stitches the
/// resulting geometries in waypoint order with duplicated joint points
/// removed. Aborts on the first leg failure without returning a partial
/// route.
///
/// # Example
/// ```no_run
/// # async fn run(provider: impl shape_route::RoutingProvider) {
/// use shape_route::{synthesize_route, GeoPoint, GeoPolygon, TransportMode};
///
/// let waypoints = GeoPolygon::new(
///     vec![
///         GeoPoint::new(51.5074, -0.1278),
///         GeoPoint::new(51.5080, -0.1290),
///         GeoPoint::new(51.5090, -0.1300),
///     ],
///     true,
/// )
/// .unwrap();
///
/// let route = synthesize_route(&provider, &waypoints, TransportMode::Walking)
///     .await
///     .unwrap();
/// println!("route: {} points, {:.0}m", route.points.len(), route.distance_meters);
/// # }
/// ```
pub async fn synthesize_route<P: RoutingProvider>(
    provider: &P,
    waypoints: &GeoPolygon,
    mode: TransportMode,
) -> Result<RouteGeometry, PipelineError> {
    let points = waypoints.points();

    let mut pairs: Vec<(GeoPoint, GeoPoint)> = points.windows(2).map(|w| (w[0], w[1])).collect();
    if waypoints.is_closed() {
        // Wrap-around leg back to the start
        pairs.push((points[points.len() - 1], points[0]));
    }

    info!(
        "synthesizing {} route: {} waypoints, {} legs",
        mode.as_str(),
        points.len(),
        pairs.len()
    );

    // Concurrent requests, gathered in leg order. try_join_all preserves
    // input ordering and drops remaining futures on the first error.
    let legs: Vec<RouteLeg> = try_join_all(
        pairs
            .iter()
            .map(|(origin, destination)| provider.route_leg(*origin, *destination, mode)),
    )
    .await?;

    let mut stitched: Vec<GeoPoint> = Vec::new();
    let mut distance_meters = 0.0;
    for (i, leg) in legs.iter().enumerate() {
        debug!(
            "leg {}: {} points, {:.0}m",
            i,
            leg.points.len(),
            leg.distance_meters
        );
        distance_meters += leg.distance_meters;
        for point in &leg.points {
            // Consecutive legs share an endpoint; keep only one copy
            if stitched.last() != Some(point) {
                stitched.push(*point);
            }
        }
    }

    info!(
        "synthesized route: {} points, {:.0}m over {} legs",
        stitched.len(),
        distance_meters,
        legs.len()
    );

    Ok(RouteGeometry {
        points: stitched,
        distance_meters,
    })
}
