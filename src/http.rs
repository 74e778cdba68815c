//! HTTP routing provider for OSRM-compatible endpoints.
//!
//! Implements [`RoutingProvider`] against the OSRM `/route/v1` API with:
//! - Connection pooling for HTTP/2 multiplexing across concurrent legs
//! - A per-request leg timeout (a timed-out leg is a routing failure)
//! - No automatic retry: a failed leg aborts the whole synthesis run
//!
//! The provider depends only on the OSRM wire format; any server speaking
//! it (public demo server, self-hosted osrm-backend, compatible gateways)
//! works.

use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::{GeoPoint, PipelineError, RouteLeg, RoutingProvider, TransportMode};

const DEFAULT_LEG_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_IDLE_PER_HOST: usize = 16;

/// Routing provider backed by an OSRM-compatible HTTP server.
pub struct OsrmProvider {
    client: Client,
    base_url: String,
}

impl OsrmProvider {
    /// Create a provider with the default 10s leg timeout.
    ///
    /// `base_url` is the server root, e.g. `https://router.example.com`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PipelineError> {
        Self::with_timeout(base_url, DEFAULT_LEG_TIMEOUT)
    }

    /// Create a provider with an explicit per-leg request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        leg_timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(leg_timeout)
            .build()
            .map_err(|e| PipelineError::Routing(format!("failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// OSRM profile segment for a transport mode.
    fn profile(mode: TransportMode) -> &'static str {
        match mode {
            TransportMode::Walking => "foot",
            TransportMode::Cycling => "bike",
            TransportMode::Driving => "driving",
        }
    }

    /// Build the request URL for one leg. OSRM takes `lon,lat` pairs.
    fn leg_url(&self, origin: &GeoPoint, destination: &GeoPoint, mode: TransportMode) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            Self::profile(mode),
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude
        )
    }
}

/// OSRM route response (the fields this provider reads).
#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON LineString: coordinates are `[lon, lat]` pairs.
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

fn parse_leg(bytes: &[u8]) -> Result<RouteLeg, PipelineError> {
    let response: OsrmResponse = serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::Routing(format!("malformed provider response: {}", e)))?;

    if response.code != "Ok" {
        return Err(PipelineError::Routing(format!(
            "provider rejected leg: {}",
            response.code
        )));
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Routing("no path found for leg".to_string()))?;

    let points = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| GeoPoint::new(lat, lon))
        .collect();

    Ok(RouteLeg {
        points,
        distance_meters: route.distance,
    })
}

impl RoutingProvider for OsrmProvider {
    async fn route_leg(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TransportMode,
    ) -> Result<RouteLeg, PipelineError> {
        let url = self.leg_url(&origin, &destination, mode);
        let start = Instant::now();

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::Routing("leg request timed out".to_string())
            } else {
                PipelineError::Routing(format!("leg request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("provider rate limited leg request");
            return Err(PipelineError::Routing("provider rate limited".to_string()));
        }
        if !status.is_success() {
            return Err(PipelineError::Routing(format!("provider HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Routing(format!("body download error: {}", e)))?;

        let leg = parse_leg(&bytes)?;

        debug!(
            "leg resolved: {} points, {:.0}m in {:?}",
            leg.points.len(),
            leg.distance_meters,
            start.elapsed()
        );

        Ok(leg)
    }
}
