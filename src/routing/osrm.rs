//! OSRM routing backend
//!
//! Talks to an OSRM `route` service and returns every route it proposes
//! with its full GeoJSON geometry.

use crate::constants::api::USER_AGENT;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::routing::{Route, RouteBackend, RouteRequest};
use serde::Deserialize;
use std::time::Duration;

/// OSRM routing backend
#[derive(Debug, Clone)]
pub struct OsrmBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON LineString, positions are [lng, lat]
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OsrmBackend {
    /// Create a new OSRM backend against `base_url`
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn route_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?alternatives={}&overview=full&geometries=geojson",
            self.base_url,
            request.transport.profile(),
            request.source.lng,
            request.source.lat,
            request.destination.lng,
            request.destination.lat,
            request.alternates
        )
    }

    fn into_routes(response: OsrmResponse) -> Result<Vec<Route>> {
        match response.code.as_str() {
            "Ok" => Ok(response
                .routes
                .into_iter()
                .map(|r| Route {
                    polyline: r
                        .geometry
                        .coordinates
                        .into_iter()
                        .map(|[lng, lat]| Coordinates::new(lat, lng))
                        .collect(),
                    distance_meters: r.distance,
                    expected_travel_time: Duration::from_secs_f64(r.duration.max(0.0)),
                })
                .collect()),
            // Valid request, nothing drivable between the points
            "NoRoute" | "NoSegment" => Ok(Vec::new()),
            code => Err(Error::Routing(format!(
                "OSRM returned {}: {}",
                code,
                response.message.unwrap_or_default()
            ))),
        }
    }
}

impl RouteBackend for OsrmBackend {
    async fn directions(&self, request: RouteRequest) -> Result<Vec<Route>> {
        let url = self.route_url(&request);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Routing(format!("OSRM request failed: {}", e)))?;

        // OSRM reports NoRoute with a 400 status and a JSON body
        let body: OsrmResponse = response
            .json()
            .await
            .map_err(|e| Error::Routing(format!("Failed to parse OSRM response: {}", e)))?;

        Self::into_routes(body)
    }
}
