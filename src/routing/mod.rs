//! Route computation
//!
//! Directions between two coordinates behind the `RouteBackend` trait.

pub mod osrm;

use crate::coord::{BoundingBox, Coordinates};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the route will be travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    #[default]
    Automobile,
}

impl TransportType {
    /// OSRM profile name
    pub fn profile(&self) -> &'static str {
        match self {
            Self::Automobile => "driving",
        }
    }
}

/// A directions query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub source: Coordinates,
    pub destination: Coordinates,
    pub transport: TransportType,
    /// Ask for alternative routes besides the best one
    pub alternates: bool,
}

impl RouteRequest {
    /// Driving directions with alternates, as the map screen asks for
    pub fn driving(source: Coordinates, destination: Coordinates) -> Self {
        Self {
            source,
            destination,
            transport: TransportType::Automobile,
            alternates: true,
        }
    }
}

/// One candidate route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Path to draw, source to destination
    pub polyline: Vec<Coordinates>,
    /// Length in meters
    pub distance_meters: f64,
    /// Expected travel time
    #[serde(with = "duration_secs")]
    pub expected_travel_time: Duration,
}

impl Route {
    /// Rectangle enclosing the polyline
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(&self.polyline)
    }

    /// Distance in kilometers with one decimal, e.g. "3.2"
    pub fn distance_km(&self) -> String {
        format!("{:.1}", self.distance_meters / 1000.0)
    }
}

/// Trait for routing backends
pub trait RouteBackend: Send + Sync {
    /// Compute candidate routes; an empty list means no route exists
    fn directions(&self, request: RouteRequest) -> impl std::future::Future<Output = Result<Vec<Route>>> + Send;
}

/// Build the default routing backend
pub fn get_router(base_url: &str) -> osrm::OsrmBackend {
    osrm::OsrmBackend::new(base_url)
}

/// Durations as fractional seconds in JSON
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driving_request() {
        let req = RouteRequest::driving(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0));
        assert_eq!(req.transport, TransportType::Automobile);
        assert!(req.alternates);
        assert_eq!(req.transport.profile(), "driving");
    }

    #[test]
    fn test_route_summary() {
        let route = Route {
            polyline: vec![Coordinates::new(0.0, 0.0), Coordinates::new(0.01, 0.02)],
            distance_meters: 3249.0,
            expected_travel_time: Duration::from_secs(420),
        };
        assert_eq!(route.distance_km(), "3.2");

        let bbox = route.bounding_box().unwrap();
        assert_eq!(bbox.max_lng, 0.02);

        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json["expected_travel_time"], 420.0);
    }
}
