//! Geographic primitives
//!
//! This module handles:
//! - Coordinates and their validation
//! - Great-circle distance and movement thresholds
//! - Bounding boxes and map regions used to fit the viewport

pub mod distance;

use crate::constants::geo::METERS_PER_DEGREE_LAT;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    /// Parses "lat,lng"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("Expected \"lat,lng\", got: {}", s))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude: {}", lat))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude: {}", lng))?;
        Ok(Self::new(lat, lng))
    }
}

/// Axis-aligned lat/lng rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Smallest box containing every point, or None for an empty slice
    pub fn around(points: &[Coordinates]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self {
            min_lat: first.lat,
            min_lng: first.lng,
            max_lat: first.lat,
            max_lng: first.lng,
        };
        for p in &points[1..] {
            bbox.min_lat = bbox.min_lat.min(p.lat);
            bbox.min_lng = bbox.min_lng.min(p.lng);
            bbox.max_lat = bbox.max_lat.max(p.lat);
            bbox.max_lng = bbox.max_lng.max(p.lng);
        }
        Some(bbox)
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            min_lng: self.min_lng.min(other.min_lng),
            max_lat: self.max_lat.max(other.max_lat),
            max_lng: self.max_lng.max(other.max_lng),
        }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// A visible map area: a center plus its extent in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinates,
    pub latitudinal_meters: f64,
    pub longitudinal_meters: f64,
}

impl MapRegion {
    /// Square region of `meters` per side around `center`
    pub fn around(center: Coordinates, meters: f64) -> Self {
        Self {
            center,
            latitudinal_meters: meters,
            longitudinal_meters: meters,
        }
    }

    /// The region's corners as a bounding box
    pub fn bounds(&self) -> BoundingBox {
        let half_lat = self.latitudinal_meters / 2.0 / METERS_PER_DEGREE_LAT;
        let meters_per_deg_lng = METERS_PER_DEGREE_LAT * (self.center.lat * PI / 180.0).cos();
        let half_lng = self.longitudinal_meters / 2.0 / meters_per_deg_lng;

        BoundingBox {
            min_lat: self.center.lat - half_lat,
            min_lng: self.center.lng - half_lng,
            max_lat: self.center.lat + half_lat,
            max_lng: self.center.lng + half_lng,
        }
    }
}
