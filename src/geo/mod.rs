//! Geocoding module
//!
//! Forward geocoding (free-text address to coordinates) and reverse geocoding
//! (coordinates to an address fragment) behind the `GeoBackend` trait.

pub mod nominatim;

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A candidate match returned by a geocoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    pub coords: Coordinates,

    /// Street name (thoroughfare)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    /// House or building number (sub-thoroughfare)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,

    /// Full human-readable description
    pub display_name: String,
}

impl Placemark {
    pub fn new(coords: Coordinates, display_name: impl Into<String>) -> Self {
        Self {
            coords,
            street: None,
            house_number: None,
            display_name: display_name.into(),
        }
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn with_house_number(mut self, number: impl Into<String>) -> Self {
        self.house_number = Some(number.into());
        self
    }

    /// Short address as shown under the map pin
    ///
    /// "street, number" when both are known, "street" alone, otherwise empty.
    pub fn short_address(&self) -> String {
        match (&self.street, &self.house_number) {
            (Some(street), Some(number)) => format!("{}, {}", street, number),
            (Some(street), None) => street.clone(),
            _ => String::new(),
        }
    }
}

/// Trait for geocoding backends
///
/// Both calls return every candidate the provider produced, best first.
/// An empty list means nothing matched.
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to candidate placemarks
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<Vec<Placemark>>> + Send;

    /// Reverse geocode coordinates to candidate placemarks
    fn reverse_geocode(&self, coords: Coordinates) -> impl std::future::Future<Output = Result<Vec<Placemark>>> + Send;
}

/// Build the default geocoding backend
pub fn get_geocoder(base_url: &str) -> nominatim::NominatimBackend {
    nominatim::NominatimBackend::new(base_url)
}
