//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for geocoding.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::constants::api::USER_AGENT;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, Placemark};
use serde::Deserialize;

/// Candidates requested per forward lookup
const SEARCH_LIMIT: usize = 5;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search/reverse response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    pedestrian: Option<String>,
    house_number: Option<String>,
}

/// Reverse lookups answer `{"error": "..."}` when nothing is there
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Found(NominatimResult),
    Missing { error: String },
}

impl NominatimBackend {
    /// Create a new Nominatim backend against `base_url`
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

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<Coordinates> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::Geo(format!("Invalid longitude: {}", lng)))?;
        Ok(Coordinates::new(lat, lng))
    }

    fn to_placemark(result: NominatimResult) -> Result<Placemark> {
        let coords = Self::parse_coords(&result.lat, &result.lon)?;
        let address = result.address.unwrap_or_default();

        Ok(Placemark {
            coords,
            street: address.road.or(address.pedestrian),
            house_number: address.house_number,
            display_name: result.display_name,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Geo(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse Nominatim response: {}", e)))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Vec<Placemark>> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&addressdetails=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            SEARCH_LIMIT
        );

        let results: Vec<NominatimResult> = self.get_json(&url).await?;
        results.into_iter().map(Self::to_placemark).collect()
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Vec<Placemark>> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=jsonv2&addressdetails=1",
            self.base_url, coords.lat, coords.lng
        );

        match self.get_json(&url).await? {
            ReverseResponse::Found(result) => Ok(vec![Self::to_placemark(result)?]),
            ReverseResponse::Missing { error } => {
                tracing::debug!("Nominatim reverse lookup empty: {}", error);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::api::NOMINATIM_URL;

    #[test]
    fn test_parse_coords() {
        let c = NominatimBackend::parse_coords("40.7128", "-74.0060").unwrap();
        assert!((c.lat - 40.7128).abs() < 0.0001);
        assert!((c.lng - (-74.0060)).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_search_result_to_placemark() {
        let body = r#"[{
            "lat": "51.5007", "lon": "-0.1246",
            "display_name": "Elizabeth Tower, Bridge Street, London",
            "address": {"road": "Bridge Street", "house_number": "1"}
        }]"#;
        let results: Vec<NominatimResult> = serde_json::from_str(body).unwrap();
        let placemark = NominatimBackend::to_placemark(results.into_iter().next().unwrap()).unwrap();

        assert_eq!(placemark.street.as_deref(), Some("Bridge Street"));
        assert_eq!(placemark.short_address(), "Bridge Street, 1");
    }

    #[test]
    fn test_pedestrian_way_counts_as_street() {
        let body = r#"{
            "lat": "45.4340", "lon": "12.3388",
            "display_name": "Piazza San Marco, Venezia",
            "address": {"pedestrian": "Piazza San Marco"}
        }"#;
        let result: NominatimResult = serde_json::from_str(body).unwrap();
        let placemark = NominatimBackend::to_placemark(result).unwrap();
        assert_eq!(placemark.short_address(), "Piazza San Marco");
    }

    #[test]
    fn test_reverse_error_body() {
        let body = r#"{"error": "Unable to geocode"}"#;
        let parsed: ReverseResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed, ReverseResponse::Missing { .. }));
    }

    #[test]
    fn test_backend_creation() {
        let backend = NominatimBackend::new(&format!("{}/", NOMINATIM_URL));
        assert_eq!(backend.base_url, NOMINATIM_URL);
    }
}
