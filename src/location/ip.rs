//! Device position from the public IP address
//!
//! Used when no fixed position is configured. Lookups go to ip-api.com and
//! are cached on disk for an hour so repeated commands stay quiet.

use crate::constants::api::{IP_API_URL, USER_AGENT};
use crate::constants::cache::{IP_LOCATION_CACHE_FILE, IP_LOCATION_TTL_SECS};
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A position resolved from an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub coords: Coordinates,
    /// "City, Region, Country" as far as known
    pub display_name: String,
}

/// IP location service with caching
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    cache_path: Option<PathBuf>,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

/// Cached location data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedLocation {
    location: IpLocation,
    fetched_at: DateTime<Utc>,
}

impl IpLocator {
    /// Create an IP locator with the default cache path
    pub fn new() -> Self {
        let cache_path = dirs::cache_dir()
            .map(|p| p.join(crate::config::defaults::APP_DIR_NAME).join(IP_LOCATION_CACHE_FILE));
        Self::build(cache_path)
    }

    /// Create an IP locator with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf) -> Self {
        Self::build(Some(cache_path))
    }

    /// Create an IP locator without caching
    pub fn without_cache() -> Self {
        Self::build(None)
    }

    fn build(cache_path: Option<PathBuf>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, cache_path }
    }

    /// Get current location based on IP address
    pub async fn locate(&self) -> Result<IpLocation> {
        if let Some(cached) = self.load_cache(Utc::now()) {
            debug!("Using cached IP location: {}", cached.display_name);
            return Ok(cached);
        }

        let location = self.fetch_location().await?;
        self.save_cache(&location, Utc::now());

        Ok(location)
    }

    async fn fetch_location(&self) -> Result<IpLocation> {
        let response = self
            .client
            .get(IP_API_URL)
            .send()
            .await
            .map_err(|e| Error::Geo(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geo(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geo(format!("Failed to parse IP location response: {}", e)))?;

        Self::into_location(data)
    }

    fn into_location(data: IpApiResponse) -> Result<IpLocation> {
        if data.status != "success" {
            return Err(Error::Geo("IP location lookup failed".to_string()));
        }

        let lat = data.lat.ok_or_else(|| Error::Geo("No latitude in response".to_string()))?;
        let lng = data.lon.ok_or_else(|| Error::Geo("No longitude in response".to_string()))?;

        let display_name = [data.city, data.region_name, data.country]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");

        Ok(IpLocation {
            coords: Coordinates::new(lat, lng),
            display_name: if display_name.is_empty() {
                "Unknown Location".to_string()
            } else {
                display_name
            },
        })
    }

    fn load_cache(&self, now: DateTime<Utc>) -> Option<IpLocation> {
        let cache_path = self.cache_path.as_ref()?;
        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedLocation = serde_json::from_str(&content).ok()?;

        let age = now.signed_duration_since(cached.fetched_at).num_seconds();
        (0..IP_LOCATION_TTL_SECS as i64)
            .contains(&age)
            .then_some(cached.location)
    }

    fn save_cache(&self, location: &IpLocation, now: DateTime<Utc>) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let cached = CachedLocation {
            location: location.clone(),
            fetched_at: now,
        };

        if let Ok(content) = serde_json::to_string_pretty(&cached) {
            let _ = fs::write(cache_path, content);
        }
    }

    /// Forget the cached position
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}
