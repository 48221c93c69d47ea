//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/my-places/config.toml

pub mod defaults;

use crate::constants::{api, map};
use crate::error::{Error, Result};
use crate::location::AuthorizationStatus;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Map presentation settings
    #[serde(default)]
    pub map: MapConfig,

    /// External provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Device location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Listing defaults
    #[serde(default)]
    pub listing: ListingConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Catalog storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Catalog file path; empty means the XDG data directory
    #[serde(default)]
    pub path: String,
}

/// Map presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Side of the region shown around the user, in meters
    #[serde(default = "default_region_meters")]
    pub region_meters: f64,

    /// Center movement that triggers a recenter while tracking
    #[serde(default = "default_tracking_threshold")]
    pub tracking_threshold_meters: f64,

    /// Settle pause before recentering, in seconds
    #[serde(default = "default_recenter_delay")]
    pub recenter_delay_secs: u64,
}

/// External provider endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Nominatim-compatible geocoder base URL
    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// OSRM-compatible router base URL
    #[serde(default = "default_router_url")]
    pub router_url: String,
}

/// Device location settings
///
/// When both `lat` and `lng` are set the device is pinned to that position,
/// otherwise it is located by IP address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,

    /// Whether location services are enabled at the platform level
    #[serde(default = "default_services_enabled")]
    pub services_enabled: bool,

    /// Authorization status reported for the app
    #[serde(default = "default_authorization")]
    pub authorization: String,
}

/// Listing defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Sort key: "date" or "name"
    #[serde(default = "default_sort")]
    pub sort: String,

    /// Sort direction
    #[serde(default = "default_ascending")]
    pub ascending: bool,

    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_region_meters() -> f64 {
    map::REGION_METERS
}
fn default_tracking_threshold() -> f64 {
    map::TRACKING_THRESHOLD_METERS
}
fn default_recenter_delay() -> u64 {
    map::RECENTER_DELAY_SECS
}
fn default_geocoder_url() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_router_url() -> String {
    api::OSRM_URL.to_string()
}
fn default_services_enabled() -> bool {
    true
}
fn default_authorization() -> String {
    DEFAULT_AUTHORIZATION.to_string()
}
fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}
fn default_ascending() -> bool {
    DEFAULT_ASCENDING
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},17z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=17/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            region_meters: default_region_meters(),
            tracking_threshold_meters: default_tracking_threshold(),
            recenter_delay_secs: default_recenter_delay(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocoder_url: default_geocoder_url(),
            router_url: default_router_url(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            lat: None,
            lng: None,
            services_enabled: default_services_enabled(),
            authorization: default_authorization(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            sort: default_sort(),
            ascending: default_ascending(),
            format: default_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl MapConfig {
    /// Settle pause as a duration
    pub fn recenter_delay(&self) -> Duration {
        Duration::from_secs(self.recenter_delay_secs)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    /// Resolve the catalog file path
    pub fn catalog_path(&self) -> Result<PathBuf> {
        if self.storage.path.is_empty() {
            Ok(Self::data_dir()?.join(CATALOG_FILE_NAME))
        } else {
            Ok(PathBuf::from(&self.storage.path))
        }
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "path"] => Some(self.storage.path.clone()),

            ["map", "region_meters"] => Some(self.map.region_meters.to_string()),
            ["map", "tracking_threshold_meters"] => {
                Some(self.map.tracking_threshold_meters.to_string())
            }
            ["map", "recenter_delay_secs"] => Some(self.map.recenter_delay_secs.to_string()),

            ["providers", "geocoder_url"] => Some(self.providers.geocoder_url.clone()),
            ["providers", "router_url"] => Some(self.providers.router_url.clone()),

            ["location", "lat"] => Some(opt_to_string(self.location.lat)),
            ["location", "lng"] => Some(opt_to_string(self.location.lng)),
            ["location", "services_enabled"] => {
                Some(self.location.services_enabled.to_string())
            }
            ["location", "authorization"] => Some(self.location.authorization.clone()),

            ["listing", "sort"] => Some(self.listing.sort.clone()),
            ["listing", "ascending"] => Some(self.listing.ascending.to_string()),
            ["listing", "format"] => Some(self.listing.format.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["storage", "path"] => {
                self.storage.path = value.to_string();
            }

            ["map", "region_meters"] => {
                self.map.region_meters = parse_value(value, "region")?;
            }
            ["map", "tracking_threshold_meters"] => {
                self.map.tracking_threshold_meters = parse_value(value, "threshold")?;
            }
            ["map", "recenter_delay_secs"] => {
                self.map.recenter_delay_secs = parse_value(value, "delay")?;
            }

            ["providers", "geocoder_url"] => {
                self.providers.geocoder_url = value.to_string();
            }
            ["providers", "router_url"] => {
                self.providers.router_url = value.to_string();
            }

            ["location", "lat"] => {
                self.location.lat = parse_optional(value, "latitude")?;
            }
            ["location", "lng"] => {
                self.location.lng = parse_optional(value, "longitude")?;
            }
            ["location", "services_enabled"] => {
                self.location.services_enabled = parse_value(value, "boolean")?;
            }
            ["location", "authorization"] => {
                value
                    .parse::<AuthorizationStatus>()
                    .map_err(Error::Config)?;
                self.location.authorization = value.to_string();
            }

            ["listing", "sort"] => {
                if value != "date" && value != "name" {
                    return Err(Error::Config(format!("Invalid sort value: {}", value)));
                }
                self.listing.sort = value.to_string();
            }
            ["listing", "ascending"] => {
                self.listing.ascending = parse_value(value, "boolean")?;
            }
            ["listing", "format"] => {
                self.listing.format = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(value, "port")?;
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "storage.path",
            "map.region_meters",
            "map.tracking_threshold_meters",
            "map.recenter_delay_secs",
            "providers.geocoder_url",
            "providers.router_url",
            "location.lat",
            "location.lng",
            "location.services_enabled",
            "location.authorization",
            "listing.sort",
            "listing.ascending",
            "listing.format",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}

/// An empty value clears the setting
fn parse_optional(value: &str, what: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_value(value, what).map(Some)
    }
}

fn opt_to_string(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.listing.sort, "date");
        assert!(config.listing.ascending);
        assert_eq!(config.map.tracking_threshold_meters, 50.0);
        assert_eq!(config.map.region_meters, 1000.0);
        assert_eq!(config.server.port, 7879);
        assert!(config.location.lat.is_none());
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("listing.sort"), Some("date".to_string()));

        config.set("listing.sort", "name").unwrap();
        assert_eq!(config.get("listing.sort"), Some("name".to_string()));

        config.set("map.tracking_threshold_meters", "75").unwrap();
        assert_eq!(config.map.tracking_threshold_meters, 75.0);
    }

    #[test]
    fn test_set_location_pin_and_clear() {
        let mut config = Config::default();

        config.set("location.lat", "48.8566").unwrap();
        config.set("location.lng", "2.3522").unwrap();
        assert_eq!(config.location.lat, Some(48.8566));
        assert_eq!(config.get("location.lng"), Some("2.3522".to_string()));

        config.set("location.lat", "").unwrap();
        assert!(config.location.lat.is_none());
        assert_eq!(config.get("location.lat"), Some(String::new()));
    }

    #[test]
    fn test_set_authorization_validates() {
        let mut config = Config::default();
        assert!(config.set("location.authorization", "denied").is_ok());
        assert!(config.set("location.authorization", "maybe").is_err());
        assert_eq!(config.location.authorization, "denied");
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("map.region_meters", "not_a_number").is_err());
        assert!(config.set("listing.sort", "rating").is_err());
    }

    #[test]
    fn test_catalog_path_override() {
        let mut config = Config::default();
        config.storage.path = "/tmp/places.json".to_string();
        assert_eq!(config.catalog_path().unwrap(), PathBuf::from("/tmp/places.json"));
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config.format_url(Some("google"), 40.7128, -74.0060).unwrap();
        assert_eq!(url, "https://www.google.com/maps/@40.7128,-74.006,17z");

        let url = config.format_url(None, 40.7128, -74.0060).unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=17/40.7128/-74.006");

        assert!(config.format_url(Some("unknown"), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.listing.sort = "name".to_string();
            config.location.lat = Some(1.5);
            config.save().unwrap();

            let loaded = Config::load().unwrap();
            assert_eq!(loaded.listing.sort, "name");
            assert_eq!(loaded.location.lat, Some(1.5));
        });
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[map]"));
        assert!(toml.contains("[providers]"));
        assert!(toml.contains("[listing]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_recenter_delay() {
        let config = Config::default();
        assert_eq!(config.map.recenter_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7879");
    }
}
