//! Server shared state
//!
//! Holds configuration, the catalog handle and the map providers.

use crate::bridge::MapBridge;
use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::geo::{get_geocoder, nominatim::NominatimBackend};
use crate::location::DeviceLocation;
use crate::routing::{get_router, osrm::OsrmBackend};
use std::time::Instant;

/// Bridge type used by request handlers
pub type ServerBridge = MapBridge<NominatimBackend, OsrmBackend, DeviceLocation>;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Place catalog
    pub store: CatalogStore,

    geocoder: NominatimBackend,
    router: OsrmBackend,
    started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, store: CatalogStore) -> Self {
        let geocoder = get_geocoder(&config.providers.geocoder_url);
        let router = get_router(&config.providers.router_url);
        Self {
            config,
            store,
            geocoder,
            router,
            started_at: Instant::now(),
        }
    }

    /// A bridge for one request
    ///
    /// With `origin` the device is pinned there; otherwise the configured
    /// location settings apply.
    pub fn bridge(&self, origin: Option<Coordinates>) -> ServerBridge {
        let location = match origin {
            Some(coords) => DeviceLocation::fixed(coords),
            None => DeviceLocation::from_config(&self.config.location),
        };
        MapBridge::new(
            self.geocoder.clone(),
            self.router.clone(),
            location,
            self.config.map.clone(),
        )
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
