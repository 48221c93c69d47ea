//! Centralized constants for the my-places crate

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters (WGS84 approximation)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// OSRM public routing API
    pub const OSRM_URL: &str = "https://router.project-osrm.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";

    /// User agent sent to every provider (Nominatim requires one)
    pub const USER_AGENT: &str = concat!("my-places/", env!("CARGO_PKG_VERSION"));
}

/// Cache settings
pub mod cache {
    /// IP location cache duration in seconds (1 hour)
    pub const IP_LOCATION_TTL_SECS: u64 = 3600;

    /// IP location cache file name
    pub const IP_LOCATION_CACHE_FILE: &str = "ip_location_cache.json";
}

/// Map presentation settings
pub mod map {
    /// Side of the region shown around the user, in meters
    pub const REGION_METERS: f64 = 1000.0;

    /// Map center movement that triggers a recenter while tracking
    pub const TRACKING_THRESHOLD_METERS: f64 = 50.0;

    /// Pause before recentering so the map animation can settle
    pub const RECENTER_DELAY_SECS: u64 = 3;

    /// Side of the annotation callout image, in pixels
    pub const CALLOUT_IMAGE_SIZE: u32 = 50;

    /// Largest thumbnail edge rendered, in pixels
    pub const MAX_THUMBNAIL_SIZE: u32 = 1024;
}
