//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default listing sort key
pub const DEFAULT_SORT: &str = "date";

/// Default listing direction
pub const DEFAULT_ASCENDING: bool = true;

/// Default listing output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default authorization answer of the configured location provider
pub const DEFAULT_AUTHORIZATION: &str = "authorized_when_in_use";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Catalog file name (inside the data directory)
pub const CATALOG_FILE_NAME: &str = "places.json";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "my-places";
