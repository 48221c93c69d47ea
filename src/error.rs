//! Error types for my-places

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Remediation text shown for every location-service alert
const LOCATION_SETTINGS_HINT: &str =
    "Please enable the services into Settings -> Privacy -> Location Services";

/// Main error type for my-places operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Place not found: {0}")]
    PlaceNotFound(Uuid),

    #[error("Invalid place: {0}")]
    InvalidPlace(String),

    #[error("Invalid rating: {0} (must be between 0 and 5)")]
    InvalidRating(f64),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Image decode failure: {0}")]
    ImageDecode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Location services are disabled")]
    LocationServiceDisabled,

    #[error("Location permission denied")]
    LocationPermissionDenied,

    #[error("Location permission restricted")]
    LocationPermissionRestricted,

    #[error("Current position unavailable")]
    PositionUnavailable,

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Route unavailable")]
    RouteUnavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),

    #[error("Routing error: {0}")]
    Routing(String),
}

/// A user-facing modal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl Error {
    /// The alert a user should see for this error, if it is user-facing
    pub fn alert(&self) -> Option<Alert> {
        match self {
            Error::LocationServiceDisabled => Some(Alert::new(
                "Location Services are Disabled",
                LOCATION_SETTINGS_HINT,
            )),
            Error::LocationPermissionDenied => Some(Alert::new(
                "Location Services are Denied",
                LOCATION_SETTINGS_HINT,
            )),
            Error::LocationPermissionRestricted => Some(Alert::new(
                "Location Services are Restricted",
                LOCATION_SETTINGS_HINT,
            )),
            Error::PositionUnavailable => Some(Alert::new("Error", "Location not found")),
            Error::AddressNotFound(_) => Some(Alert::new("Error", "Destination not found")),
            Error::RouteUnavailable => Some(Alert::new("Error", "Directions are unavailable")),
            _ => None,
        }
    }
}

/// Result type alias for my-places operations
pub type Result<T> = std::result::Result<T, Error>;
