//! Device location and permission
//!
//! `LocationProvider` is what the map bridge needs from the platform: whether
//! location services are on, what the app is authorized to do, a way to ask
//! for permission, and the current device position.
//!
//! `DeviceLocation` is the provider used by the CLI and server. Its position
//! comes either from configured coordinates or from IP geolocation, and its
//! permission answers come from configuration.

pub mod ip;

use crate::config::LocationConfig;
use crate::coord::Coordinates;
use ip::IpLocator;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Authorization the platform reports for this app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::AuthorizedAlways | Self::AuthorizedWhenInUse)
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotDetermined => "not_determined",
            Self::Restricted => "restricted",
            Self::Denied => "denied",
            Self::AuthorizedAlways => "authorized_always",
            Self::AuthorizedWhenInUse => "authorized_when_in_use",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AuthorizationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "not_determined" => Ok(Self::NotDetermined),
            "restricted" => Ok(Self::Restricted),
            "denied" => Ok(Self::Denied),
            "authorized_always" | "always" => Ok(Self::AuthorizedAlways),
            "authorized_when_in_use" | "when_in_use" | "authorized" => {
                Ok(Self::AuthorizedWhenInUse)
            }
            _ => Err(format!("Unknown authorization status: {}", s)),
        }
    }
}

/// Platform location subsystem
pub trait LocationProvider: Send + Sync {
    /// Whether location services are switched on at the platform level
    fn services_enabled(&self) -> bool;

    /// Current authorization of this app
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for when-in-use permission; resolves with their answer
    fn request_authorization(&self) -> impl std::future::Future<Output = AuthorizationStatus> + Send;

    /// Current device position, if one can be determined
    fn current_location(&self) -> impl std::future::Future<Output = Option<Coordinates>> + Send;

    /// Switch to continuous position updates
    fn start_updating_location(&self);
}

/// Where a `DeviceLocation` gets its position from
#[derive(Debug, Clone)]
pub enum PositionSource {
    Fixed(Coordinates),
    Ip(IpLocator),
}

/// Configured location provider
#[derive(Debug)]
pub struct DeviceLocation {
    source: PositionSource,
    services_enabled: bool,
    status: Mutex<AuthorizationStatus>,
    /// Answer given when permission is requested
    grant: AuthorizationStatus,
    updating: AtomicBool,
}

impl DeviceLocation {
    pub fn new(source: PositionSource) -> Self {
        Self {
            source,
            services_enabled: true,
            status: Mutex::new(AuthorizationStatus::AuthorizedWhenInUse),
            grant: AuthorizationStatus::AuthorizedWhenInUse,
            updating: AtomicBool::new(false),
        }
    }

    /// A device pinned at `coords`
    pub fn fixed(coords: Coordinates) -> Self {
        Self::new(PositionSource::Fixed(coords))
    }

    /// Build from the `[location]` config section
    pub fn from_config(config: &LocationConfig) -> Self {
        let source = match (config.lat, config.lng) {
            (Some(lat), Some(lng)) => PositionSource::Fixed(Coordinates::new(lat, lng)),
            _ => PositionSource::Ip(IpLocator::new()),
        };

        let status = config.authorization.parse().unwrap_or_else(|e| {
            warn!("{}; treating location as not determined", e);
            AuthorizationStatus::NotDetermined
        });

        Self::new(source)
            .with_services_enabled(config.services_enabled)
            .with_status(status)
    }

    pub fn with_services_enabled(mut self, enabled: bool) -> Self {
        self.services_enabled = enabled;
        self
    }

    pub fn with_status(self, status: AuthorizationStatus) -> Self {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        self
    }

    /// Answer the user gives when asked for permission
    pub fn granting(mut self, answer: AuthorizationStatus) -> Self {
        self.grant = answer;
        self
    }

    /// Whether continuous updates were switched on
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Relaxed)
    }

    pub fn source(&self) -> &PositionSource {
        &self.source
    }
}

impl LocationProvider for DeviceLocation {
    fn services_enabled(&self) -> bool {
        self.services_enabled
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_authorization(&self) -> AuthorizationStatus {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status == AuthorizationStatus::NotDetermined {
            *status = self.grant;
        }
        debug!("Location authorization answered: {}", *status);
        *status
    }

    async fn current_location(&self) -> Option<Coordinates> {
        if !self.authorization_status().is_authorized() {
            return None;
        }

        match &self.source {
            PositionSource::Fixed(coords) => Some(*coords),
            PositionSource::Ip(locator) => match locator.locate().await {
                Ok(location) => Some(location.coords),
                Err(e) => {
                    warn!("Could not determine device position: {}", e);
                    None
                }
            },
        }
    }

    fn start_updating_location(&self) {
        self.updating.store(true, Ordering::Relaxed);
    }
}
