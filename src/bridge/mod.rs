//! Place-to-map bridge
//!
//! Connects saved places to the map providers: resolves a place's free-text
//! location to coordinates, follows the device position, computes routes to
//! the place, and turns the map center back into an address while the user
//! positions a pin.
//!
//! Provider failures never escape as errors from the `Option`-returning
//! operations; they are logged and the operation reports "nothing".
//!
//! Cancellation discipline:
//! - every new route request first cancels all in-flight route requests and
//!   clears the rendered overlays;
//! - every new reverse geocode cancels the single in-flight one.

pub mod screen;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::MapConfig;
use crate::coord::distance::moved_beyond;
use crate::coord::{BoundingBox, Coordinates, MapRegion};
use crate::error::{Error, Result};
use crate::geo::GeoBackend;
use crate::location::{AuthorizationStatus, LocationProvider};
use crate::place::PlaceFields;
use crate::routing::{Route, RouteBackend, RouteRequest};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where the bridge stands with respect to device location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeState {
    Unauthorized,
    AwaitingPermission,
    Authorized,
    /// Authorized and receiving continuous position updates
    Tracking,
}

/// A pin for a saved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub coords: Coordinates,
}

/// Every candidate route of one request plus the viewport fitting them all
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSet {
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<BoundingBox>,
}

impl RouteSet {
    pub fn new(routes: Vec<Route>) -> Self {
        let viewport = routes
            .iter()
            .filter_map(Route::bounding_box)
            .reduce(|acc, b| acc.union(&b));
        Self { routes, viewport }
    }
}

struct BridgeInner {
    state: BridgeState,
    place_coordinate: Option<Coordinates>,
    last_known_center: Option<Coordinates>,
    next_route_id: u64,
    route_requests: Vec<(u64, CancellationToken)>,
    overlays: Vec<Route>,
    reverse_request: Option<CancellationToken>,
}

/// Bridge between places and the geocoding, routing and location providers
pub struct MapBridge<G, R, L> {
    geocoder: G,
    router: R,
    location: L,
    settings: MapConfig,
    inner: Mutex<BridgeInner>,
}

impl<G, R, L> MapBridge<G, R, L>
where
    G: GeoBackend,
    R: RouteBackend,
    L: LocationProvider,
{
    pub fn new(geocoder: G, router: R, location: L, settings: MapConfig) -> Self {
        Self {
            geocoder,
            router,
            location,
            settings,
            inner: Mutex::new(BridgeInner {
                state: BridgeState::Unauthorized,
                place_coordinate: None,
                last_known_center: None,
                next_route_id: 0,
                route_requests: Vec::new(),
                overlays: Vec::new(),
                reverse_request: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BridgeInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> BridgeState {
        self.lock().state
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn settings(&self) -> &MapConfig {
        &self.settings
    }

    // ---- permission ----

    /// Check platform location services, then the app's authorization
    ///
    /// Permission is only requested when services are enabled.
    pub async fn check_location_services(&self) -> Result<BridgeState> {
        if !self.location.services_enabled() {
            warn!("Location services are disabled");
            self.lock().state = BridgeState::Unauthorized;
            return Err(Error::LocationServiceDisabled);
        }

        self.apply_authorization(self.location.authorization_status())
            .await
    }

    /// Act on an authorization status, requesting permission if undetermined
    pub async fn apply_authorization(&self, status: AuthorizationStatus) -> Result<BridgeState> {
        if status == AuthorizationStatus::NotDetermined {
            self.lock().state = BridgeState::AwaitingPermission;
            debug!("Requesting location permission");
            let answer = self.location.request_authorization().await;
            return self.on_authorization_changed(answer);
        }

        self.on_authorization_changed(status)
    }

    /// Platform callback for an authorization change
    pub fn on_authorization_changed(&self, status: AuthorizationStatus) -> Result<BridgeState> {
        let mut inner = self.lock();

        match status {
            AuthorizationStatus::AuthorizedWhenInUse | AuthorizationStatus::AuthorizedAlways => {
                if inner.state != BridgeState::Tracking {
                    inner.state = BridgeState::Authorized;
                }
                Ok(inner.state)
            }
            AuthorizationStatus::NotDetermined => {
                inner.state = BridgeState::AwaitingPermission;
                Ok(inner.state)
            }
            AuthorizationStatus::Denied => {
                warn!("Location permission denied");
                inner.state = BridgeState::Unauthorized;
                Err(Error::LocationPermissionDenied)
            }
            AuthorizationStatus::Restricted => {
                warn!("Location permission restricted");
                inner.state = BridgeState::Unauthorized;
                Err(Error::LocationPermissionRestricted)
            }
        }
    }

    // ---- device position ----

    /// Region of the configured size centered on the device
    pub async fn show_user_location(&self) -> Option<MapRegion> {
        let here = self.location.current_location().await?;
        Some(MapRegion::around(here, self.settings.region_meters))
    }

    /// Wait for the map animation to settle, then recenter on the device
    pub async fn recenter_after_settle(&self) -> Option<MapRegion> {
        tokio::time::sleep(self.settings.recenter_delay()).await;
        self.show_user_location().await
    }

    /// Whether the map center drifted far enough from the last known center
    /// to warrant a refresh
    pub fn track_movement(&self, current_center: Coordinates, last_known: Coordinates) -> bool {
        moved_beyond(
            current_center,
            last_known,
            self.settings.tracking_threshold_meters,
        )
    }

    pub fn last_known_center(&self) -> Option<Coordinates> {
        self.lock().last_known_center
    }

    pub fn set_last_known_center(&self, center: Coordinates) {
        self.lock().last_known_center = Some(center);
    }

    // ---- forward geocoding ----

    /// Resolve a free-text address to the first placemark's coordinates
    ///
    /// On failure the previously resolved target is kept.
    pub async fn resolve_coordinates(&self, address: &str) -> Option<Coordinates> {
        let placemarks = match self.geocoder.geocode(address).await {
            Ok(placemarks) => placemarks,
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, e);
                return None;
            }
        };

        let Some(first) = placemarks.into_iter().next() else {
            debug!("No placemark for '{}'", address);
            return None;
        };

        self.lock().place_coordinate = Some(first.coords);
        Some(first.coords)
    }

    /// Resolve a place's location into a map pin
    pub async fn setup_placemark(&self, place: &PlaceFields) -> Option<Annotation> {
        let location = place.location.as_deref()?;
        let coords = self.resolve_coordinates(location).await?;

        Some(Annotation {
            title: place.name.clone(),
            subtitle: place.category.clone(),
            coords,
        })
    }

    /// Last successfully resolved destination
    pub fn target(&self) -> Option<Coordinates> {
        self.lock().place_coordinate
    }

    // ---- routing ----

    /// Directions from the device to the resolved target
    ///
    /// Switches on continuous location updates and remembers the start as
    /// the last known center.
    pub async fn directions(&self) -> Result<RouteSet> {
        let Some(from) = self.location.current_location().await else {
            warn!("Cannot route: device position unknown");
            return Err(Error::PositionUnavailable);
        };

        self.location.start_updating_location();
        {
            let mut inner = self.lock();
            if inner.state == BridgeState::Authorized {
                inner.state = BridgeState::Tracking;
            }
            inner.last_known_center = Some(from);
        }

        let Some(to) = self.target() else {
            warn!("Cannot route: destination not resolved");
            return Err(Error::AddressNotFound("destination".to_string()));
        };

        self.route_between(from, to)
            .await
            .ok_or(Error::RouteUnavailable)
    }

    /// `directions` with every failure folded into `None`
    pub async fn compute_route(&self) -> Option<RouteSet> {
        self.directions().await.ok()
    }

    /// Driving routes with alternates between two points
    ///
    /// Resets previous routes first. Yields `None` on provider error, on an
    /// empty answer, or when a later request cancels this one.
    pub async fn route_between(&self, from: Coordinates, to: Coordinates) -> Option<RouteSet> {
        let (id, token) = self.begin_route();

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!("Route request {} cancelled", id);
                return None;
            }
            result = self.router.directions(RouteRequest::driving(from, to)) => result,
        };

        let mut inner = self.lock();
        inner.route_requests.retain(|(rid, _)| *rid != id);

        if token.is_cancelled() {
            debug!("Route request {} cancelled after completion", id);
            return None;
        }

        let routes = match result {
            Ok(routes) if !routes.is_empty() => routes,
            Ok(_) => {
                warn!("No route from {} to {}", from, to);
                return None;
            }
            Err(e) => {
                warn!("Route request failed: {}", e);
                return None;
            }
        };

        for route in &routes {
            info!(
                "Route: {} km, {:.0} s",
                route.distance_km(),
                route.expected_travel_time.as_secs_f64()
            );
        }

        inner.overlays.extend(routes.iter().cloned());
        Some(RouteSet::new(routes))
    }

    /// Cancel every in-flight route request and clear rendered overlays
    pub fn reset_routes(&self) {
        let mut inner = self.lock();
        Self::cancel_routes(&mut inner);
    }

    fn cancel_routes(inner: &mut BridgeInner) {
        for (_, token) in inner.route_requests.drain(..) {
            token.cancel();
        }
        inner.overlays.clear();
    }

    fn begin_route(&self) -> (u64, CancellationToken) {
        let mut inner = self.lock();
        Self::cancel_routes(&mut inner);

        let id = inner.next_route_id;
        inner.next_route_id += 1;
        let token = CancellationToken::new();
        inner.route_requests.push((id, token.clone()));
        (id, token)
    }

    /// Routes currently drawn on the map
    pub fn overlays(&self) -> Vec<Route> {
        self.lock().overlays.clone()
    }

    // ---- reverse geocoding ----

    /// Short address under `coords`
    ///
    /// The last request wins: issuing one cancels the one in flight, which
    /// then yields `None`.
    pub async fn reverse_geocode(&self, coords: Coordinates) -> Option<String> {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().reverse_request.replace(token.clone()) {
            previous.cancel();
        }

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!("Reverse geocode of {} cancelled", coords);
                return None;
            }
            result = self.geocoder.reverse_geocode(coords) => result,
        };

        {
            let mut inner = self.lock();
            if token.is_cancelled() {
                return None;
            }
            inner.reverse_request = None;
        }

        match result {
            Ok(placemarks) => Some(
                placemarks
                    .first()
                    .map(|p| p.short_address())
                    .unwrap_or_default(),
            ),
            Err(e) => {
                warn!("Reverse geocoding {} failed: {}", coords, e);
                None
            }
        }
    }
}
