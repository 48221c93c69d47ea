//! Map screen flow
//!
//! Drives a `MapBridge` the way the map screen does: either the user drags
//! the map to pin an address for the editor, or a saved place is shown and
//! directions to it can be requested.

use super::{Annotation, BridgeState, MapBridge, RouteSet};
use crate::constants::map::CALLOUT_IMAGE_SIZE;
use crate::coord::{Coordinates, MapRegion};
use crate::error::{Alert, Error, Result};
use crate::geo::GeoBackend;
use crate::location::LocationProvider;
use crate::place::{photo, PlaceFields};
use crate::routing::RouteBackend;
use tracing::warn;

/// What the screen was opened for
#[derive(Debug, Clone, PartialEq)]
pub enum MapMode {
    /// Pick an address by moving the map under a fixed pin
    PinLocation,
    /// Show a saved place and offer directions to it
    ShowPlace(PlaceFields),
}

/// State of one open map screen
pub struct MapScreen<G, R, L> {
    bridge: MapBridge<G, R, L>,
    mode: MapMode,
    address: String,
    annotation: Option<Annotation>,
    callout_image: Option<Vec<u8>>,
    region: Option<MapRegion>,
    previous_location: Option<Coordinates>,
    alerts: Vec<Alert>,
}

impl<G, R, L> MapScreen<G, R, L>
where
    G: GeoBackend,
    R: RouteBackend,
    L: LocationProvider,
{
    pub fn new(bridge: MapBridge<G, R, L>, mode: MapMode) -> Self {
        Self {
            bridge,
            mode,
            address: String::new(),
            annotation: None,
            callout_image: None,
            region: None,
            previous_location: None,
            alerts: Vec::new(),
        }
    }

    /// Check location access and lay out the initial map
    pub async fn open(&mut self) {
        let state = match self.bridge.check_location_services().await {
            Ok(state) => Some(state),
            Err(e) => {
                self.alert(&e);
                None
            }
        };

        match &self.mode {
            MapMode::PinLocation => {
                if state == Some(BridgeState::Authorized) {
                    self.region = self.bridge.show_user_location().await;
                }
            }
            MapMode::ShowPlace(place) => {
                self.annotation = self.bridge.setup_placemark(place).await;
                self.callout_image = place.image.as_deref().and_then(|bytes| {
                    photo::thumbnail(bytes, CALLOUT_IMAGE_SIZE)
                        .inspect_err(|e| warn!("No callout image: {}", e))
                        .ok()
                });
            }
        }
    }

    /// Map came to rest at `center`
    ///
    /// Refreshes the address label. When showing a place after directions
    /// were requested, the map also recenters on the user after the settle
    /// delay.
    pub async fn region_did_change(&mut self, center: Coordinates) {
        let recenter = matches!(self.mode, MapMode::ShowPlace(_)) && self.previous_location.is_some();

        let (address, region) = tokio::join!(self.bridge.reverse_geocode(center), async {
            if recenter {
                self.bridge.recenter_after_settle().await
            } else {
                None
            }
        });

        if let Some(address) = address {
            self.address = address;
        }
        if region.is_some() {
            self.region = region;
        }
    }

    /// Address picked in `PinLocation` mode, handed back to the editor
    pub fn done(&self) -> Option<String> {
        match self.mode {
            MapMode::PinLocation => Some(self.address.clone()),
            MapMode::ShowPlace(_) => None,
        }
    }

    /// Directions from the user to the shown place
    pub async fn go(&mut self) -> Result<RouteSet> {
        match self.bridge.directions().await {
            Ok(routes) => {
                self.previous_location = self.bridge.last_known_center();
                Ok(routes)
            }
            Err(e) => {
                self.alert(&e);
                Err(e)
            }
        }
    }

    /// New device position while tracking
    ///
    /// Returns true when the user moved past the tracking threshold and the
    /// map was recentered.
    pub async fn location_updated(&mut self, center: Coordinates) -> bool {
        let Some(previous) = self.previous_location else {
            return false;
        };

        if !self.bridge.track_movement(center, previous) {
            return false;
        }

        self.previous_location = Some(center);
        self.bridge.set_last_known_center(center);

        if let Some(region) = self.bridge.recenter_after_settle().await {
            self.region = Some(region);
        }
        true
    }

    fn alert(&mut self, error: &Error) {
        if let Some(alert) = error.alert() {
            if !self.alerts.contains(&alert) {
                self.alerts.push(alert);
            }
        }
    }

    pub fn bridge(&self) -> &MapBridge<G, R, L> {
        &self.bridge
    }

    pub fn mode(&self) -> &MapMode {
        &self.mode
    }

    /// Address label under the pin
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        self.annotation.as_ref()
    }

    /// PNG shown in the annotation callout
    pub fn callout_image(&self) -> Option<&[u8]> {
        self.callout_image.as_deref()
    }

    pub fn region(&self) -> Option<MapRegion> {
        self.region
    }

    /// Alerts raised so far, each shown once
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}
