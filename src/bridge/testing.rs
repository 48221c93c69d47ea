//! Scripted providers for bridge and screen tests

use super::MapBridge;
use crate::config::MapConfig;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, Placemark};
use crate::location::DeviceLocation;
use crate::routing::{Route, RouteBackend, RouteRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HERE: Coordinates = Coordinates { lat: 48.8566, lng: 2.3522 };
pub const PARIS: Coordinates = Coordinates { lat: 48.8540, lng: 2.3330 };

pub type TestBridge = MapBridge<StubGeocoder, StubRouter, DeviceLocation>;

/// Geocoder answering from fixed lists, with optional per-call delays
#[derive(Default)]
pub struct StubGeocoder {
    forward: Vec<Placemark>,
    reverse: Vec<Placemark>,
    reverse_delays: Mutex<VecDeque<Duration>>,
    forward_fails: AtomicBool,
    reverse_fails: AtomicBool,
}

impl StubGeocoder {
    pub fn forward(placemarks: Vec<Placemark>) -> Self {
        Self {
            forward: placemarks,
            ..Self::default()
        }
    }

    pub fn reverse(placemarks: Vec<Placemark>) -> Self {
        Self {
            reverse: placemarks,
            ..Self::default()
        }
    }

    pub fn with_reverse(mut self, placemarks: Vec<Placemark>) -> Self {
        self.reverse = placemarks;
        self
    }

    pub fn with_reverse_delays(self, delays: Vec<Duration>) -> Self {
        *self.reverse_delays.lock().unwrap() = delays.into();
        self
    }

    pub fn fail_forward(&self) {
        self.forward_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_reverse(&self) {
        self.reverse_fails.store(true, Ordering::SeqCst);
    }
}

impl GeoBackend for StubGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Vec<Placemark>> {
        if self.forward_fails.load(Ordering::SeqCst) {
            return Err(Error::Geo("geocoder offline".to_string()));
        }
        Ok(self.forward.clone())
    }

    async fn reverse_geocode(&self, _coords: Coordinates) -> Result<Vec<Placemark>> {
        let delay = self.reverse_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.reverse_fails.load(Ordering::SeqCst) {
            return Err(Error::Geo("geocoder offline".to_string()));
        }
        Ok(self.reverse.clone())
    }
}

/// Router answering a fixed list, with optional per-call delays
#[derive(Default)]
pub struct StubRouter {
    routes: Vec<Route>,
    fails: bool,
    delays: Mutex<VecDeque<Duration>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<RouteRequest>>,
}

impl StubRouter {
    pub fn answering(routes: Vec<Route>) -> Self {
        Self {
            routes,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Self::default()
        }
    }

    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RouteRequest> {
        *self.last_request.lock().unwrap()
    }
}

impl RouteBackend for StubRouter {
    async fn directions(&self, request: RouteRequest) -> Result<Vec<Route>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fails {
            return Err(Error::Routing("router offline".to_string()));
        }
        Ok(self.routes.clone())
    }
}

pub fn device_here() -> DeviceLocation {
    DeviceLocation::fixed(HERE)
}

/// Map settings with no settle pause
pub fn quick_settings() -> MapConfig {
    MapConfig {
        recenter_delay_secs: 0,
        ..MapConfig::default()
    }
}

pub fn bridge_with(geocoder: StubGeocoder, router: StubRouter, device: DeviceLocation) -> TestBridge {
    MapBridge::new(geocoder, router, device, quick_settings())
}

pub fn sample_route(from: Coordinates, to: Coordinates) -> Route {
    Route {
        polyline: vec![from, to],
        distance_meters: 3249.0,
        expected_travel_time: Duration::from_secs(420),
    }
}
