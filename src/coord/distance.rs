//! Great-circle distance
//!
//! Haversine distance between coordinates and the movement threshold used
//! to decide when a tracked map should recenter.

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::Coordinates;
use std::f64::consts::PI;

/// Calculate the distance between two points in meters (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in meters
pub fn haversine_distance(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat * PI / 180.0;
    let lat2 = p2.lat * PI / 180.0;
    let delta_lat = (p2.lat - p1.lat) * PI / 180.0;
    let delta_lng = (p2.lng - p1.lng) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// True only when the points are strictly farther apart than `threshold_meters`
pub fn moved_beyond(current: Coordinates, last: Coordinates, threshold_meters: f64) -> bool {
    haversine_distance(current, last) > threshold_meters
}

/// Point `meters` due north of `origin`
///
/// Moves along a meridian, so the haversine distance back to `origin` is
/// exactly `meters` up to floating point.
pub fn offset_north(origin: Coordinates, meters: f64) -> Coordinates {
    let delta_lat = meters / EARTH_RADIUS_METERS * 180.0 / PI;
    Coordinates::new(origin.lat + delta_lat, origin.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_distance() {
        // About 1 degree of latitude = ~111km
        let nyc = Coordinates::new(40.7128, -74.0060);
        let nearby = Coordinates::new(41.7128, -74.0060);

        let distance = haversine_distance(nyc, nearby);

        assert!(
            (distance - 111_000.0).abs() < 1000.0,
            "Distance {} should be approximately 111000",
            distance
        );
    }

    #[test]
    fn test_haversine_same_point() {
        let p = Coordinates::new(55.75, 37.62);
        assert_eq!(haversine_distance(p, p), 0.0);
    }

    #[test]
    fn test_offset_north_round_trips_distance() {
        let origin = Coordinates::new(50.45, 30.52);
        let moved = offset_north(origin, 120.0);
        assert_relative_eq!(haversine_distance(origin, moved), 120.0, epsilon = 1e-6);
    }

    #[test]
    fn test_moved_beyond_threshold() {
        let origin = Coordinates::new(50.45, 30.52);

        assert!(!moved_beyond(offset_north(origin, 10.0), origin, 50.0));
        assert!(moved_beyond(offset_north(origin, 50.01), origin, 50.0));
        assert!(moved_beyond(offset_north(origin, 500.0), origin, 50.0));
    }

    #[test]
    fn test_moved_beyond_is_strict() {
        let origin = Coordinates::new(0.0, 0.0);
        let exact = haversine_distance(origin, offset_north(origin, 50.0));
        assert!(!moved_beyond(offset_north(origin, 50.0), origin, exact));
    }
}
