//! Geographical calculations over (latitude, longitude) pairs
//!
//! Two distance computations live here and are deliberately separate:
//! [`haversine_distance_km`] is the great-circle distance, while
//! [`planar_distance_km`] is the flat degree-space approximation used by the
//! distance histogram. They disagree away from the equator; do not swap one
//! for the other without checking the consumers.

use crate::app::models::Coordinates;
use crate::constants::{EARTH_RADIUS_KM, KM_PER_DEGREE};

/// Great-circle distance in kilometres between two (latitude, longitude) points
pub fn haversine_distance_km(point1: (f64, f64), point2: (f64, f64)) -> f64 {
    let (lat1, lon1) = (point1.0.to_radians(), point1.1.to_radians());
    let (lat2, lon2) = (point2.0.to_radians(), point2.1.to_radians());

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance between the pickup and dropoff of a trip
pub fn trip_haversine_km(coordinates: &Coordinates) -> f64 {
    haversine_distance_km(coordinates.pickup(), coordinates.dropoff())
}

/// Euclidean distance in degree space scaled by 111.32 km per degree
pub fn planar_distance_km(coordinates: &Coordinates) -> f64 {
    let d_lon = coordinates.dropoff_longitude - coordinates.pickup_longitude;
    let d_lat = coordinates.dropoff_latitude - coordinates.pickup_latitude;
    (d_lon.powi(2) + d_lat.powi(2)).sqrt() * KM_PER_DEGREE
}

/// Round a distance to one decimal place, half away from zero
pub fn round_to_tenth(distance_km: f64) -> f64 {
    (distance_km * 10.0).round() / 10.0
}

/// True when latitude is within [-90, 90] and longitude within [-180, 180]
pub fn is_valid_coordinates(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manhattan_trip() -> Coordinates {
        Coordinates {
            pickup_longitude: -73.9876,
            pickup_latitude: 40.7545,
            dropoff_longitude: -74.0065,
            dropoff_latitude: 40.7406,
        }
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_distance_km((40.0, -73.0), (40.0, -73.0)), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        // One degree of latitude is ~111.19 km on a 6371 km sphere
        let distance = haversine_distance_km((0.0, 0.0), (1.0, 0.0));
        assert!((distance - 111.195).abs() < 0.01, "got {}", distance);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = (40.7545, -73.9876);
        let b = (40.7406, -74.0065);
        let forward = haversine_distance_km(a, b);
        let backward = haversine_distance_km(b, a);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_planar_and_haversine_disagree() {
        let trip = manhattan_trip();
        let planar = planar_distance_km(&trip);
        let great_circle = trip_haversine_km(&trip);

        // Planar ignores the cos(latitude) shrink of longitude degrees
        assert!((planar - 2.611).abs() < 0.01, "got {}", planar);
        assert!((great_circle - 2.22).abs() < 0.05, "got {}", great_circle);
        assert!(planar > great_circle);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(2.6114), 2.6);
        assert_eq!(round_to_tenth(2.66), 2.7);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(is_valid_coordinates(90.0, 180.0));
        assert!(is_valid_coordinates(-90.0, -180.0));
        assert!(!is_valid_coordinates(90.1, 0.0));
        assert!(!is_valid_coordinates(0.0, -180.5));
    }
}
