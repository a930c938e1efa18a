//! Special-location detection.
//!
//! A journey whose pickup or dropoff falls inside a special location's radius
//! is priced from that location's rate card when the vehicle has one.

use serde::{Deserialize, Serialize};

use super::calculators::AirportLeg;
use super::models::SpecialLocation;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Great-circle distance between two points in kilometres
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

impl SpecialLocation {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// Detection radius, clamped to the supported 1-50km range
    pub fn effective_radius_km(&self) -> f64 {
        self.radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_RADIUS_KM)
            .clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        self.coordinates()
            .map(|centre| haversine_km(point, centre) <= self.effective_radius_km())
            .unwrap_or(false)
    }
}

/// Special locations found at either end of a journey
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationMatch<'a> {
    pub pickup: Option<&'a SpecialLocation>,
    pub dropoff: Option<&'a SpecialLocation>,
}

impl<'a> LocationMatch<'a> {
    /// Location whose rate card applies: the pickup match wins over the dropoff
    pub fn pricing_location(&self) -> Option<&'a SpecialLocation> {
        self.pickup.or(self.dropoff)
    }

    pub fn leg(&self) -> AirportLeg {
        AirportLeg {
            is_pickup: self.pickup.is_some(),
            is_dropoff: self.dropoff.is_some(),
        }
    }
}

/// Find the first active location containing each end of the journey
pub fn detect_special_locations(
    locations: &[SpecialLocation],
    pickup: Coordinates,
    dropoff: Coordinates,
) -> LocationMatch<'_> {
    let mut found = LocationMatch::default();

    for location in locations.iter().filter(|l| l.is_active) {
        if found.pickup.is_none() && location.contains(pickup) {
            found.pickup = Some(location);
        }
        if found.dropoff.is_none() && location.contains(dropoff) {
            found.dropoff = Some(location);
        }
        if found.pickup.is_some() && found.dropoff.is_some() {
            break;
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::LocationType;
    use uuid::Uuid;

    const HEATHROW: Coordinates = Coordinates {
        lat: 51.4700,
        lng: -0.4543,
    };
    const WEMBLEY: Coordinates = Coordinates {
        lat: 51.5560,
        lng: -0.2796,
    };
    const CENTRAL_LONDON: Coordinates = Coordinates {
        lat: 51.5074,
        lng: -0.1278,
    };

    fn location(name: &str, at: Coordinates, radius_km: Option<f64>) -> SpecialLocation {
        SpecialLocation {
            id: Uuid::new_v4(),
            name: name.to_string(),
            iata_code: None,
            location_type: LocationType::Airport,
            latitude: Some(at.lat),
            longitude: Some(at.lng),
            zone: "Entire UK Cover".to_string(),
            radius_km,
            is_active: true,
        }
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let a = Coordinates { lat: 0.0, lng: 0.0 };
        let b = Coordinates { lat: 1.0, lng: 0.0 };
        assert!((haversine_km(a, b) - 111.195).abs() < 0.01);
        assert_eq!(haversine_km(a, a), 0.0);
    }

    #[test]
    fn test_haversine_heathrow_to_central_london() {
        let km = haversine_km(HEATHROW, CENTRAL_LONDON);
        assert!(km > 22.0 && km < 24.0, "got {}", km);
    }

    #[test]
    fn test_radius_defaults_and_clamps() {
        assert_eq!(location("a", HEATHROW, None).effective_radius_km(), 5.0);
        assert_eq!(location("b", HEATHROW, Some(0.2)).effective_radius_km(), 1.0);
        assert_eq!(location("c", HEATHROW, Some(120.0)).effective_radius_km(), 50.0);
        assert_eq!(location("d", HEATHROW, Some(8.0)).effective_radius_km(), 8.0);
    }

    #[test]
    fn test_location_without_coordinates_matches_nothing() {
        let mut loc = location("nowhere", HEATHROW, Some(50.0));
        loc.latitude = None;
        assert!(!loc.contains(HEATHROW));
    }

    #[test]
    fn test_detect_pickup_at_airport() {
        let locations = vec![
            location("Wembley", WEMBLEY, Some(1.5)),
            location("Heathrow", HEATHROW, Some(8.0)),
        ];
        let near_terminal = Coordinates {
            lat: 51.4720,
            lng: -0.4890,
        };

        let found = detect_special_locations(&locations, near_terminal, CENTRAL_LONDON);

        assert_eq!(found.pickup.map(|l| l.name.as_str()), Some("Heathrow"));
        assert!(found.dropoff.is_none());
        assert!(found.pricing_location().is_some());
        assert_eq!(
            found.leg(),
            AirportLeg {
                is_pickup: true,
                is_dropoff: false
            }
        );
    }

    #[test]
    fn test_pickup_location_wins_for_pricing() {
        let locations = vec![
            location("Heathrow", HEATHROW, Some(8.0)),
            location("Wembley", WEMBLEY, Some(1.5)),
        ];

        let found = detect_special_locations(&locations, WEMBLEY, HEATHROW);

        assert_eq!(found.pickup.map(|l| l.name.as_str()), Some("Wembley"));
        assert_eq!(found.dropoff.map(|l| l.name.as_str()), Some("Heathrow"));
        assert_eq!(
            found.pricing_location().map(|l| l.name.as_str()),
            Some("Wembley")
        );
    }

    #[test]
    fn test_inactive_locations_ignored() {
        let mut heathrow = location("Heathrow", HEATHROW, Some(8.0));
        heathrow.is_active = false;

        let locations = [heathrow];
        let found = detect_special_locations(&locations, HEATHROW, CENTRAL_LONDON);
        assert!(found.dropoff.is_none());
        assert!(found.pricing_location().is_none());
    }
}
