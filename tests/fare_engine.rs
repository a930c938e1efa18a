//! End-to-end fare scenarios through the public pricing API

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use chauffeur_fares::pricing::calculators::{RateCard, RequestedExtras};
use chauffeur_fares::pricing::models::{
    AirportPricingConfig, DistanceTier, HourlyConfig, LocationType, PointToPointConfig,
    PricingConfig, PricingKind, SpecialLocation,
};
use chauffeur_fares::pricing::{
    calculate_total_price, detect_special_locations, quick_estimate, quote, Coordinates,
    JourneyRequest,
};

fn executive_saloon() -> PricingConfig {
    let mut config = PricingConfig::new(Uuid::new_v4(), PricingKind::P2p);
    config.point_to_point = Some(PointToPointConfig {
        is_active: true,
        distance_tiers: vec![
            DistanceTier::fixed(dec!(0), dec!(8), dec!(74.50)),
            DistanceTier::per_mile(dec!(8), dec!(30), dec!(2.50)),
        ],
        after_distance_threshold: dec!(30),
        after_distance_price_per_mile: dec!(3.00),
    });
    config.hourly = Some(HourlyConfig {
        is_active: true,
        hourly_rate: dec!(45),
        minimum_hours: dec!(4),
        additional_hour_charge: dec!(50),
        miles_included: dec!(40),
        excess_mileage_charge: dec!(1.50),
    });
    config.extras.extra_stop_price = dec!(10);
    config.extras.child_seat_price = dec!(7.50);
    config.extras.congestion_charge = dec!(15);
    config
}

#[test]
fn long_p2p_journey_with_extras_and_round_off() {
    let mut config = executive_saloon();
    config.price_round_off = true;

    let request = JourneyRequest {
        extras: RequestedExtras {
            extra_stops: 2,
            child_seats: 1,
            include_congestion: true,
        },
        ..JourneyRequest::point_to_point(dec!(35))
    };

    let price = calculate_total_price(&config, &request);

    // 74.50 + 22 * 2.50 + 5 * 3.00
    assert_eq!(price.journey.total(), dec!(144.50));
    assert_eq!(price.extras.total, dec!(42.50));
    assert_eq!(price.subtotal, dec!(187.00));
    assert_eq!(price.finish.vat_amount, dec!(37.40));
    assert_eq!(price.total(), dec!(224));
    assert!(price
        .narrative()
        .contains("After 30 miles: 5.0 × £3.00 = £15.00"));
}

#[test]
fn hourly_booking_over_minimum() {
    let mut config = executive_saloon();
    config.pricing_type = PricingKind::Hourly;
    config.display_vat_inclusive = false;

    let price = calculate_total_price(&config, &JourneyRequest::hourly(dec!(6), dec!(50)));

    // 4 * 45 + 2 * 50 + 10 * 1.50
    assert_eq!(price.total(), dec!(295.00));
    assert_eq!(price.hours, Some(dec!(6)));
    assert_eq!(price.finish.vat_amount, Decimal::ZERO);
}

#[test]
fn heathrow_pickup_priced_from_airport_card() {
    let heathrow = SpecialLocation {
        id: Uuid::new_v4(),
        name: "Heathrow Airport".to_string(),
        iata_code: Some("LHR".to_string()),
        location_type: LocationType::Airport,
        latitude: Some(51.4700),
        longitude: Some(-0.4543),
        zone: "Entire UK Cover".to_string(),
        radius_km: Some(8.0),
        is_active: true,
    };
    let locations = vec![heathrow.clone()];

    let terminal_5 = Coordinates {
        lat: 51.4720,
        lng: -0.4890,
    };
    let mayfair = Coordinates {
        lat: 51.5096,
        lng: -0.1480,
    };

    let found = detect_special_locations(&locations, terminal_5, mayfair);
    let location = found.pricing_location().expect("pickup is inside Heathrow radius");
    assert_eq!(location.id, heathrow.id);

    let mut card = AirportPricingConfig::new(
        heathrow.id,
        Uuid::new_v4(),
        vec![
            DistanceTier::fixed(dec!(0), dec!(15), dec!(65)),
            DistanceTier::per_mile(dec!(15), dec!(50), dec!(2)),
        ],
    );
    card.extras.airport_pickup_charge = dec!(10);
    card.extras.airport_dropoff_charge = dec!(8);

    let leg = found.leg();
    let journey = JourneyRequest {
        is_pickup: leg.is_pickup,
        is_dropoff: leg.is_dropoff,
        ..JourneyRequest::point_to_point(dec!(18))
    };

    let priced = quote(RateCard::Airport(&card), &journey);

    assert!(priced.is_configured());
    assert_eq!(priced.booking_type(), PricingKind::Airport);
    // (65 + 3 * 2 + 10) * 1.2
    assert_eq!(priced.total(), dec!(97.20));
    assert!(priced.narrative().contains("Airport pickup charge: £10.00"));
    assert!(!priced.narrative().contains("dropoff"));
}

#[test]
fn airport_booking_type_on_standard_card_is_distance_priced() {
    let config = executive_saloon();
    let request = JourneyRequest {
        booking_type: PricingKind::Airport,
        ..JourneyRequest::point_to_point(dec!(8))
    };

    let priced = quote(RateCard::Standard(&config), &request);
    assert_eq!(priced.booking_type(), PricingKind::Airport);
    assert_eq!(priced.total(), dec!(89.40));
}

#[test]
fn listing_estimate_display_strings() {
    let estimate = quick_estimate(&executive_saloon(), dec!(20), dec!(4));

    let p2p = estimate.p2p.expect("p2p is active");
    assert_eq!(p2p.total, dec!(104.50));
    assert_eq!(p2p.display, "£104.50");

    let hourly = estimate.hourly.expect("hourly is active");
    assert_eq!(hourly.total, dec!(180.00));
    assert_eq!(hourly.display, "From £180.00 (4hr min)");
}
