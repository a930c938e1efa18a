//! Response DTOs for pricing API endpoints.
//!
//! Money is serialized as JSON numbers rounded to pence; the engine's full
//! precision values never reach the wire.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{
    round_money, EstimateLine, HourlyEstimateLine, JourneyPrice, QuickEstimate, Quote,
};
use super::models::PricingKind;
use super::services::QuoteOutcome;

fn pence(amount: Decimal) -> Decimal {
    round_money(amount, 2)
}

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::ok(data)
        }
    }
}

/// Unit prices the client may add to a booking
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalCharges {
    #[serde(with = "rust_decimal::serde::float")]
    pub extra_stop_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub child_seat_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub congestion_charge: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub airport_pickup_charge: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub airport_dropoff_charge: Option<Decimal>,
}

/// Every component of the price, rounded to pence
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetails {
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_miles: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hours: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub extra_hour_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub excess_mileage_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub extra_stop_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub child_seat_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub airport_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub congestion_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
    pub rounded_off: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_zone: Option<String>,
}

/// Response for a journey quote
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub vehicle_id: Uuid,
    pub booking_type: PricingKind,
    pub is_airport_pricing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airport_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub airport_charges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub congestion_charge: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub breakdown: String,
    pub vat_inclusive: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_rate: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_hours: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hourly_rate: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub miles_included: Option<Decimal>,
    pub additional_charges: AdditionalCharges,
    pub details: QuoteDetails,
}

impl QuoteResponse {
    pub fn from_outcome(vehicle_id: Uuid, outcome: QuoteOutcome) -> Self {
        let QuoteOutcome {
            quote,
            location,
            rates,
        } = outcome;

        match quote {
            Quote::Airport(price) => Self {
                vehicle_id,
                booking_type: PricingKind::Airport,
                is_airport_pricing: true,
                airport_name: location.map(|l| l.name),
                base_price: pence(price.journey.total),
                airport_charges: pence(price.airport_charges),
                congestion_charge: pence(price.congestion_charge),
                tax: price.finish.vat_amount,
                total_price: price.total(),
                breakdown: price.breakdown.clone(),
                vat_inclusive: price.finish.vat_inclusive,
                vat_rate: price.finish.vat_rate,
                minimum_hours: None,
                hourly_rate: None,
                miles_included: None,
                additional_charges: AdditionalCharges {
                    extra_stop_price: rates.extra_stop_price,
                    child_seat_price: rates.child_seat_price,
                    congestion_charge: pence(price.congestion_charge),
                    airport_pickup_charge: Some(rates.airport_pickup_charge),
                    airport_dropoff_charge: Some(rates.airport_dropoff_charge),
                },
                details: QuoteDetails {
                    base_charge: pence(price.base_charge()),
                    distance_charge: pence(price.distance_charge()),
                    airport_charges: pence(price.airport_charges),
                    congestion_charge: pence(price.congestion_charge),
                    subtotal: pence(price.subtotal),
                    vat_amount: price.finish.vat_amount,
                    grand_total: price.finish.grand_total,
                    rounded_off: price.finish.rounded_off,
                    ..Default::default()
                },
            },
            Quote::Standard(breakdown) => {
                let breakdown_text = breakdown.narrative();
                let (distance_charge, extra_hour_charge, excess_mileage_charge, hourly) =
                    match &breakdown.journey {
                        JourneyPrice::PointToPoint(p) => {
                            (p.distance_charge, Decimal::ZERO, Decimal::ZERO, None)
                        }
                        JourneyPrice::Hourly(h) => (
                            Decimal::ZERO,
                            h.extra_hour_charge,
                            h.excess_mileage_charge,
                            Some((h.minimum_hours, h.hourly_rate, h.miles_included)),
                        ),
                    };

                Self {
                    vehicle_id,
                    booking_type: breakdown.booking_type,
                    is_airport_pricing: false,
                    airport_name: None,
                    base_price: pence(breakdown.journey.total()),
                    airport_charges: Decimal::ZERO,
                    congestion_charge: pence(breakdown.extras.congestion_charge),
                    tax: breakdown.finish.vat_amount,
                    total_price: breakdown.total(),
                    breakdown: breakdown_text,
                    vat_inclusive: breakdown.finish.vat_inclusive,
                    vat_rate: breakdown.finish.vat_rate,
                    minimum_hours: hourly.map(|h| h.0),
                    hourly_rate: hourly.map(|h| h.1),
                    miles_included: hourly.map(|h| h.2),
                    additional_charges: AdditionalCharges {
                        extra_stop_price: rates.extra_stop_price,
                        child_seat_price: rates.child_seat_price,
                        congestion_charge: rates.congestion_charge,
                        airport_pickup_charge: None,
                        airport_dropoff_charge: None,
                    },
                    details: QuoteDetails {
                        distance_miles: pence(breakdown.distance_miles),
                        hours: breakdown.hours,
                        base_charge: pence(breakdown.journey.base_charge()),
                        distance_charge: pence(distance_charge),
                        extra_hour_charge: pence(extra_hour_charge),
                        excess_mileage_charge: pence(excess_mileage_charge),
                        extra_stop_charge: pence(breakdown.extras.extra_stop_charge),
                        child_seat_charge: pence(breakdown.extras.child_seat_charge),
                        airport_charges: Decimal::ZERO,
                        congestion_charge: pence(breakdown.extras.congestion_charge),
                        subtotal: pence(breakdown.subtotal),
                        vat_amount: breakdown.finish.vat_amount,
                        grand_total: breakdown.finish.grand_total,
                        rounded_off: breakdown.finish.rounded_off,
                        coverage_zone: Some(breakdown.coverage_zone),
                    },
                }
            }
        }
    }
}

/// One line of the quick estimate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateLineResponse {
    pub available: bool,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_hours: Option<Decimal>,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hourly_rate: Option<Decimal>,
}

impl EstimateLineResponse {
    fn unavailable() -> Self {
        Self {
            available: false,
            total: None,
            display: None,
            minimum_hours: None,
            hourly_rate: None,
        }
    }
}

impl From<Option<EstimateLine>> for EstimateLineResponse {
    fn from(line: Option<EstimateLine>) -> Self {
        match line {
            Some(line) => Self {
                available: true,
                total: Some(line.total),
                display: Some(line.display),
                minimum_hours: None,
                hourly_rate: None,
            },
            None => Self::unavailable(),
        }
    }
}

impl From<Option<HourlyEstimateLine>> for EstimateLineResponse {
    fn from(line: Option<HourlyEstimateLine>) -> Self {
        match line {
            Some(line) => Self {
                available: true,
                total: Some(line.total),
                display: Some(line.display),
                minimum_hours: Some(line.minimum_hours),
                hourly_rate: Some(line.hourly_rate),
            },
            None => Self::unavailable(),
        }
    }
}

/// Response for the quick estimate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub vehicle_id: Uuid,
    pub p2p: EstimateLineResponse,
    pub hourly: EstimateLineResponse,
}

impl EstimateResponse {
    pub fn new(vehicle_id: Uuid, estimate: QuickEstimate) -> Self {
        Self {
            vehicle_id,
            p2p: estimate.p2p.into(),
            hourly: estimate.hourly.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::calculators::{quote, JourneyRequest, RateCard};
    use crate::pricing::models::{
        AirportPricingConfig, DistanceTier, ExtrasConfig, LocationType, PointToPointConfig,
        PricingConfig, SpecialLocation,
    };
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_standard_quote_response_shape() {
        let mut config = PricingConfig::new(Uuid::nil(), PricingKind::P2p);
        config.point_to_point = Some(PointToPointConfig {
            distance_tiers: vec![
                DistanceTier::fixed(dec!(0), dec!(8), dec!(74.50)),
                DistanceTier::per_mile(dec!(8), dec!(30), dec!(2.50)),
            ],
            ..Default::default()
        });
        config.extras.congestion_charge = dec!(15);

        let outcome = QuoteOutcome {
            quote: quote(
                RateCard::Standard(&config),
                &JourneyRequest::point_to_point(dec!(12)),
            ),
            location: None,
            rates: config.extras.clone(),
        };

        let value = serde_json::to_value(QuoteResponse::from_outcome(Uuid::nil(), outcome)).unwrap();

        assert_eq!(value["bookingType"], "p2p");
        assert_eq!(value["isAirportPricing"], false);
        assert!(value.get("airportName").is_none());
        assert_eq!(value["basePrice"], json!(84.5));
        assert_eq!(value["tax"], json!(16.9));
        assert_eq!(value["totalPrice"], json!(101.4));
        assert_eq!(value["vatRate"], json!(20.0));
        assert_eq!(value["additionalCharges"]["congestionCharge"], json!(15.0));
        assert!(value["additionalCharges"].get("airportPickupCharge").is_none());
        assert_eq!(value["details"]["distanceCharge"], json!(10.0));
        assert_eq!(value["details"]["coverageZone"], "Entire UK Cover");
    }

    #[test]
    fn test_airport_quote_response_shape() {
        let location = SpecialLocation {
            id: Uuid::nil(),
            name: "Gatwick Airport".to_string(),
            iata_code: Some("LGW".to_string()),
            location_type: LocationType::Airport,
            latitude: Some(51.1537),
            longitude: Some(-0.1821),
            zone: "Entire UK Cover".to_string(),
            radius_km: None,
            is_active: true,
        };
        let mut config = AirportPricingConfig::new(
            location.id,
            Uuid::nil(),
            vec![DistanceTier::fixed(dec!(0), dec!(10), dec!(60))],
        );
        config.extras = ExtrasConfig {
            airport_dropoff_charge: dec!(5),
            ..Default::default()
        };
        config.display_vat_inclusive = false;

        let journey = JourneyRequest {
            is_dropoff: true,
            ..JourneyRequest::point_to_point(dec!(4))
        };
        let outcome = QuoteOutcome {
            quote: quote(RateCard::Airport(&config), &journey),
            location: Some(location),
            rates: config.extras.clone(),
        };

        let value = serde_json::to_value(QuoteResponse::from_outcome(Uuid::nil(), outcome)).unwrap();

        assert_eq!(value["bookingType"], "airport");
        assert_eq!(value["isAirportPricing"], true);
        assert_eq!(value["airportName"], "Gatwick Airport");
        assert_eq!(value["basePrice"], json!(60.0));
        assert_eq!(value["airportCharges"], json!(5.0));
        assert_eq!(value["tax"], json!(0.0));
        assert_eq!(value["totalPrice"], json!(65.0));
        assert_eq!(value["additionalCharges"]["airportDropoffCharge"], json!(5.0));
    }

    #[test]
    fn test_estimate_response_marks_unavailable() {
        let response = EstimateResponse::new(
            Uuid::nil(),
            QuickEstimate {
                p2p: Some(EstimateLine {
                    total: dec!(104.50),
                    display: "£104.50".to_string(),
                }),
                hourly: None,
            },
        );
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["p2p"]["available"], true);
        assert_eq!(value["p2p"]["display"], "£104.50");
        assert_eq!(value["hourly"], json!({ "available": false }));
    }

    #[test]
    fn test_list_envelope_counts() {
        let value = serde_json::to_value(ApiResponse::list(vec![1, 2, 3])).unwrap();
        assert_eq!(value, json!({ "success": true, "count": 3, "data": [1, 2, 3] }));
    }
}
