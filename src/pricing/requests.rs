//! Request DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

use super::calculators::{km_to_miles, JourneyRequest, RequestedExtras, DEFAULT_ESTIMATE_HOURS};
use super::locations::Coordinates;
use super::models::{
    AirportPricingConfig, DistanceTier, ExtrasConfig, HourlyConfig, PointToPointConfig,
    PricingConfig, PricingKind, PricingStatus, DEFAULT_COVERAGE_ZONE,
};
use super::services::QuoteInput;

/// Longest journey a quote will price
pub const MAX_DISTANCE_MILES: Decimal = dec!(100000);
/// `MAX_DISTANCE_MILES` in kilometres, checked before conversion
pub const MAX_DISTANCE_KM: Decimal = dec!(160934);
/// Longest hourly booking a quote will price
pub const MAX_HOURS: Decimal = dec!(1000);

fn within_limit(field: &str, value: Decimal, max: Decimal) -> Result<Decimal, AppError> {
    if value > max {
        return Err(AppError::BadRequest(format!(
            "{} must not exceed {}",
            field, max
        )));
    }
    Ok(value)
}

fn default_coverage_zone() -> String {
    DEFAULT_COVERAGE_ZONE.to_string()
}

fn default_true() -> bool {
    true
}

/// Extras selected for a quote
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtrasRequest {
    pub extra_stops: i32,
    pub child_seats: i32,
    #[serde(alias = "includeCongestion")]
    pub congestion_charge: bool,
}

impl From<ExtrasRequest> for RequestedExtras {
    fn from(req: ExtrasRequest) -> Self {
        Self {
            extra_stops: req.extra_stops,
            child_seats: req.child_seats,
            include_congestion: req.congestion_charge,
        }
    }
}

/// Request to quote a journey for one vehicle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub vehicle_id: Uuid,
    #[serde(default)]
    pub booking_type: PricingKind,
    #[serde(default)]
    pub distance_km: Option<Decimal>,
    #[serde(default)]
    pub distance_miles: Option<Decimal>,
    #[serde(default)]
    pub hours: Option<Decimal>,
    #[serde(default)]
    pub extras: ExtrasRequest,
    #[serde(default = "default_coverage_zone")]
    pub coverage_zone: String,
    #[serde(default)]
    pub pickup: Option<Coordinates>,
    #[serde(default)]
    pub dropoff: Option<Coordinates>,
}

impl QuoteRequest {
    /// Journey distance in miles.
    ///
    /// `distanceMiles` wins over `distanceKm`. Hourly bookings may omit the
    /// distance, which then only skips the excess-mileage charge.
    pub fn distance_miles(&self) -> Result<Decimal, AppError> {
        match (self.distance_miles, self.distance_km) {
            (Some(miles), _) => within_limit("distanceMiles", miles, MAX_DISTANCE_MILES),
            (None, Some(km)) => {
                within_limit("distanceKm", km, MAX_DISTANCE_KM).map(km_to_miles)
            }
            (None, None) if self.booking_type == PricingKind::Hourly => Ok(Decimal::ZERO),
            (None, None) => Err(AppError::BadRequest(
                "distanceKm or distanceMiles is required".to_string(),
            )),
        }
    }

    pub fn into_input(self) -> Result<QuoteInput, AppError> {
        let distance_miles = self.distance_miles()?;
        let hours = within_limit("hours", self.hours.unwrap_or_default(), MAX_HOURS)?;

        Ok(QuoteInput {
            vehicle_id: self.vehicle_id,
            coverage_zone: self.coverage_zone,
            journey: JourneyRequest {
                booking_type: self.booking_type,
                distance_miles,
                hours,
                extras: self.extras.into(),
                is_pickup: false,
                is_dropoff: false,
            },
            pickup: self.pickup,
            dropoff: self.dropoff,
        })
    }
}

/// Request for the quick P2P/hourly estimate shown next to a vehicle
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub vehicle_id: Uuid,
    pub distance_miles: Decimal,
    #[serde(default)]
    pub hours: Option<Decimal>,
    #[serde(default = "default_coverage_zone")]
    pub coverage_zone: String,
}

impl EstimateRequest {
    pub fn distance_miles(&self) -> Result<Decimal, AppError> {
        within_limit("distanceMiles", self.distance_miles, MAX_DISTANCE_MILES)
    }

    pub fn hours(&self) -> Result<Decimal, AppError> {
        within_limit(
            "hours",
            self.hours.unwrap_or(DEFAULT_ESTIMATE_HOURS),
            MAX_HOURS,
        )
    }
}

/// Standard pricing for a vehicle, as sent by the admin panel
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePricingRequest {
    pub pricing_type: PricingKind,
    #[serde(default = "default_coverage_zone")]
    pub coverage_zone: String,
    #[serde(default)]
    pub status: PricingStatus,
    #[serde(default = "default_true", alias = "displayVATInclusive")]
    pub display_vat_inclusive: bool,
    #[serde(default)]
    pub display_parking_inclusive: bool,
    #[serde(default)]
    pub price_round_off: bool,
    #[serde(default)]
    pub point_to_point: Option<PointToPointConfig>,
    #[serde(default)]
    pub hourly: Option<HourlyConfig>,
    #[serde(default)]
    pub extras: ExtrasConfig,
}

impl VehiclePricingRequest {
    pub fn into_config(self, vehicle_id: Uuid) -> PricingConfig {
        PricingConfig {
            coverage_zone: self.coverage_zone,
            status: self.status,
            display_vat_inclusive: self.display_vat_inclusive,
            display_parking_inclusive: self.display_parking_inclusive,
            price_round_off: self.price_round_off,
            point_to_point: self.point_to_point,
            hourly: self.hourly,
            extras: self.extras,
            ..PricingConfig::new(vehicle_id, self.pricing_type)
        }
    }
}

/// New airport rate card
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportPricingRequest {
    #[serde(alias = "airportId")]
    pub location_id: Uuid,
    pub vehicle_id: Uuid,
    #[serde(default)]
    pub distance_tiers: Vec<DistanceTier>,
    #[serde(flatten)]
    pub rates: AirportPricingUpdate,
}

impl AirportPricingRequest {
    pub fn into_config(self) -> AirportPricingConfig {
        let mut config =
            AirportPricingConfig::new(self.location_id, self.vehicle_id, self.distance_tiers);
        self.rates.apply_to(&mut config);
        config
    }
}

/// Changes to an airport rate card; absent fields are left as they are
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AirportPricingUpdate {
    pub distance_tiers: Option<Vec<DistanceTier>>,
    pub after_distance_threshold: Option<Decimal>,
    pub after_distance_price_per_mile: Option<Decimal>,
    pub extras: Option<ExtrasConfig>,
    pub display_parking_inclusive: Option<bool>,
    #[serde(alias = "displayVATInclusive")]
    pub display_vat_inclusive: Option<bool>,
    pub price_round_off: Option<bool>,
    pub status: Option<PricingStatus>,
}

impl AirportPricingUpdate {
    pub fn apply_to(self, config: &mut AirportPricingConfig) {
        if let Some(tiers) = self.distance_tiers {
            config.distance_tiers = tiers;
        }
        if let Some(threshold) = self.after_distance_threshold {
            config.after_distance_threshold = threshold;
        }
        if let Some(rate) = self.after_distance_price_per_mile {
            config.after_distance_price_per_mile = rate;
        }
        if let Some(extras) = self.extras {
            config.extras = extras;
        }
        if let Some(flag) = self.display_parking_inclusive {
            config.display_parking_inclusive = flag;
        }
        if let Some(flag) = self.display_vat_inclusive {
            config.display_vat_inclusive = flag;
        }
        if let Some(flag) = self.price_round_off {
            config.price_round_off = flag;
        }
        if let Some(status) = self.status {
            config.status = status;
        }
    }
}
