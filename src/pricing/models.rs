//! Pricing configuration models.
//!
//! Row types use sqlx's FromRow derive for direct database deserialization and
//! are converted into the typed configs the fare engine consumes. JSON columns
//! tolerate missing fields: anything absent defaults to zero so a half-filled
//! admin record still produces a best-effort quote.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::services::PricingError;

/// Default coverage zone for standard pricing rows
pub const DEFAULT_COVERAGE_ZONE: &str = "Entire UK Cover";

/// Kind of journey being priced.
///
/// Standard pricing rows are stored per `P2p` or `Hourly`; `Airport` marks a
/// journey priced from an airport-specific rate card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingKind {
    #[default]
    P2p,
    Hourly,
    Airport,
}

impl PricingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingKind::P2p => "p2p",
            PricingKind::Hourly => "hourly",
            PricingKind::Airport => "airport",
        }
    }

    /// Standard-pricing row type used for this kind of journey.
    ///
    /// Only hourly bookings use the hourly row; everything else is priced by
    /// distance.
    pub fn standard_row(&self) -> PricingKind {
        match self {
            PricingKind::Hourly => PricingKind::Hourly,
            _ => PricingKind::P2p,
        }
    }
}

impl fmt::Display for PricingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p2p" => Ok(PricingKind::P2p),
            "hourly" => Ok(PricingKind::Hourly),
            "airport" => Ok(PricingKind::Airport),
            other => Err(format!("unknown pricing type '{}'", other)),
        }
    }
}

/// Whether a pricing row may be used for quotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingStatus {
    #[default]
    Active,
    Inactive,
}

impl PricingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingStatus::Active => "active",
            PricingStatus::Inactive => "inactive",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "inactive" => PricingStatus::Inactive,
            _ => PricingStatus::Active,
        }
    }
}

/// How a distance tier charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// Flat amount for the band (a minimum fare when it is the first tier)
    #[default]
    Fixed,
    /// Rate multiplied by the miles that fall inside the band
    PerMile,
}

/// A contiguous distance band with its own pricing rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DistanceTier {
    pub from_distance: Decimal,
    pub to_distance: Decimal,
    pub price: Decimal,
    #[serde(alias = "type")]
    pub kind: TierKind,
}

impl DistanceTier {
    pub fn fixed(from: Decimal, to: Decimal, price: Decimal) -> Self {
        Self {
            from_distance: from,
            to_distance: to,
            price,
            kind: TierKind::Fixed,
        }
    }

    pub fn per_mile(from: Decimal, to: Decimal, price: Decimal) -> Self {
        Self {
            from_distance: from,
            to_distance: to,
            price,
            kind: TierKind::PerMile,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_p2p_threshold() -> Decimal {
    dec!(40)
}

fn default_airport_threshold() -> Decimal {
    dec!(50)
}

fn default_after_rate() -> Decimal {
    dec!(2.5)
}

fn default_minimum_hours() -> Decimal {
    dec!(4)
}

/// Point-to-point (distance) pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointToPointConfig {
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub distance_tiers: Vec<DistanceTier>,
    #[serde(default = "default_p2p_threshold")]
    pub after_distance_threshold: Decimal,
    #[serde(default = "default_after_rate")]
    pub after_distance_price_per_mile: Decimal,
}

impl Default for PointToPointConfig {
    fn default() -> Self {
        Self {
            is_active: true,
            distance_tiers: Vec::new(),
            after_distance_threshold: default_p2p_threshold(),
            after_distance_price_per_mile: default_after_rate(),
        }
    }
}

/// Hourly ("as directed") pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyConfig {
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub hourly_rate: Decimal,
    #[serde(default = "default_minimum_hours")]
    pub minimum_hours: Decimal,
    #[serde(default)]
    pub additional_hour_charge: Decimal,
    #[serde(default)]
    pub miles_included: Decimal,
    #[serde(default)]
    pub excess_mileage_charge: Decimal,
}

impl Default for HourlyConfig {
    fn default() -> Self {
        Self {
            is_active: true,
            hourly_rate: Decimal::ZERO,
            minimum_hours: default_minimum_hours(),
            additional_hour_charge: Decimal::ZERO,
            miles_included: Decimal::ZERO,
            excess_mileage_charge: Decimal::ZERO,
        }
    }
}

/// Flat per-unit and surcharge prices
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtrasConfig {
    pub extra_stop_price: Decimal,
    pub child_seat_price: Decimal,
    pub congestion_charge: Decimal,
    pub airport_pickup_charge: Decimal,
    pub airport_dropoff_charge: Decimal,
    pub parking_included: bool,
}

/// Standard pricing for one vehicle, pricing type and coverage zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub pricing_type: PricingKind,
    pub coverage_zone: String,
    pub status: PricingStatus,
    pub display_vat_inclusive: bool,
    pub display_parking_inclusive: bool,
    pub price_round_off: bool,
    pub point_to_point: Option<PointToPointConfig>,
    pub hourly: Option<HourlyConfig>,
    pub extras: ExtrasConfig,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PricingConfig {
    /// An active config with no rate cards, for building up in code
    pub fn new(vehicle_id: Uuid, pricing_type: PricingKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            pricing_type,
            coverage_zone: DEFAULT_COVERAGE_ZONE.to_string(),
            status: PricingStatus::Active,
            display_vat_inclusive: true,
            display_parking_inclusive: false,
            price_round_off: false,
            point_to_point: None,
            hourly: None,
            extras: ExtrasConfig::default(),
            updated_at: None,
        }
    }
}

/// vehicle_pricing row
#[derive(Debug, Clone, FromRow)]
pub struct PricingConfigRow {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub pricing_type: String,
    pub coverage_zone: String,
    pub status: String,
    pub display_vat_inclusive: bool,
    pub display_parking_inclusive: bool,
    pub price_round_off: bool,
    pub point_to_point: Option<Json<PointToPointConfig>>,
    pub hourly: Option<Json<HourlyConfig>>,
    pub extras: Option<Json<ExtrasConfig>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PricingConfigRow> for PricingConfig {
    type Error = PricingError;

    fn try_from(row: PricingConfigRow) -> Result<Self, Self::Error> {
        let pricing_type = row.pricing_type.parse::<PricingKind>().map_err(|e| {
            PricingError::ConfigurationError {
                message: format!("Pricing {} has an invalid type", row.id),
                errors: vec![e],
            }
        })?;

        Ok(Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            pricing_type,
            coverage_zone: row.coverage_zone,
            status: PricingStatus::parse(&row.status),
            display_vat_inclusive: row.display_vat_inclusive,
            display_parking_inclusive: row.display_parking_inclusive,
            price_round_off: row.price_round_off,
            point_to_point: row.point_to_point.map(|j| j.0),
            hourly: row.hourly.map(|j| j.0),
            extras: row.extras.map(|j| j.0).unwrap_or_default(),
            updated_at: row.updated_at,
        })
    }
}

/// Airport-specific pricing for one special location and vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportPricingConfig {
    pub id: Uuid,
    pub location_id: Uuid,
    pub vehicle_id: Uuid,
    pub distance_tiers: Vec<DistanceTier>,
    pub after_distance_threshold: Decimal,
    pub after_distance_price_per_mile: Decimal,
    pub extras: ExtrasConfig,
    pub display_parking_inclusive: bool,
    pub display_vat_inclusive: bool,
    pub price_round_off: bool,
    pub status: PricingStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AirportPricingConfig {
    pub fn new(location_id: Uuid, vehicle_id: Uuid, distance_tiers: Vec<DistanceTier>) -> Self {
        Self {
            id: Uuid::new_v4(),
            location_id,
            vehicle_id,
            distance_tiers,
            after_distance_threshold: default_airport_threshold(),
            after_distance_price_per_mile: default_after_rate(),
            extras: ExtrasConfig::default(),
            display_parking_inclusive: true,
            display_vat_inclusive: true,
            price_round_off: false,
            status: PricingStatus::Active,
            updated_at: None,
        }
    }
}

/// airport_pricing row
#[derive(Debug, Clone, FromRow)]
pub struct AirportPricingRow {
    pub id: Uuid,
    pub location_id: Uuid,
    pub vehicle_id: Uuid,
    pub distance_tiers: Option<Json<Vec<DistanceTier>>>,
    pub after_distance_threshold: Decimal,
    pub after_distance_price_per_mile: Decimal,
    pub extras: Option<Json<ExtrasConfig>>,
    pub display_parking_inclusive: bool,
    pub display_vat_inclusive: bool,
    pub price_round_off: bool,
    pub status: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AirportPricingRow> for AirportPricingConfig {
    fn from(row: AirportPricingRow) -> Self {
        Self {
            id: row.id,
            location_id: row.location_id,
            vehicle_id: row.vehicle_id,
            distance_tiers: row.distance_tiers.map(|j| j.0).unwrap_or_default(),
            after_distance_threshold: row.after_distance_threshold,
            after_distance_price_per_mile: row.after_distance_price_per_mile,
            extras: row.extras.map(|j| j.0).unwrap_or_default(),
            display_parking_inclusive: row.display_parking_inclusive,
            display_vat_inclusive: row.display_vat_inclusive,
            price_round_off: row.price_round_off,
            status: PricingStatus::parse(&row.status),
            updated_at: row.updated_at,
        }
    }
}

/// What sort of place a special location is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Airport,
    Stadium,
    Circuit,
    Venue,
    Other,
}

impl LocationType {
    fn parse(s: &str) -> Self {
        match s {
            "airport" => LocationType::Airport,
            "stadium" => LocationType::Stadium,
            "circuit" => LocationType::Circuit,
            "venue" => LocationType::Venue,
            _ => LocationType::Other,
        }
    }
}

/// An airport, stadium or venue with its own rate cards
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialLocation {
    pub id: Uuid,
    pub name: String,
    pub iata_code: Option<String>,
    pub location_type: LocationType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zone: String,
    pub radius_km: Option<f64>,
    pub is_active: bool,
}

/// special_locations row
#[derive(Debug, Clone, FromRow)]
pub struct SpecialLocationRow {
    pub id: Uuid,
    pub name: String,
    pub iata_code: Option<String>,
    pub location_type: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub zone: String,
    pub radius_km: Option<f64>,
    pub is_active: bool,
}

impl From<SpecialLocationRow> for SpecialLocation {
    fn from(row: SpecialLocationRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            iata_code: row.iata_code,
            location_type: LocationType::parse(&row.location_type),
            latitude: row.latitude,
            longitude: row.longitude,
            zone: row.zone,
            radius_km: row.radius_km,
            is_active: row.is_active,
        }
    }
}

/// Check a tier list for the shape the fare engine expects.
///
/// Tiers are checked in `fromDistance` order: each band must have positive
/// width and a non-negative price, and must start where the previous band
/// ended. Returns one message per problem found.
pub fn validate_tiers(tiers: &[DistanceTier]) -> Vec<String> {
    let mut errors = Vec::new();

    let mut sorted: Vec<&DistanceTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.from_distance.cmp(&b.from_distance));

    for (i, tier) in sorted.iter().enumerate() {
        if tier.from_distance < Decimal::ZERO {
            errors.push(format!("tier {}: fromDistance must not be negative", i + 1));
        }
        if tier.to_distance <= tier.from_distance {
            errors.push(format!(
                "tier {}: toDistance ({}) must be greater than fromDistance ({})",
                i + 1,
                tier.to_distance,
                tier.from_distance
            ));
        }
        if tier.price < Decimal::ZERO {
            errors.push(format!("tier {}: price must not be negative", i + 1));
        }
        if i > 0 {
            let previous = sorted[i - 1];
            if tier.from_distance < previous.to_distance {
                errors.push(format!(
                    "tier {} overlaps tier {} ({} < {})",
                    i + 1,
                    i,
                    tier.from_distance,
                    previous.to_distance
                ));
            } else if tier.from_distance > previous.to_distance {
                errors.push(format!(
                    "gap between tier {} and tier {} ({} to {})",
                    i,
                    i + 1,
                    previous.to_distance,
                    tier.from_distance
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_kind_round_trips_through_str() {
        for kind in [PricingKind::P2p, PricingKind::Hourly, PricingKind::Airport] {
            assert_eq!(kind.as_str().parse::<PricingKind>().unwrap(), kind);
        }
        assert!("daily".parse::<PricingKind>().is_err());
    }

    #[test]
    fn test_standard_row_for_airport_is_p2p() {
        assert_eq!(PricingKind::Airport.standard_row(), PricingKind::P2p);
        assert_eq!(PricingKind::Hourly.standard_row(), PricingKind::Hourly);
    }

    #[test]
    fn test_tier_accepts_legacy_type_field() {
        let tier: DistanceTier = serde_json::from_value(serde_json::json!({
            "fromDistance": 8,
            "toDistance": 30,
            "price": "2.50",
            "type": "per_mile"
        }))
        .unwrap();

        assert_eq!(tier, DistanceTier::per_mile(dec!(8), dec!(30), dec!(2.50)));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let extras: ExtrasConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(extras, ExtrasConfig::default());
        assert_eq!(extras.congestion_charge, Decimal::ZERO);

        let hourly: HourlyConfig =
            serde_json::from_value(serde_json::json!({ "hourlyRate": 45 })).unwrap();
        assert!(hourly.is_active);
        assert_eq!(hourly.hourly_rate, dec!(45));
        assert_eq!(hourly.minimum_hours, dec!(4));
        assert_eq!(hourly.excess_mileage_charge, Decimal::ZERO);
    }

    #[test]
    fn test_row_with_unknown_type_is_rejected() {
        let row = PricingConfigRow {
            id: Uuid::nil(),
            vehicle_id: Uuid::nil(),
            pricing_type: "daily".to_string(),
            coverage_zone: DEFAULT_COVERAGE_ZONE.to_string(),
            status: "active".to_string(),
            display_vat_inclusive: true,
            display_parking_inclusive: false,
            price_round_off: false,
            point_to_point: None,
            hourly: None,
            extras: None,
            updated_at: None,
        };

        assert!(PricingConfig::try_from(row).is_err());
    }

    #[test]
    fn test_row_without_extras_uses_zero_extras() {
        let row = PricingConfigRow {
            id: Uuid::nil(),
            vehicle_id: Uuid::nil(),
            pricing_type: "hourly".to_string(),
            coverage_zone: DEFAULT_COVERAGE_ZONE.to_string(),
            status: "inactive".to_string(),
            display_vat_inclusive: false,
            display_parking_inclusive: false,
            price_round_off: true,
            point_to_point: None,
            hourly: Some(Json(HourlyConfig::default())),
            extras: None,
            updated_at: None,
        };

        let config = PricingConfig::try_from(row).unwrap();
        assert_eq!(config.pricing_type, PricingKind::Hourly);
        assert_eq!(config.status, PricingStatus::Inactive);
        assert_eq!(config.extras, ExtrasConfig::default());
        assert!(config.price_round_off);
    }

    #[test]
    fn test_validate_tiers_accepts_contiguous_bands() {
        let tiers = vec![
            DistanceTier::per_mile(dec!(8), dec!(30), dec!(2.50)),
            DistanceTier::fixed(dec!(0), dec!(8), dec!(74.50)),
        ];
        assert!(validate_tiers(&tiers).is_empty());
    }

    #[test]
    fn test_validate_tiers_reports_gap_overlap_and_width() {
        let tiers = vec![
            DistanceTier::fixed(dec!(0), dec!(8), dec!(74.50)),
            DistanceTier::per_mile(dec!(9), dec!(30), dec!(2.50)),
            DistanceTier::per_mile(dec!(25), dec!(25), dec!(-1)),
        ];
        let errors = validate_tiers(&tiers);

        assert!(errors.iter().any(|e| e.contains("gap")));
        assert!(errors.iter().any(|e| e.contains("overlaps")));
        assert!(errors.iter().any(|e| e.contains("must be greater")));
        assert!(errors.iter().any(|e| e.contains("price must not be negative")));
    }
}
