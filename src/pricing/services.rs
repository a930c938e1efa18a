//! Pricing service functions with database access.
//!
//! These functions look up rate cards through the cache and database and hand
//! them to the pure calculators. Admin writes are validated here and
//! invalidate the cache entries they touch.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::calculators::{quick_estimate, quote, JourneyRequest, QuickEstimate, Quote, RateCard};
use super::locations::{detect_special_locations, Coordinates};
use super::models::{
    validate_tiers, AirportPricingConfig, ExtrasConfig, PricingConfig, PricingKind,
    SpecialLocation,
};
use super::queries;
use super::requests::AirportPricingUpdate;

/// Pricing calculation error types
#[derive(Debug, Clone)]
pub enum PricingError {
    MissingPricing {
        scope: String,
        context: String,
    },
    NotConfigured {
        message: String,
    },
    ConfigurationError {
        message: String,
        errors: Vec<String>,
    },
    Database(String),
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::MissingPricing { scope, context } => {
                write!(f, "No pricing found for {} ({})", scope, context)
            }
            PricingError::NotConfigured { message } => {
                write!(f, "No pricing found: {}", message)
            }
            PricingError::ConfigurationError { message, .. } => {
                write!(f, "Configuration error: {}", message)
            }
            PricingError::Database(message) => write!(f, "Database error: {}", message),
        }
    }
}

impl std::error::Error for PricingError {}

impl From<AppError> for PricingError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Validation { message, errors } => {
                PricingError::ConfigurationError { message, errors }
            }
            other => PricingError::Database(other.to_string()),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::MissingPricing { .. } | PricingError::NotConfigured { .. } => {
                AppError::NotFound(err.to_string())
            }
            PricingError::ConfigurationError { message, errors } => {
                AppError::Validation { message, errors }
            }
            PricingError::Database(message) => AppError::Internal(message),
        }
    }
}

/// A journey to be quoted
#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub vehicle_id: Uuid,
    pub coverage_zone: String,
    pub journey: JourneyRequest,
    pub pickup: Option<Coordinates>,
    pub dropoff: Option<Coordinates>,
}

/// A priced journey with the rate card it came from
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub quote: Quote,
    /// Special location whose airport rate card was used
    pub location: Option<SpecialLocation>,
    /// Unit prices of the rate card, echoed back to the client
    pub rates: ExtrasConfig,
}

/// Standard pricing for a vehicle, type and zone (cache first)
pub async fn load_standard_pricing(
    pool: &PgPool,
    cache: &AppCache,
    vehicle_id: Uuid,
    kind: PricingKind,
    coverage_zone: &str,
) -> Result<Option<Arc<PricingConfig>>, PricingError> {
    let cache_key = AppCache::standard_key(vehicle_id, kind, coverage_zone);

    if let Some(cached) = cache.standard_pricing.get(&cache_key).await {
        debug!(key = %cache_key, "Standard pricing cache hit");
        return Ok(Some(cached));
    }

    let Some(row) = queries::find_active_pricing(pool, vehicle_id, kind, coverage_zone).await?
    else {
        debug!(key = %cache_key, "No standard pricing row");
        return Ok(None);
    };

    let config = Arc::new(PricingConfig::try_from(row)?);
    cache.standard_pricing.insert(cache_key, config.clone()).await;

    Ok(Some(config))
}

/// Active airport pricing for a location and vehicle (cache first)
pub async fn load_airport_pricing(
    pool: &PgPool,
    cache: &AppCache,
    location_id: Uuid,
    vehicle_id: Uuid,
) -> Result<Option<Arc<AirportPricingConfig>>, PricingError> {
    let cache_key = AppCache::airport_key(location_id, vehicle_id);

    // misses are cached too; admin writes invalidate the key
    if let Some(cached) = cache.airport_pricing.get(&cache_key).await {
        debug!(key = %cache_key, found = cached.is_some(), "Airport pricing cache hit");
        return Ok(cached);
    }

    let config = queries::find_active_airport_pricing(pool, location_id, vehicle_id)
        .await?
        .map(|row| Arc::new(AirportPricingConfig::from(row)));
    cache.airport_pricing.insert(cache_key, config.clone()).await;

    Ok(config)
}

/// Active special locations (cache first)
pub async fn load_special_locations(
    pool: &PgPool,
    cache: &AppCache,
) -> Result<Arc<Vec<SpecialLocation>>, PricingError> {
    if let Some(cached) = cache.cached_locations().await {
        return Ok(cached);
    }

    let rows = queries::list_active_locations(pool).await?;
    let locations = rows.into_iter().map(SpecialLocation::from).collect();

    Ok(cache.store_locations(locations).await)
}

/// Price a journey from an airport rate card.
///
/// Returns `None` when the rate card has no tiers, so the caller can fall back
/// to standard pricing.
pub fn airport_quote(
    location: &SpecialLocation,
    config: &AirportPricingConfig,
    journey: &JourneyRequest,
) -> Option<QuoteOutcome> {
    let priced = quote(RateCard::Airport(config), journey);
    if !priced.is_configured() {
        debug!(location = %location.name, "Airport rate card has no tiers");
        return None;
    }

    Some(QuoteOutcome {
        quote: priced,
        location: Some(location.clone()),
        rates: config.extras.clone(),
    })
}

/// Price a journey from standard pricing, failing when nothing applies
pub fn standard_quote(
    vehicle_id: Uuid,
    config: Option<&PricingConfig>,
    journey: &JourneyRequest,
) -> Result<QuoteOutcome, PricingError> {
    let config = config.ok_or_else(|| PricingError::MissingPricing {
        scope: format!("vehicle {}", vehicle_id),
        context: journey.booking_type.standard_row().to_string(),
    })?;

    let priced = quote(RateCard::Standard(config), journey);
    if !priced.is_configured() {
        return Err(PricingError::NotConfigured {
            message: priced.narrative(),
        });
    }

    Ok(QuoteOutcome {
        quote: priced,
        location: None,
        rates: config.extras.clone(),
    })
}

/// Quote a journey for a vehicle.
///
/// When both ends of the journey have coordinates, special locations are
/// detected first and the vehicle's airport rate card for the matched location
/// wins, whatever the booking type. Anything else is priced from standard
/// pricing.
pub async fn quote_journey(
    pool: &PgPool,
    cache: &AppCache,
    input: QuoteInput,
) -> Result<QuoteOutcome, PricingError> {
    let journey = input.journey.sanitized();

    if let (Some(pickup), Some(dropoff)) = (input.pickup, input.dropoff) {
        let locations = load_special_locations(pool, cache).await?;
        let found = detect_special_locations(&locations, pickup, dropoff);

        if let Some(location) = found.pricing_location() {
            let leg = found.leg();
            debug!(
                location = %location.name,
                is_pickup = leg.is_pickup,
                is_dropoff = leg.is_dropoff,
                "Special location journey"
            );

            if let Some(config) =
                load_airport_pricing(pool, cache, location.id, input.vehicle_id).await?
            {
                let airport_journey = JourneyRequest {
                    is_pickup: leg.is_pickup,
                    is_dropoff: leg.is_dropoff,
                    ..journey.clone()
                };
                if let Some(outcome) = airport_quote(location, &config, &airport_journey) {
                    return Ok(outcome);
                }
            }

            debug!(
                vehicle_id = %input.vehicle_id,
                "No airport pricing for vehicle, using standard pricing"
            );
        }
    }

    let config = load_standard_pricing(
        pool,
        cache,
        input.vehicle_id,
        journey.booking_type.standard_row(),
        &input.coverage_zone,
    )
    .await?;

    standard_quote(input.vehicle_id, config.as_deref(), &journey)
}

/// Quick P2P and hourly figures for a vehicle listing
pub async fn estimate(
    pool: &PgPool,
    cache: &AppCache,
    vehicle_id: Uuid,
    coverage_zone: &str,
    distance_miles: Decimal,
    hours: Decimal,
) -> Result<QuickEstimate, PricingError> {
    let p2p = load_standard_pricing(pool, cache, vehicle_id, PricingKind::P2p, coverage_zone).await?;
    let hourly =
        load_standard_pricing(pool, cache, vehicle_id, PricingKind::Hourly, coverage_zone).await?;

    if p2p.is_none() && hourly.is_none() {
        return Err(PricingError::MissingPricing {
            scope: format!("vehicle {}", vehicle_id),
            context: coverage_zone.to_string(),
        });
    }

    Ok(QuickEstimate {
        p2p: p2p.and_then(|c| quick_estimate(&c, distance_miles, hours).p2p),
        hourly: hourly.and_then(|c| quick_estimate(&c, distance_miles, hours).hourly),
    })
}

/// Problems with a standard pricing config, empty when it can be saved
pub fn validate_standard_config(config: &PricingConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.pricing_type == PricingKind::Airport {
        errors.push("pricingType must be 'p2p' or 'hourly'".to_string());
    }

    if let Some(p2p) = config.point_to_point.as_ref().filter(|p| p.is_active) {
        if p2p.distance_tiers.is_empty() {
            errors.push("pointToPoint.distanceTiers must not be empty".to_string());
        }
        errors.extend(validate_tiers(&p2p.distance_tiers));
        if p2p.after_distance_price_per_mile < Decimal::ZERO {
            errors.push("afterDistancePricePerMile must not be negative".to_string());
        }
    }

    if let Some(hourly) = config.hourly.as_ref().filter(|h| h.is_active) {
        let rates = [
            ("hourlyRate", hourly.hourly_rate),
            ("minimumHours", hourly.minimum_hours),
            ("additionalHourCharge", hourly.additional_hour_charge),
            ("milesIncluded", hourly.miles_included),
            ("excessMileageCharge", hourly.excess_mileage_charge),
        ];
        for (field, value) in rates {
            if value < Decimal::ZERO {
                errors.push(format!("hourly.{} must not be negative", field));
            }
        }
    }

    errors
}

/// Problems with an airport rate card, empty when it can be saved
pub fn validate_airport_config(config: &AirportPricingConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.distance_tiers.is_empty() {
        errors.push("distanceTiers must not be empty".to_string());
    }
    errors.extend(validate_tiers(&config.distance_tiers));

    let charges = [
        ("afterDistancePricePerMile", config.after_distance_price_per_mile),
        ("extras.airportPickupCharge", config.extras.airport_pickup_charge),
        ("extras.airportDropoffCharge", config.extras.airport_dropoff_charge),
        ("extras.congestionCharge", config.extras.congestion_charge),
    ];
    for (field, value) in charges {
        if value < Decimal::ZERO {
            errors.push(format!("{} must not be negative", field));
        }
    }

    errors
}

fn reject_invalid(message: &str, errors: Vec<String>) -> Result<(), PricingError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PricingError::ConfigurationError {
            message: message.to_string(),
            errors,
        })
    }
}

/// Create or replace standard pricing for a vehicle
pub async fn save_vehicle_pricing(
    pool: &PgPool,
    cache: &AppCache,
    config: PricingConfig,
) -> Result<PricingConfig, PricingError> {
    reject_invalid(
        "Invalid pricing configuration",
        validate_standard_config(&config),
    )?;

    let row = queries::upsert_pricing(pool, &config).await?;
    let saved = PricingConfig::try_from(row)?;

    cache
        .invalidate_standard(saved.vehicle_id, saved.pricing_type, &saved.coverage_zone)
        .await;

    info!(
        vehicle_id = %saved.vehicle_id,
        pricing_type = %saved.pricing_type,
        zone = %saved.coverage_zone,
        "Vehicle pricing saved"
    );

    Ok(saved)
}

/// All active standard pricing for a vehicle
pub async fn list_vehicle_pricing(
    pool: &PgPool,
    vehicle_id: Uuid,
) -> Result<Vec<PricingConfig>, PricingError> {
    queries::list_vehicle_pricing(pool, vehicle_id)
        .await?
        .into_iter()
        .map(PricingConfig::try_from)
        .collect()
}

fn already_exists() -> PricingError {
    PricingError::ConfigurationError {
        message: "Airport pricing already exists for this location and vehicle".to_string(),
        errors: Vec::new(),
    }
}

fn is_unique_violation(err: &AppError) -> bool {
    match err {
        AppError::Database(e) => e
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation()),
        _ => false,
    }
}

/// Create airport pricing; one rate card per location and vehicle
pub async fn create_airport_pricing(
    pool: &PgPool,
    cache: &AppCache,
    config: AirportPricingConfig,
) -> Result<AirportPricingConfig, PricingError> {
    reject_invalid(
        "Invalid airport pricing configuration",
        validate_airport_config(&config),
    )?;

    if queries::find_location(pool, config.location_id).await?.is_none() {
        return Err(PricingError::ConfigurationError {
            message: "Special location not found".to_string(),
            errors: vec![format!("locationId {} does not exist", config.location_id)],
        });
    }

    if queries::airport_pricing_exists(pool, config.location_id, config.vehicle_id).await? {
        return Err(already_exists());
    }

    let created = match queries::insert_airport_pricing(pool, &config).await {
        Ok(row) => AirportPricingConfig::from(row),
        // a concurrent create won the race for the unique pair
        Err(err) if is_unique_violation(&err) => return Err(already_exists()),
        Err(err) => return Err(err.into()),
    };
    cache
        .invalidate_airport(created.location_id, created.vehicle_id)
        .await;

    info!(
        id = %created.id,
        location_id = %created.location_id,
        vehicle_id = %created.vehicle_id,
        "Airport pricing created"
    );

    Ok(created)
}

/// Apply changes to an existing airport rate card
pub async fn update_airport_pricing(
    pool: &PgPool,
    cache: &AppCache,
    id: Uuid,
    changes: AirportPricingUpdate,
) -> Result<AirportPricingConfig, PricingError> {
    let missing = || PricingError::MissingPricing {
        scope: format!("airport pricing {}", id),
        context: "update".to_string(),
    };

    let mut config = queries::find_airport_pricing(pool, id)
        .await?
        .map(AirportPricingConfig::from)
        .ok_or_else(missing)?;

    changes.apply_to(&mut config);
    reject_invalid(
        "Invalid airport pricing configuration",
        validate_airport_config(&config),
    )?;

    let updated = queries::update_airport_pricing(pool, &config)
        .await?
        .map(AirportPricingConfig::from)
        .ok_or_else(missing)?;

    cache
        .invalidate_airport(updated.location_id, updated.vehicle_id)
        .await;

    info!(id = %updated.id, "Airport pricing updated");

    Ok(updated)
}

/// Delete an airport rate card
pub async fn delete_airport_pricing(
    pool: &PgPool,
    cache: &AppCache,
    id: Uuid,
) -> Result<AirportPricingConfig, PricingError> {
    let deleted = queries::delete_airport_pricing(pool, id)
        .await?
        .map(AirportPricingConfig::from)
        .ok_or_else(|| PricingError::MissingPricing {
            scope: format!("airport pricing {}", id),
            context: "delete".to_string(),
        })?;

    cache
        .invalidate_airport(deleted.location_id, deleted.vehicle_id)
        .await;

    info!(id = %deleted.id, "Airport pricing deleted");

    Ok(deleted)
}

/// Active airport rate cards at a location
pub async fn list_airport_pricing_for_location(
    pool: &PgPool,
    location_id: Uuid,
) -> Result<Vec<AirportPricingConfig>, PricingError> {
    let rows = queries::list_airport_pricing_by_location(pool, location_id).await?;
    Ok(rows.into_iter().map(AirportPricingConfig::from).collect())
}

/// Active airport rate cards for a vehicle
pub async fn list_airport_pricing_for_vehicle(
    pool: &PgPool,
    vehicle_id: Uuid,
) -> Result<Vec<AirportPricingConfig>, PricingError> {
    let rows = queries::list_airport_pricing_by_vehicle(pool, vehicle_id).await?;
    Ok(rows.into_iter().map(AirportPricingConfig::from).collect())
}
