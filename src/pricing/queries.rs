//! Database queries for the fare engine.
//!
//! Rate cards are stored with their tier tables and extras as JSONB, so a
//! config is always read and written as a whole.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{
    AirportPricingConfig, AirportPricingRow, PricingConfig, PricingConfigRow, PricingKind,
    SpecialLocationRow,
};

/// Find the active standard pricing for a vehicle, pricing type and zone
pub async fn find_active_pricing(
    pool: &PgPool,
    vehicle_id: Uuid,
    pricing_type: PricingKind,
    coverage_zone: &str,
) -> Result<Option<PricingConfigRow>, AppError> {
    let row = sqlx::query_as::<_, PricingConfigRow>(
        r#"
        SELECT
            id, vehicle_id, pricing_type, coverage_zone, status,
            display_vat_inclusive, display_parking_inclusive, price_round_off,
            point_to_point, hourly, extras, updated_at
        FROM vehicle_pricing
        WHERE vehicle_id = $1
          AND pricing_type = $2
          AND coverage_zone = $3
          AND status = 'active'
        "#,
    )
    .bind(vehicle_id)
    .bind(pricing_type.as_str())
    .bind(coverage_zone)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// All active standard pricing rows for a vehicle
pub async fn list_vehicle_pricing(
    pool: &PgPool,
    vehicle_id: Uuid,
) -> Result<Vec<PricingConfigRow>, AppError> {
    let rows = sqlx::query_as::<_, PricingConfigRow>(
        r#"
        SELECT
            id, vehicle_id, pricing_type, coverage_zone, status,
            display_vat_inclusive, display_parking_inclusive, price_round_off,
            point_to_point, hourly, extras, updated_at
        FROM vehicle_pricing
        WHERE vehicle_id = $1
          AND status = 'active'
        ORDER BY pricing_type, coverage_zone
        "#,
    )
    .bind(vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Create or replace the standard pricing for (vehicle, type, zone)
pub async fn upsert_pricing(
    pool: &PgPool,
    config: &PricingConfig,
) -> Result<PricingConfigRow, AppError> {
    let row = sqlx::query_as::<_, PricingConfigRow>(
        r#"
        INSERT INTO vehicle_pricing (
            id, vehicle_id, pricing_type, coverage_zone, status,
            display_vat_inclusive, display_parking_inclusive, price_round_off,
            point_to_point, hourly, extras, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        ON CONFLICT (vehicle_id, pricing_type, coverage_zone) DO UPDATE SET
            status = EXCLUDED.status,
            display_vat_inclusive = EXCLUDED.display_vat_inclusive,
            display_parking_inclusive = EXCLUDED.display_parking_inclusive,
            price_round_off = EXCLUDED.price_round_off,
            point_to_point = EXCLUDED.point_to_point,
            hourly = EXCLUDED.hourly,
            extras = EXCLUDED.extras,
            updated_at = NOW()
        RETURNING
            id, vehicle_id, pricing_type, coverage_zone, status,
            display_vat_inclusive, display_parking_inclusive, price_round_off,
            point_to_point, hourly, extras, updated_at
        "#,
    )
    .bind(config.id)
    .bind(config.vehicle_id)
    .bind(config.pricing_type.as_str())
    .bind(&config.coverage_zone)
    .bind(config.status.as_str())
    .bind(config.display_vat_inclusive)
    .bind(config.display_parking_inclusive)
    .bind(config.price_round_off)
    .bind(config.point_to_point.as_ref().map(Json))
    .bind(config.hourly.as_ref().map(Json))
    .bind(Json(&config.extras))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Active special locations in detection order
pub async fn list_active_locations(pool: &PgPool) -> Result<Vec<SpecialLocationRow>, AppError> {
    let rows = sqlx::query_as::<_, SpecialLocationRow>(
        r#"
        SELECT
            id, name, iata_code, location_type,
            latitude, longitude, zone, radius_km, is_active
        FROM special_locations
        WHERE is_active = true
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Get a special location by id
pub async fn find_location(
    pool: &PgPool,
    location_id: Uuid,
) -> Result<Option<SpecialLocationRow>, AppError> {
    let row = sqlx::query_as::<_, SpecialLocationRow>(
        r#"
        SELECT
            id, name, iata_code, location_type,
            latitude, longitude, zone, radius_km, is_active
        FROM special_locations
        WHERE id = $1
        "#,
    )
    .bind(location_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Find the active airport pricing for a location and vehicle
pub async fn find_active_airport_pricing(
    pool: &PgPool,
    location_id: Uuid,
    vehicle_id: Uuid,
) -> Result<Option<AirportPricingRow>, AppError> {
    let row = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        SELECT
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        FROM airport_pricing
        WHERE location_id = $1
          AND vehicle_id = $2
          AND status = 'active'
        "#,
    )
    .bind(location_id)
    .bind(vehicle_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Get an airport pricing row by id, whatever its status
pub async fn find_airport_pricing(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AirportPricingRow>, AppError> {
    let row = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        SELECT
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        FROM airport_pricing
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Whether any airport pricing row, active or not, exists for the pair
pub async fn airport_pricing_exists(
    pool: &PgPool,
    location_id: Uuid,
    vehicle_id: Uuid,
) -> Result<bool, AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM airport_pricing
            WHERE location_id = $1 AND vehicle_id = $2
        )
        "#,
    )
    .bind(location_id)
    .bind(vehicle_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Insert a new airport pricing row
pub async fn insert_airport_pricing(
    pool: &PgPool,
    config: &AirportPricingConfig,
) -> Result<AirportPricingRow, AppError> {
    let row = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        INSERT INTO airport_pricing (
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
        RETURNING
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        "#,
    )
    .bind(config.id)
    .bind(config.location_id)
    .bind(config.vehicle_id)
    .bind(Json(&config.distance_tiers))
    .bind(config.after_distance_threshold)
    .bind(config.after_distance_price_per_mile)
    .bind(Json(&config.extras))
    .bind(config.display_parking_inclusive)
    .bind(config.display_vat_inclusive)
    .bind(config.price_round_off)
    .bind(config.status.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replace the rate card of an airport pricing row
pub async fn update_airport_pricing(
    pool: &PgPool,
    config: &AirportPricingConfig,
) -> Result<Option<AirportPricingRow>, AppError> {
    let row = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        UPDATE airport_pricing SET
            distance_tiers = $2,
            after_distance_threshold = $3,
            after_distance_price_per_mile = $4,
            extras = $5,
            display_parking_inclusive = $6,
            display_vat_inclusive = $7,
            price_round_off = $8,
            status = $9,
            updated_at = NOW()
        WHERE id = $1
        RETURNING
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        "#,
    )
    .bind(config.id)
    .bind(Json(&config.distance_tiers))
    .bind(config.after_distance_threshold)
    .bind(config.after_distance_price_per_mile)
    .bind(Json(&config.extras))
    .bind(config.display_parking_inclusive)
    .bind(config.display_vat_inclusive)
    .bind(config.price_round_off)
    .bind(config.status.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Delete an airport pricing row, returning what was removed
pub async fn delete_airport_pricing(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AirportPricingRow>, AppError> {
    let row = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        DELETE FROM airport_pricing
        WHERE id = $1
        RETURNING
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Active airport pricing rows for a location
pub async fn list_airport_pricing_by_location(
    pool: &PgPool,
    location_id: Uuid,
) -> Result<Vec<AirportPricingRow>, AppError> {
    let rows = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        SELECT
            id, location_id, vehicle_id, distance_tiers,
            after_distance_threshold, after_distance_price_per_mile, extras,
            display_parking_inclusive, display_vat_inclusive, price_round_off,
            status, updated_at
        FROM airport_pricing
        WHERE location_id = $1
          AND status = 'active'
        ORDER BY vehicle_id
        "#,
    )
    .bind(location_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Active airport pricing rows for a vehicle
pub async fn list_airport_pricing_by_vehicle(
    pool: &PgPool,
    vehicle_id: Uuid,
) -> Result<Vec<AirportPricingRow>, AppError> {
    let rows = sqlx::query_as::<_, AirportPricingRow>(
        r#"
        SELECT
            p.id, p.location_id, p.vehicle_id, p.distance_tiers,
            p.after_distance_threshold, p.after_distance_price_per_mile, p.extras,
            p.display_parking_inclusive, p.display_vat_inclusive, p.price_round_off,
            p.status, p.updated_at
        FROM airport_pricing p
        JOIN special_locations l ON l.id = p.location_id
        WHERE p.vehicle_id = $1
          AND p.status = 'active'
        ORDER BY l.name
        "#,
    )
    .bind(vehicle_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
