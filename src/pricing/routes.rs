//! Pricing route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::models::{AirportPricingConfig, PricingConfig};
use super::requests::{
    AirportPricingRequest, AirportPricingUpdate, EstimateRequest, QuoteRequest,
    VehiclePricingRequest,
};
use super::responses::{ApiResponse, EstimateResponse, QuoteResponse};
use super::services;

/// Pricing API routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/quote", post(quote))
        .route("/api/pricing/estimate", post(estimate))
        .route(
            "/api/pricing/vehicles/:vehicle_id",
            get(list_vehicle_pricing).put(save_vehicle_pricing),
        )
        .route("/api/airport-pricing", post(create_airport_pricing))
        .route(
            "/api/airport-pricing/:id",
            put(update_airport_pricing).delete(delete_airport_pricing),
        )
        .route(
            "/api/airport-pricing/location/:location_id",
            get(airport_pricing_by_location),
        )
        .route(
            "/api/airport-pricing/vehicle/:vehicle_id",
            get(airport_pricing_by_vehicle),
        )
}

/// Quote a journey for one vehicle
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>> {
    let vehicle_id = req.vehicle_id;
    let input = req.into_input()?;

    let outcome = services::quote_journey(&state.db, &state.cache, input).await?;

    Ok(Json(ApiResponse::ok(QuoteResponse::from_outcome(
        vehicle_id, outcome,
    ))))
}

/// Quick P2P/hourly figures for a vehicle listing
async fn estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<EstimateResponse>>> {
    let estimate = services::estimate(
        &state.db,
        &state.cache,
        req.vehicle_id,
        &req.coverage_zone,
        req.distance_miles()?,
        req.hours()?,
    )
    .await?;

    Ok(Json(ApiResponse::ok(EstimateResponse::new(
        req.vehicle_id,
        estimate,
    ))))
}

async fn list_vehicle_pricing(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PricingConfig>>>> {
    let configs = services::list_vehicle_pricing(&state.db, vehicle_id).await?;
    Ok(Json(ApiResponse::list(configs)))
}

async fn save_vehicle_pricing(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
    Json(req): Json<VehiclePricingRequest>,
) -> Result<Json<ApiResponse<PricingConfig>>> {
    let saved =
        services::save_vehicle_pricing(&state.db, &state.cache, req.into_config(vehicle_id))
            .await?;

    Ok(Json(ApiResponse::with_message(
        saved,
        "Pricing saved successfully",
    )))
}

async fn create_airport_pricing(
    State(state): State<AppState>,
    Json(req): Json<AirportPricingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AirportPricingConfig>>)> {
    let created =
        services::create_airport_pricing(&state.db, &state.cache, req.into_config()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            created,
            "Airport pricing created successfully",
        )),
    ))
}

async fn update_airport_pricing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<AirportPricingUpdate>,
) -> Result<Json<ApiResponse<AirportPricingConfig>>> {
    let updated = services::update_airport_pricing(&state.db, &state.cache, id, changes).await?;

    Ok(Json(ApiResponse::with_message(
        updated,
        "Airport pricing updated successfully",
    )))
}

async fn delete_airport_pricing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AirportPricingConfig>>> {
    let deleted = services::delete_airport_pricing(&state.db, &state.cache, id).await?;

    Ok(Json(ApiResponse::with_message(
        deleted,
        "Airport pricing deleted successfully",
    )))
}

async fn airport_pricing_by_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AirportPricingConfig>>>> {
    let configs = services::list_airport_pricing_for_location(&state.db, location_id).await?;
    Ok(Json(ApiResponse::list(configs)))
}

async fn airport_pricing_by_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AirportPricingConfig>>>> {
    let configs = services::list_airport_pricing_for_vehicle(&state.db, vehicle_id).await?;
    Ok(Json(ApiResponse::list(configs)))
}
