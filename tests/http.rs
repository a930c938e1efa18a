//! Router tests for requests that are answered before any database access

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use chauffeur_fares::cache::AppCache;
use chauffeur_fares::routes::create_router;
use chauffeur_fares::AppState;

fn app() -> Router {
    // never connected: every request below is rejected or answered first
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/chauffeur_fares_test")
        .expect("lazy pool");
    create_router(AppState::new(db, AppCache::default()), false)
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "chauffeur-fares");
    assert_eq!(body["cache"]["locationsCached"], false);
}

#[tokio::test]
async fn quote_without_distance_is_bad_request() {
    let request = json_request(
        "POST",
        "/api/pricing/quote",
        json!({ "vehicleId": Uuid::new_v4(), "bookingType": "p2p" }),
    );

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "distanceKm or distanceMiles is required");
}

#[tokio::test]
async fn oversized_distance_is_bad_request() {
    let request = json_request(
        "POST",
        "/api/pricing/quote",
        json!({ "vehicleId": Uuid::new_v4(), "distanceMiles": "79228162514264337593543950335" }),
    );

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "distanceMiles must not exceed 100000");
}

#[tokio::test]
async fn vehicle_pricing_with_gap_in_tiers_is_rejected() {
    let uri = format!("/api/pricing/vehicles/{}", Uuid::new_v4());
    let request = json_request(
        "PUT",
        &uri,
        json!({
            "pricingType": "p2p",
            "pointToPoint": {
                "distanceTiers": [
                    { "fromDistance": 0, "toDistance": 8, "price": 74.5, "type": "fixed" },
                    { "fromDistance": 10, "toDistance": 30, "price": 2.5, "type": "per_mile" }
                ]
            }
        }),
    );

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid pricing configuration");
    let errors = body["errors"].as_array().expect("errors list");
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap_or_default().contains("gap")));
}

#[tokio::test]
async fn airport_pricing_without_tiers_is_rejected() {
    let request = json_request(
        "POST",
        "/api/airport-pricing",
        json!({
            "locationId": Uuid::new_v4(),
            "vehicleId": Uuid::new_v4(),
            "distanceTiers": []
        }),
    );

    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0], "distanceTiers must not be empty");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let request = Request::builder()
        .uri("/api/pricing/nothing-here")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
