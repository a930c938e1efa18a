//! HTTP routes

pub mod health;

use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pricing;
use crate::AppState;

/// Create the combined router
pub fn create_router(state: AppState, cors_permissive: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health::health_check))
        .merge(pricing::router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let app = if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.with_state(state)
}
