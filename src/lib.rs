//! Fare pricing service for a chauffeur car-booking backend.
//!
//! Quotes point-to-point, hourly and airport journeys from per-vehicle rate
//! cards stored in Postgres, and lets the admin panel maintain those cards.

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;
pub mod routes;

use sqlx::PgPool;

use crate::cache::AppCache;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
}

impl AppState {
    pub fn new(db: PgPool, cache: AppCache) -> Self {
        Self { db, cache }
    }
}
