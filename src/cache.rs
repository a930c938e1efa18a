//! In-memory caching using moka
//!
//! Pricing configs change only on admin writes and every quote for a vehicle
//! list reads them, so they are cached with a TTL and invalidated on write.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pricing::models::{AirportPricingConfig, PricingConfig, PricingKind, SpecialLocation};
use crate::pricing::queries;

const LOCATIONS_KEY: &str = "locations";

/// Application cache holding pricing configs and special locations
#[derive(Clone)]
pub struct AppCache {
    /// Standard pricing (vehicle:type:zone -> PricingConfig)
    pub standard_pricing: Cache<String, Arc<PricingConfig>>,
    /// Airport pricing (location:vehicle -> AirportPricingConfig, `None` when
    /// the vehicle has no airport rate card there)
    pub airport_pricing: Cache<String, Option<Arc<AirportPricingConfig>>>,
    /// Active special locations (singleton)
    pub locations: Cache<String, Arc<Vec<SpecialLocation>>>,
}

impl AppCache {
    /// Create a new cache instance; `ttl` bounds how stale a config can get
    pub fn new(ttl: Duration) -> Self {
        Self {
            standard_pricing: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),

            airport_pricing: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),

            locations: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            standard_pricing_size: self.standard_pricing.entry_count(),
            airport_pricing_size: self.airport_pricing.entry_count(),
            locations_cached: self.locations.entry_count() > 0,
        }
    }

    pub async fn cached_locations(&self) -> Option<Arc<Vec<SpecialLocation>>> {
        self.locations.get(LOCATIONS_KEY).await
    }

    pub async fn store_locations(
        &self,
        locations: Vec<SpecialLocation>,
    ) -> Arc<Vec<SpecialLocation>> {
        let locations = Arc::new(locations);
        self.locations
            .insert(LOCATIONS_KEY.to_string(), locations.clone())
            .await;
        locations
    }

    pub async fn invalidate_standard(&self, vehicle_id: Uuid, kind: PricingKind, zone: &str) {
        self.standard_pricing
            .invalidate(&Self::standard_key(vehicle_id, kind, zone))
            .await;
    }

    pub async fn invalidate_airport(&self, location_id: Uuid, vehicle_id: Uuid) {
        self.airport_pricing
            .invalidate(&Self::airport_key(location_id, vehicle_id))
            .await;
    }

    /// Generate cache key for standard pricing
    pub fn standard_key(vehicle_id: Uuid, kind: PricingKind, zone: &str) -> String {
        format!("{}:{}:{}", vehicle_id, kind, zone)
    }

    /// Generate cache key for airport pricing
    pub fn airport_key(location_id: Uuid, vehicle_id: Uuid) -> String {
        format!("{}:{}", location_id, vehicle_id)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub standard_pricing_size: u64,
    pub airport_pricing_size: u64,
    pub locations_cached: bool,
}

/// Start background cache warmer
///
/// Loads the special locations on startup and refreshes them every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        // first tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match queries::list_active_locations(db).await {
        Ok(rows) => {
            let locations: Vec<SpecialLocation> = rows.into_iter().map(Into::into).collect();
            info!(count = locations.len(), "Special locations loaded");
            cache.store_locations(locations).await;
        }
        Err(e) => warn!("Failed to warm special location cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_key_separates_type_and_zone() {
        let vehicle = Uuid::nil();
        assert_eq!(
            AppCache::standard_key(vehicle, PricingKind::P2p, "Entire UK Cover"),
            format!("{}:p2p:Entire UK Cover", vehicle),
        );
        assert_ne!(
            AppCache::standard_key(vehicle, PricingKind::P2p, "London"),
            AppCache::standard_key(vehicle, PricingKind::Hourly, "London"),
        );
    }

    #[tokio::test]
    async fn test_store_locations() {
        let cache = AppCache::default();
        assert!(cache.cached_locations().await.is_none());

        cache.store_locations(Vec::new()).await;
        assert!(cache.cached_locations().await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_airport_drops_cached_miss() {
        let cache = AppCache::default();
        let (location, vehicle) = (Uuid::new_v4(), Uuid::new_v4());
        let key = AppCache::airport_key(location, vehicle);

        cache.airport_pricing.insert(key.clone(), None).await;
        assert_eq!(cache.airport_pricing.get(&key).await, Some(None));

        cache.invalidate_airport(location, vehicle).await;
        assert!(cache.airport_pricing.get(&key).await.is_none());
    }
}
