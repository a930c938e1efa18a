//! chauffeur-fares: fare pricing HTTP service

use sqlx::postgres::PgPoolOptions;

use chauffeur_fares::cache::{start_cache_warmer, AppCache};
use chauffeur_fares::config::Config;
use chauffeur_fares::routes::create_router;
use chauffeur_fares::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chauffeur_fares=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "Connected to database"
    );

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&db).await?;
        tracing::info!("Migrations applied");
    }

    let cache = AppCache::new(config.cache_ttl);
    tokio::spawn(start_cache_warmer(cache.clone(), db.clone()));

    let state = AppState::new(db, cache);
    let app = create_router(state, config.cors_permissive);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("chauffeur-fares listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
