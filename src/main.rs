//! Momentum Rides Server - car rental marketplace
//!
//! REST API server for the fleet catalog and booking management.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use momentum_rides::{
    api,
    config::{AppConfig, LoggingConfig, StorageBackend},
    repository::{BookingStore, CarStore, MemoryStore, Repository},
    services::Services,
    AppState,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("momentum_rides={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Open the configured store; PostgreSQL is migrated before use
async fn open_stores(config: &AppConfig) -> anyhow::Result<(Arc<dyn CarStore>, Arc<dyn BookingStore>)> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations completed");

            let repository = Arc::new(Repository::new(pool));
            let cars: Arc<dyn CarStore> = repository.clone();
            let bookings: Arc<dyn BookingStore> = repository;
            Ok((cars, bookings))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            let cars: Arc<dyn CarStore> = store.clone();
            let bookings: Arc<dyn BookingStore> = store;
            Ok((cars, bookings))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);
    tracing::info!("Starting Momentum Rides Server v{}", env!("CARGO_PKG_VERSION"));

    let (cars, bookings) = open_stores(&config).await?;
    let services = Services::new(cars, bookings, config.auth.clone());

    if config.seed.enabled {
        let seeded = services.catalog.seed_if_empty(&config.seed.cars).await?;
        if seeded > 0 {
            tracing::info!("Seeded {} cars", seeded);
        }
    }

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
