pub mod config;
pub mod database;
pub mod redis_client;
pub mod models;
pub mod error;
pub mod controllers;
pub mod cache;
pub mod services;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use services::booking::BookingService;
use services::ledger::{BookingLedger, MemoryBookingLedger, PgBookingLedger};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub booking: BookingService,
    pub cache: cache::CacheService,
    pub config: config::Config,
}

impl AppState {
    /// Подключает хранилища по конфигу: PostgreSQL если задан `DATABASE_URL`,
    /// иначе ledger в памяти; Redis-кеш статуса если задан `REDIS_URL`.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let ledger: Arc<dyn BookingLedger> = match &config.database.url {
            Some(url) => {
                let db = database::Database::new(url, config.database.pool_size).await?;
                db.run_migrations().await?;
                Arc::new(PgBookingLedger::new(db))
            }
            None => {
                warn!("DATABASE_URL is not set, bookings are kept in memory only");
                Arc::new(MemoryBookingLedger::new())
            }
        };

        let cache = match &config.redis.url {
            Some(url) => match redis_client::RedisClient::new(url).await {
                Ok(redis) => cache::CacheService::new(redis, config.redis.status_ttl_seconds),
                Err(e) => {
                    warn!("Redis unavailable, status cache disabled: {:?}", e);
                    cache::CacheService::disabled()
                }
            },
            None => cache::CacheService::disabled(),
        };

        let state = Self::from_parts(config, ledger, cache)?;

        let generation = state.cache.generation().await;
        let status = state.booking.status().await?;
        info!(
            "Ledger loaded: {} seats booked, {} available",
            status.booked_seats_count, status.available_seats
        );
        state.cache.warmup(generation, &status).await;

        Ok(state)
    }

    pub fn from_parts(
        config: config::Config,
        ledger: Arc<dyn BookingLedger>,
        cache: cache::CacheService,
    ) -> Result<Arc<Self>, config::ConfigError> {
        let seat_map = config.venue.seat_map()?;
        let booking = BookingService::new(seat_map, ledger, config.allocation.max_attempts);
        Ok(Arc::new(Self { booking, cache, config }))
    }
}

/// Full HTTP surface: banner, health check and the booking API under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.app.cors_origin.as_deref());

    Router::new()
        .route("/", get(|| async { "Seat Allocator API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|origin| origin.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}
