use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{SeatMap, VenueError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{name} must be at least {min}")]
    TooSmall { name: &'static str, min: u32 },
    #[error("invalid venue geometry: {0}")]
    Venue(#[from] VenueError),
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub venue: VenueConfig,
    pub allocation: AllocationConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub cors_origin: Option<String>,
}

// Настройки базы данных. Без DATABASE_URL брони живут в памяти процесса.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки Redis (кеш статуса зала, опционально)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
    pub status_ttl_seconds: u64,
}

// Геометрия зала
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct VenueConfig {
    pub total_seats: i32,
    pub seats_per_row: i32,
    pub last_row_seats: i32,
}

impl VenueConfig {
    pub fn seat_map(&self) -> Result<SeatMap, VenueError> {
        SeatMap::new(self.total_seats, self.seats_per_row, self.last_row_seats)
    }
}

// Повторные попытки при гонке за места
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AllocationConfig {
    pub max_attempts: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any key/value source. Venue geometry is validated here
    /// so a broken hall never reaches the allocator.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            app: AppConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&lookup, "PORT", 8000, "port number")?,
                environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
                rust_log: lookup("RUST_LOG")
                    .unwrap_or_else(|| "seat_allocator=debug,tower_http=debug".to_string()),
                cors_origin: lookup("CORS_ORIGIN").filter(|origin| !origin.is_empty()),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                pool_size: parse(&lookup, "DB_POOL_SIZE", 20, "number")?,
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
                status_ttl_seconds: parse(&lookup, "STATUS_CACHE_TTL_SECONDS", 5, "number")?,
            },
            venue: VenueConfig {
                total_seats: parse(&lookup, "VENUE_TOTAL_SEATS", 80, "number")?,
                seats_per_row: parse(&lookup, "VENUE_SEATS_PER_ROW", 7, "number")?,
                last_row_seats: parse(&lookup, "VENUE_LAST_ROW_SEATS", 3, "number")?,
            },
            allocation: AllocationConfig {
                max_attempts: parse(&lookup, "ALLOCATION_MAX_ATTEMPTS", 3, "number")?,
            },
        };

        if config.allocation.max_attempts < 1 {
            return Err(ConfigError::TooSmall { name: "ALLOCATION_MAX_ATTEMPTS", min: 1 });
        }
        config.venue.seat_map()?;

        Ok(config)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
