use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::redis_client::RedisClient;
use crate::services::booking::BookingStatus;

const STATUS_KEY: &str = "booking:status";
// Счетчик поколений: растет при каждой инвалидации
const GENERATION_KEY: &str = "booking:status:generation";

/// Кеш ответа `showBookedSeat` в Redis. Источник истины всегда ledger:
/// ошибки Redis только логируются, а без Redis кеш ничего не делает.
///
/// Каждый сохраненный статус помечен поколением, прочитанным до похода в
/// ledger. Инвалидация увеличивает поколение, поэтому статус, посчитанный
/// до коммита и записанный после него, при чтении отбрасывается.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    ttl_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedStatus {
    generation: u64,
    status: BookingStatus,
}

impl CachedStatus {
    fn current(self, generation: u64) -> Option<BookingStatus> {
        (self.generation == generation).then_some(self.status)
    }
}

impl CacheService {
    pub fn new(redis: RedisClient, ttl_seconds: u64) -> Self {
        Self { redis: Some(redis), ttl_seconds }
    }

    pub fn disabled() -> Self {
        Self { redis: None, ttl_seconds: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some() && self.ttl_seconds > 0
    }

    /// Текущее поколение кеша. Читать до ledger; `None` значит "не сохранять".
    pub async fn generation(&self) -> Option<u64> {
        let redis = self.redis.as_ref().filter(|_| self.is_enabled())?;
        let mut conn = redis.conn.clone();

        let result: Result<Option<u64>, _> = conn.get(GENERATION_KEY).await;
        match result {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!("status cache generation read failed: {:?}", e);
                None
            }
        }
    }

    pub async fn get_status(&self) -> Option<BookingStatus> {
        let redis = self.redis.as_ref().filter(|_| self.is_enabled())?;
        let mut conn = redis.conn.clone();

        // статус и поколение одним запросом
        let result: Result<(Option<String>, Option<u64>), _> = redis::pipe()
            .get(STATUS_KEY)
            .get(GENERATION_KEY)
            .query_async(&mut conn)
            .await;
        let (data, generation) = match result {
            Ok(values) => values,
            Err(e) => {
                warn!("status cache read failed: {:?}", e);
                return None;
            }
        };

        match serde_json::from_str::<CachedStatus>(&data?) {
            Ok(cached) => cached.current(generation.unwrap_or(0)),
            Err(e) => {
                warn!("status cache holds unreadable payload: {:?}", e);
                None
            }
        }
    }

    pub async fn save_status(&self, generation: u64, status: &BookingStatus) {
        let Some(redis) = self.redis.as_ref().filter(|_| self.is_enabled()) else {
            return;
        };
        let cached = CachedStatus { generation, status: status.clone() };
        let data = match serde_json::to_string(&cached) {
            Ok(data) => data,
            Err(e) => {
                warn!("status cache serialize failed: {:?}", e);
                return;
            }
        };

        let mut conn = redis.conn.clone();
        let result: Result<(), _> = conn.set_ex(STATUS_KEY, data, self.ttl_seconds).await;
        if let Err(e) = result {
            warn!("status cache write failed: {:?}", e);
        }
    }

    // Инвалидировать после каждого коммита и сброса
    pub async fn invalidate_status(&self) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic().incr(GENERATION_KEY, 1u64).ignore().del(STATUS_KEY).ignore();

        let result: Result<(), _> = pipe.query_async(&mut conn).await;
        match result {
            Ok(()) => debug!("Invalidated booking status cache"),
            Err(e) => warn!("status cache invalidation failed: {:?}", e),
        }
    }

    // Прогрев кеша при старте
    pub async fn warmup(&self, generation: Option<u64>, status: &BookingStatus) {
        let Some(generation) = generation else {
            return;
        };
        self.save_status(generation, status).await;
        info!("Status cache warmed up: {} seats booked", status.booked_seats_count);
    }
}
