use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::atomic::{AtomicI64, Ordering};

use super::venue::SeatNo;

/// Одна строка таблицы `bookings`: место закреплено за заявителем.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct BookingRecord {
    pub seat_no: SeatNo,
    pub requester_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Seats of the most recent commit. All records of one commit share `created_at`.
pub fn latest_batch(records: &[BookingRecord]) -> Vec<&BookingRecord> {
    let Some(latest) = records.iter().map(|r| r.created_at).max() else {
        return Vec::new();
    };
    records.iter().filter(|r| r.created_at == latest).collect()
}

/// Выдает один timestamp на коммит. Значения строго возрастают (шаг 1 мкс),
/// поэтому два коммита никогда не попадут в одну "пачку".
#[derive(Debug, Default)]
pub struct BatchClock {
    last_micros: AtomicI64,
}

impl BatchClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let prev = self
            .last_micros
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        let micros = now.max(prev + 1);
        Utc.timestamp_micros(micros).single().unwrap_or_else(Utc::now)
    }
}
