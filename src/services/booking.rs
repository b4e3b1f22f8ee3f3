//! booking.rs
//!
//! Сервис бронирования: связывает геометрию зала, снимок занятости, аллокатор
//! и ledger.
//!
//! Снимок и подбор мест выполняются без блокировок и параллельно для всех
//! запросов. Сериализуется только коммит внутри ledger. Если между снимком и
//! коммитом кто-то занял часть мест, запрос повторяется со свежим снимком, но
//! не больше `max_attempts` раз; после этого клиент получает
//! `InsufficientCapacity` с актуальным числом свободных мест.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::BookingError;
use crate::models::booking::latest_batch;
use crate::models::{SeatMap, SeatNo};
use crate::services::allocator::{self, Allocation};
use crate::services::ledger::BookingLedger;
use crate::services::occupancy::OccupancySnapshot;

/// Заявка на места. Не сохраняется.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRequest {
    pub requester_id: Option<i64>,
    pub seat_count: i64,
}

impl AllocationRequest {
    pub fn new(requester_id: i64, seat_count: i64) -> Self {
        Self { requester_id: Some(requester_id), seat_count }
    }

    /// Checked before any read of the ledger. A requester id must be positive.
    pub fn validate(&self, map: &SeatMap) -> Result<(i64, usize), BookingError> {
        let requester_id = self
            .requester_id
            .filter(|id| *id > 0)
            .ok_or_else(|| BookingError::InvalidRequest("User ID is required.".to_string()))?;
        let seat_count = allocator::validate_seat_count(map, self.seat_count)?;
        Ok((requester_id, seat_count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatus {
    pub seat_numbers: Vec<SeatNo>,
    pub booked_seats_count: usize,
    pub available_seats: usize,
    /// Number of records in the most recent commit.
    pub current_booking_key: usize,
}

#[derive(Clone)]
pub struct BookingService {
    map: SeatMap,
    ledger: Arc<dyn BookingLedger>,
    max_attempts: u32,
}

impl BookingService {
    pub fn new(map: SeatMap, ledger: Arc<dyn BookingLedger>, max_attempts: u32) -> Self {
        Self {
            map,
            ledger,
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn snapshot(&self) -> Result<OccupancySnapshot, BookingError> {
        let records = self.ledger.read_all().await?;
        Ok(OccupancySnapshot::from_records(&records))
    }

    pub async fn allocate(&self, request: &AllocationRequest) -> Result<Allocation, BookingError> {
        let (requester_id, seat_count) = request.validate(&self.map)?;

        for attempt in 1..=self.max_attempts {
            let snapshot = self.snapshot().await?;
            let allocation = allocator::allocate(&self.map, &snapshot, seat_count)?;

            match self.ledger.commit(requester_id, &allocation.seats).await {
                Ok(_) => {
                    info!(
                        "requester {} booked seats {:?} ({:?}, attempt {})",
                        requester_id, allocation.seats, allocation.placement, attempt
                    );
                    return Ok(allocation);
                }
                Err(BookingError::AllocationConflict { seats }) => {
                    warn!(
                        "attempt {}/{} for requester {} lost seats {:?}, retrying with fresh snapshot",
                        attempt, self.max_attempts, requester_id, seats
                    );
                    tokio::task::yield_now().await;
                }
                Err(e) => return Err(e),
            }
        }

        let available = self.snapshot().await?.available(&self.map);
        warn!(
            "requester {} gave up after {} conflicting attempts, {} seats left",
            requester_id, self.max_attempts, available
        );
        Err(BookingError::InsufficientCapacity { available })
    }

    pub async fn status(&self) -> Result<BookingStatus, BookingError> {
        let records = self.ledger.read_all().await?;
        let snapshot = OccupancySnapshot::from_records(&records);

        Ok(BookingStatus {
            seat_numbers: records.iter().map(|r| r.seat_no).collect(),
            booked_seats_count: records.len(),
            available_seats: snapshot.available(&self.map),
            current_booking_key: latest_batch(&records).len(),
        })
    }

    pub async fn reset(&self) -> Result<u64, BookingError> {
        warn!("RESET: removing all bookings");
        let removed = self.ledger.reset().await?;
        warn!("RESET: done, {} bookings removed", removed);
        Ok(removed)
    }
}
