use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{check_proposal, BookingLedger};
use crate::error::BookingError;
use crate::models::{BatchClock, BookingRecord, SeatNo};

/// In-process ledger. Commit and reset hold the write lock only for
/// verify+insert (or clear), readers never block each other.
#[derive(Debug, Default)]
pub struct MemoryBookingLedger {
    records: RwLock<BTreeMap<SeatNo, BookingRecord>>,
    clock: BatchClock,
}

impl MemoryBookingLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingLedger for MemoryBookingLedger {
    async fn read_all(&self) -> Result<Vec<BookingRecord>, BookingError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn commit(
        &self,
        requester_id: i64,
        seats: &[SeatNo],
    ) -> Result<Vec<BookingRecord>, BookingError> {
        check_proposal(seats)?;

        let mut records = self.records.write().await;

        let taken: Vec<SeatNo> = seats
            .iter()
            .copied()
            .filter(|seat| records.contains_key(seat))
            .collect();
        if !taken.is_empty() {
            warn!("commit for requester {} conflicts on seats {:?}", requester_id, taken);
            return Err(BookingError::AllocationConflict { seats: taken });
        }

        let created_at = self.clock.next();
        let batch: Vec<BookingRecord> = seats
            .iter()
            .map(|&seat_no| BookingRecord { seat_no, requester_id, created_at })
            .collect();
        for record in &batch {
            records.insert(record.seat_no, record.clone());
        }

        debug!("committed {} seats for requester {}", batch.len(), requester_id);
        Ok(batch)
    }

    async fn reset(&self) -> Result<u64, BookingError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}
