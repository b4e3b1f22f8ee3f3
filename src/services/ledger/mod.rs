//! Хранилище бронирований.
//!
//! Ledger владеет записями `bookings` и гарантирует, что один номер места
//! никогда не будет закреплен дважды. Аллокатор о хранилище ничего не знает:
//! он получает снимок через [`BookingLedger::read_all`] и предлагает места,
//! а [`BookingLedger::commit`] атомарно перепроверяет и записывает их.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::error::BookingError;
use crate::models::{BookingRecord, SeatNo};

pub mod memory;
pub mod postgres;

pub use memory::MemoryBookingLedger;
pub use postgres::PgBookingLedger;

#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// All live records, ordered by seat number.
    async fn read_all(&self) -> Result<Vec<BookingRecord>, BookingError>;

    /// Books every seat in `seats` for `requester_id` with one shared `created_at`,
    /// or nothing at all. Fails with [`BookingError::AllocationConflict`] when any
    /// seat is already taken.
    async fn commit(
        &self,
        requester_id: i64,
        seats: &[SeatNo],
    ) -> Result<Vec<BookingRecord>, BookingError>;

    /// Deletes every record. Returns how many were removed.
    async fn reset(&self) -> Result<u64, BookingError>;
}

/// Общая проверка предложенного набора мест перед записью.
fn check_proposal(seats: &[SeatNo]) -> Result<(), BookingError> {
    if seats.is_empty() {
        return Err(BookingError::InvalidRequest("No seats to book".to_string()));
    }
    let distinct: BTreeSet<SeatNo> = seats.iter().copied().collect();
    if distinct.len() != seats.len() {
        return Err(BookingError::InvalidRequest(
            "Duplicate seat numbers in booking".to_string(),
        ));
    }
    Ok(())
}
