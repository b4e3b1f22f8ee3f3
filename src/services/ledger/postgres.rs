use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::{check_proposal, BookingLedger};
use crate::database::Database;
use crate::error::BookingError;
use crate::models::{BatchClock, BookingRecord, SeatNo};

/// Ledger поверх таблицы `bookings`. Уникальность `seat_no` держит сама БД:
/// вставка идет через `ON CONFLICT DO NOTHING`, и если вставилось меньше строк,
/// чем предложено, транзакция откатывается целиком.
pub struct PgBookingLedger {
    db: Database,
    clock: BatchClock,
}

impl PgBookingLedger {
    pub fn new(db: Database) -> Self {
        Self { db, clock: BatchClock::new() }
    }
}

#[async_trait]
impl BookingLedger for PgBookingLedger {
    async fn read_all(&self) -> Result<Vec<BookingRecord>, BookingError> {
        let records = sqlx::query_as::<_, BookingRecord>(
            "SELECT seat_no, requester_id, created_at FROM bookings ORDER BY seat_no",
        )
        .fetch_all(&self.db.pool)
        .await?;
        Ok(records)
    }

    async fn commit(
        &self,
        requester_id: i64,
        seats: &[SeatNo],
    ) -> Result<Vec<BookingRecord>, BookingError> {
        check_proposal(seats)?;

        let created_at = self.clock.next();
        let mut tx = self.db.pool.begin().await?;

        let inserted: Vec<SeatNo> = sqlx::query_scalar::<_, SeatNo>(
            r#"
            INSERT INTO bookings (seat_no, requester_id, created_at)
            SELECT seat_no, $2, $3
            FROM UNNEST($1::INTEGER[]) AS proposed(seat_no)
            ON CONFLICT (seat_no) DO NOTHING
            RETURNING seat_no
            "#,
        )
        .bind(seats.to_vec())
        .bind(requester_id)
        .bind(created_at)
        .fetch_all(&mut *tx)
        .await?;

        if inserted.len() != seats.len() {
            tx.rollback().await?;
            let inserted: BTreeSet<SeatNo> = inserted.into_iter().collect();
            let taken: Vec<SeatNo> = seats
                .iter()
                .copied()
                .filter(|seat| !inserted.contains(seat))
                .collect();
            warn!("commit for requester {} conflicts on seats {:?}", requester_id, taken);
            return Err(BookingError::AllocationConflict { seats: taken });
        }

        tx.commit().await?;
        debug!("committed {} seats for requester {}", seats.len(), requester_id);

        Ok(seats
            .iter()
            .map(|&seat_no| BookingRecord { seat_no, requester_id, created_at })
            .collect())
    }

    async fn reset(&self) -> Result<u64, BookingError> {
        let mut tx = self.db.pool.begin().await?;

        // эксклюзивная блокировка: ни один коммит не вклинится посреди удаления
        sqlx::query("LOCK TABLE bookings IN ACCESS EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM bookings")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!("RESET: removed {} bookings", removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    //! Требуют живой PostgreSQL: `DATABASE_URL=... cargo test -- --ignored`

    use super::*;
    use std::sync::Arc;

    async fn ledger() -> PgBookingLedger {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::new(&url, 5).await.expect("connect");
        db.run_migrations().await.expect("migrations");
        let ledger = PgBookingLedger::new(db);
        ledger.reset().await.unwrap();
        ledger
    }

    // Один тест на всю таблицу: параллельные тесты мешали бы друг другу через reset.
    #[tokio::test]
    #[ignore]
    async fn pg_ledger_commit_conflict_and_reset() {
        let ledger = Arc::new(ledger().await);

        let batch = ledger.commit(1, &[1, 2, 3]).await.unwrap();
        assert_eq!(batch.len(), 3);

        let err = ledger.commit(2, &[3, 4]).await.unwrap_err();
        assert!(matches!(err, BookingError::AllocationConflict { ref seats } if seats == &vec![3]));

        let records = ledger.read_all().await.unwrap();
        let seats: Vec<SeatNo> = records.iter().map(|r| r.seat_no).collect();
        assert_eq!(seats, vec![1, 2, 3]);
        assert!(records.iter().all(|r| r.created_at == records[0].created_at));

        let handles: Vec<_> = (0..16)
            .map(|requester| {
                let ledger = ledger.clone();
                tokio::spawn(async move { ledger.commit(requester, &[10, 11]).await })
            })
            .collect();
        let results = futures::future::join_all(handles).await;
        let ok = results.into_iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        assert_eq!(ok, 1);
        assert_eq!(ledger.read_all().await.unwrap().len(), 5);

        assert_eq!(ledger.reset().await.unwrap(), 5);
        assert!(ledger.read_all().await.unwrap().is_empty());
    }
}
