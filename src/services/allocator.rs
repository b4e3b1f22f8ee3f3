//! allocator.rs
//!
//! Подбор мест под заявку. Чистая функция над снимком занятости:
//!
//! 1.  **Ряд целиком**: ряды по возрастанию, первый ряд, где свободно `>= k` мест,
//!     отдает `k` свободных мест с наименьшими номерами.
//! 2.  **Ближайшие места**: если ни один ряд не подошел, берем все свободные места
//!     зала и ищем окно из `k` подряд идущих свободных номеров с минимальным
//!     разбросом `last - first`. При равном разбросе побеждает более раннее окно.

use crate::error::BookingError;
use crate::models::{SeatMap, SeatNo};
use crate::services::occupancy::OccupancySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    RowContiguous { row: i32 },
    NearestSpan { span: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub seats: Vec<SeatNo>,
    pub placement: Placement,
}

/// Rejects seat counts outside `[1, seats_per_row]`.
pub fn validate_seat_count(map: &SeatMap, seat_count: i64) -> Result<usize, BookingError> {
    if seat_count < 1 || seat_count > map.seats_per_row() as i64 {
        return Err(BookingError::InvalidRequest(format!(
            "You can reserve between 1 and {} seats at a time.",
            map.seats_per_row()
        )));
    }
    Ok(seat_count as usize)
}

pub fn allocate(
    map: &SeatMap,
    snapshot: &OccupancySnapshot,
    seat_count: usize,
) -> Result<Allocation, BookingError> {
    let k = validate_seat_count(map, seat_count as i64)?;

    if let Some(allocation) = allocate_in_row(map, snapshot, k) {
        return Ok(allocation);
    }

    let free = snapshot.free_seats(map);
    if free.len() < k {
        return Err(BookingError::InsufficientCapacity { available: free.len() });
    }

    let (start, span) = tightest_window(&free, k);
    Ok(Allocation {
        seats: free[start..start + k].to_vec(),
        placement: Placement::NearestSpan { span },
    })
}

fn allocate_in_row(map: &SeatMap, snapshot: &OccupancySnapshot, k: usize) -> Option<Allocation> {
    map.rows().find_map(|row| {
        let mut free = snapshot.free_in_row(map, row);
        if free.len() < k {
            return None;
        }
        free.truncate(k);
        Some(Allocation {
            seats: free,
            placement: Placement::RowContiguous { row },
        })
    })
}

/// Index of the first window of `k` elements with the smallest span, and that span.
/// `free` is ascending and holds at least `k` elements.
fn tightest_window(free: &[SeatNo], k: usize) -> (usize, i32) {
    let mut best = (0, i32::MAX);
    for (i, window) in free.windows(k).enumerate() {
        let span = window[k - 1] - window[0];
        // только строго меньший разброс вытесняет текущий вариант
        if span < best.1 {
            best = (i, span);
        }
    }
    best
}
