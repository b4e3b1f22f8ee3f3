use std::collections::BTreeSet;

use crate::models::{BookingRecord, SeatMap, SeatNo};

/// Immutable point-in-time view of booked seat numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancySnapshot {
    booked: BTreeSet<SeatNo>,
}

impl OccupancySnapshot {
    pub fn from_records(records: &[BookingRecord]) -> Self {
        records.iter().map(|r| r.seat_no).collect()
    }

    pub fn is_booked(&self, seat: SeatNo) -> bool {
        self.booked.contains(&seat)
    }

    pub fn booked_count(&self) -> usize {
        self.booked.len()
    }

    /// Свободные места в диапазоне `[start, end]` по возрастанию.
    pub fn free_between(&self, start: SeatNo, end: SeatNo) -> impl Iterator<Item = SeatNo> + '_ {
        (start..=end).filter(move |seat| !self.booked.contains(seat))
    }

    pub fn free_in_row(&self, map: &SeatMap, row: i32) -> Vec<SeatNo> {
        let (start, end) = map.row_bounds(row);
        self.free_between(start, end).collect()
    }

    pub fn free_seats(&self, map: &SeatMap) -> Vec<SeatNo> {
        self.free_between(1, map.total_seats()).collect()
    }

    /// Seats outside the venue (left over from a different geometry) are not counted.
    pub fn available(&self, map: &SeatMap) -> usize {
        let booked_inside = self.booked.iter().filter(|s| map.contains(**s)).count();
        map.total_seats() as usize - booked_inside
    }
}

impl FromIterator<SeatNo> for OccupancySnapshot {
    fn from_iter<I: IntoIterator<Item = SeatNo>>(iter: I) -> Self {
        Self { booked: iter.into_iter().collect() }
    }
}
