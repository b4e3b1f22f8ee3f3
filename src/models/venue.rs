use thiserror::Error;

/// Номер места в зале, всегда в диапазоне `[1, total_seats]`.
pub type SeatNo = i32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VenueError {
    #[error("seats_per_row must be > 0")]
    EmptyRow,
    #[error("last_row_seats must be in [1, {seats_per_row}], got {last_row_seats}")]
    LastRowOutOfRange { seats_per_row: i32, last_row_seats: i32 },
    #[error("total_seats {total_seats} is not (rows-1)*{seats_per_row} + {last_row_seats}")]
    InconsistentGeometry {
        total_seats: i32,
        seats_per_row: i32,
        last_row_seats: i32,
    },
}

/// Static venue geometry. Rows are filled left to right, every row except the
/// last one holds `seats_per_row` seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatMap {
    total_seats: i32,
    seats_per_row: i32,
    last_row_seats: i32,
}

impl SeatMap {
    pub fn new(total_seats: i32, seats_per_row: i32, last_row_seats: i32) -> Result<Self, VenueError> {
        if seats_per_row <= 0 {
            return Err(VenueError::EmptyRow);
        }
        if last_row_seats < 1 || last_row_seats > seats_per_row {
            return Err(VenueError::LastRowOutOfRange { seats_per_row, last_row_seats });
        }
        let full_rows_part = total_seats.checked_sub(last_row_seats).unwrap_or(-1);
        if full_rows_part < 0 || full_rows_part % seats_per_row != 0 {
            return Err(VenueError::InconsistentGeometry {
                total_seats,
                seats_per_row,
                last_row_seats,
            });
        }

        Ok(Self { total_seats, seats_per_row, last_row_seats })
    }

    pub fn total_seats(&self) -> i32 {
        self.total_seats
    }

    pub fn seats_per_row(&self) -> i32 {
        self.seats_per_row
    }

    pub fn last_row_seats(&self) -> i32 {
        self.last_row_seats
    }

    /// `ceil(total_seats / seats_per_row)`. Счет идет от полных рядов, чтобы не
    /// переполнить `i32` у залов размером около `i32::MAX`.
    pub fn row_count(&self) -> i32 {
        (self.total_seats - self.last_row_seats) / self.seats_per_row + 1
    }

    /// Первое и последнее место ряда (включительно). `row` in `[1, row_count()]`.
    pub fn row_bounds(&self, row: i32) -> (SeatNo, SeatNo) {
        let start = (row - 1) * self.seats_per_row + 1;
        let width = if row == self.row_count() {
            self.last_row_seats
        } else {
            self.seats_per_row
        };
        (start, start + (width - 1))
    }

    pub fn row_of(&self, seat: SeatNo) -> i32 {
        (seat - 1).div_euclid(self.seats_per_row) + 1
    }

    pub fn contains(&self, seat: SeatNo) -> bool {
        (1..=self.total_seats).contains(&seat)
    }

    pub fn seats(&self) -> impl Iterator<Item = SeatNo> {
        1..=self.total_seats
    }

    pub fn rows(&self) -> impl Iterator<Item = i32> {
        1..=self.row_count()
    }
}
