pub mod venue;
pub mod booking;

pub use venue::{SeatMap, SeatNo, VenueError};
pub use booking::{BatchClock, BookingRecord};
