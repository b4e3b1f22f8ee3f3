pub mod allocator;
pub mod booking;
pub mod ledger;
pub mod occupancy;
