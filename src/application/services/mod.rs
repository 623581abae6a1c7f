//! Application services

pub mod loyalty;
pub mod parking;

pub use loyalty::{is_recurrent, LoyaltyService, RECURRENT_USER_THRESHOLD};
pub use parking::ParkingService;
