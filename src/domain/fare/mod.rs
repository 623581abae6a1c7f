//! Fare engine
//!
//! Grace period, hourly rates per category and the recurrent-user discount.

pub mod model;

pub use model::{
    FareBreakdown, FareSchedule, DEFAULT_BIKE_RATE_PER_HOUR, DEFAULT_CAR_RATE_PER_HOUR,
    GRACE_PERIOD_MINUTES, RECURRENT_USER_DISCOUNT, SHORT_STAY_MULTIPLIER,
};
