//! Fare computation
//!
//! Pure pricing of a parking stay. Nothing here touches storage or the clock:
//! loyalty is passed in as a precomputed flag.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::parking_spot::ParkingType;
use crate::shared::errors::FareError;

/// Stays up to and including this many minutes are free
pub const GRACE_PERIOD_MINUTES: i64 = 30;

/// Multiplier for stays longer than the grace period but shorter than an hour.
///
/// Inherited pricing policy: such stays are billed as one hour at 75%. This is
/// not a general rounding rule.
pub const SHORT_STAY_MULTIPLIER: Decimal = Decimal::from_parts(75, 0, 0, false, 2);

/// Discount granted to recurrent users (5%)
pub const RECURRENT_USER_DISCOUNT: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

pub const DEFAULT_CAR_RATE_PER_HOUR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);
pub const DEFAULT_BIKE_RATE_PER_HOUR: Decimal = Decimal::ONE;

/// Detailed fare result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareBreakdown {
    pub category: ParkingType,
    /// Whole minutes parked, remainder seconds dropped
    pub duration_minutes: i64,
    pub billed_hours: i64,
    pub rate_multiplier: Decimal,
    pub hourly_rate: Decimal,
    pub base_price: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl FareBreakdown {
    pub fn is_free(&self) -> bool {
        self.total.is_zero()
    }
}

/// Hourly rates per vehicle category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareSchedule {
    rates: BTreeMap<ParkingType, Decimal>,
}

impl FareSchedule {
    /// Schedule with no rates; every category is unsupported until added
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    /// Rates are expected to be non-negative; config loading enforces it.
    pub fn with_rate(mut self, category: ParkingType, rate_per_hour: Decimal) -> Self {
        self.rates.insert(category, rate_per_hour);
        self
    }

    pub fn hourly_rate(&self, category: ParkingType) -> Result<Decimal, FareError> {
        self.rates
            .get(&category)
            .copied()
            .ok_or_else(|| FareError::UnsupportedCategory(category.to_string()))
    }

    /// Price a stay.
    ///
    /// Stays longer than an hour are billed in whole hours only; the minutes
    /// past the last full hour are free. Inherited behavior, kept as is.
    pub fn quote(
        &self,
        entry_time: DateTime<Utc>,
        exit_time: Option<DateTime<Utc>>,
        category: ParkingType,
        is_recurrent_user: bool,
    ) -> Result<FareBreakdown, FareError> {
        let exit_time = match exit_time {
            Some(exit) if exit >= entry_time => exit,
            _ => {
                return Err(FareError::InvalidInterval {
                    entry: entry_time,
                    exit: exit_time,
                })
            }
        };
        let hourly_rate = self.hourly_rate(category)?;

        let duration_minutes = (exit_time - entry_time).num_minutes();

        let (billed_hours, rate_multiplier) = if duration_minutes <= GRACE_PERIOD_MINUTES {
            (0, Decimal::ZERO)
        } else if duration_minutes < 60 {
            (1, SHORT_STAY_MULTIPLIER)
        } else {
            (duration_minutes / 60, Decimal::ONE)
        };

        let overflow = || FareError::AmountOverflow(category);
        let base_price = rate_multiplier
            .checked_mul(Decimal::from(billed_hours))
            .and_then(|amount| amount.checked_mul(hourly_rate))
            .ok_or_else(overflow)?;

        let discount = if is_recurrent_user && !base_price.is_zero() {
            base_price
                .checked_mul(RECURRENT_USER_DISCOUNT)
                .ok_or_else(overflow)?
        } else {
            Decimal::ZERO
        };

        Ok(FareBreakdown {
            category,
            duration_minutes,
            billed_hours,
            rate_multiplier,
            hourly_rate,
            base_price,
            discount,
            total: base_price - discount,
        })
    }

    /// Amount owed for a stay
    pub fn compute_fare(
        &self,
        entry_time: DateTime<Utc>,
        exit_time: Option<DateTime<Utc>>,
        category: ParkingType,
        is_recurrent_user: bool,
    ) -> Result<Decimal, FareError> {
        self.quote(entry_time, exit_time, category, is_recurrent_user)
            .map(|breakdown| breakdown.total)
    }
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self::empty()
            .with_rate(ParkingType::Car, DEFAULT_CAR_RATE_PER_HOUR)
            .with_rate(ParkingType::Bike, DEFAULT_BIKE_RATE_PER_HOUR)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn fare(minutes: i64, category: ParkingType, recurrent: bool) -> Decimal {
        FareSchedule::default()
            .compute_fare(t0(), Some(t0() + Duration::minutes(minutes)), category, recurrent)
            .unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn grace_period_is_free_for_every_category_and_loyalty() {
        for minutes in [0, 1, 15, 29, 30] {
            for category in ParkingType::ALL {
                assert_eq!(fare(minutes, category, false), Decimal::ZERO);
                assert_eq!(fare(minutes, category, true), Decimal::ZERO);
            }
        }
    }

    #[test]
    fn seconds_past_the_grace_period_are_still_free() {
        let exit = t0() + Duration::minutes(30) + Duration::seconds(59);
        let price = FareSchedule::default()
            .compute_fare(t0(), Some(exit), ParkingType::Car, false)
            .unwrap();
        assert_eq!(price, Decimal::ZERO);
    }

    #[test]
    fn short_stay_bills_one_hour_at_three_quarters() {
        for minutes in [31, 45, 59] {
            assert_eq!(fare(minutes, ParkingType::Car, false), dec("1.125"));
            assert_eq!(fare(minutes, ParkingType::Bike, false), dec("0.75"));
        }
    }

    #[test]
    fn long_stay_bills_whole_hours_only() {
        assert_eq!(fare(60, ParkingType::Car, false), dec("1.5"));
        assert_eq!(fare(119, ParkingType::Car, false), dec("1.5"));
        assert_eq!(fare(120, ParkingType::Car, false), dec("3.0"));
        assert_eq!(fare(24 * 60, ParkingType::Bike, false), dec("24"));
    }

    #[test]
    fn bike_extra_minutes_past_full_hours_are_not_billed() {
        let breakdown = FareSchedule::default()
            .quote(t0(), Some(t0() + Duration::minutes(130)), ParkingType::Bike, false)
            .unwrap();
        assert_eq!(breakdown.duration_minutes, 130);
        assert_eq!(breakdown.billed_hours, 2);
        assert_eq!(breakdown.total, dec("2.00"));
    }

    #[test]
    fn recurrent_user_gets_five_percent_off() {
        assert_eq!(fare(90, ParkingType::Car, true), dec("1.425"));
        assert_eq!(fare(45, ParkingType::Car, true), dec("1.06875"));
        assert_eq!(fare(180, ParkingType::Bike, true), dec("2.85"));
    }

    #[test]
    fn breakdown_reports_discount() {
        let breakdown = FareSchedule::default()
            .quote(t0(), Some(t0() + Duration::minutes(90)), ParkingType::Car, true)
            .unwrap();
        assert_eq!(breakdown.base_price, dec("1.5"));
        assert_eq!(breakdown.discount, dec("0.075"));
        assert_eq!(breakdown.total, dec("1.425"));
        assert_eq!(breakdown.rate_multiplier, Decimal::ONE);
        assert!(!breakdown.is_free());
    }

    #[test]
    fn free_stay_has_no_discount() {
        let breakdown = FareSchedule::default()
            .quote(t0(), Some(t0() + Duration::minutes(20)), ParkingType::Car, true)
            .unwrap();
        assert!(breakdown.is_free());
        assert_eq!(breakdown.discount, Decimal::ZERO);
    }

    #[test]
    fn missing_exit_is_invalid_interval() {
        let err = FareSchedule::default()
            .compute_fare(t0(), None, ParkingType::Car, false)
            .unwrap_err();
        assert_eq!(
            err,
            FareError::InvalidInterval {
                entry: t0(),
                exit: None
            }
        );
    }

    #[test]
    fn exit_before_entry_is_invalid_interval() {
        let err = FareSchedule::default()
            .compute_fare(t0(), Some(t0() - Duration::minutes(1)), ParkingType::Bike, false)
            .unwrap_err();
        assert!(matches!(err, FareError::InvalidInterval { .. }));
    }

    #[test]
    fn category_without_rate_is_unsupported() {
        let schedule = FareSchedule::empty().with_rate(ParkingType::Car, dec("2"));
        let err = schedule
            .compute_fare(t0(), Some(t0() + Duration::minutes(10)), ParkingType::Bike, false)
            .unwrap_err();
        assert_eq!(err, FareError::UnsupportedCategory("BIKE".to_string()));
    }

    #[test]
    fn oversized_rate_is_an_error_not_a_panic() {
        let schedule = FareSchedule::empty().with_rate(ParkingType::Bike, Decimal::MAX);

        let err = schedule
            .compute_fare(t0(), Some(t0() + Duration::minutes(130)), ParkingType::Bike, false)
            .unwrap_err();
        assert_eq!(err, FareError::AmountOverflow(ParkingType::Bike));

        // One billed hour at full rate still fits
        let price = schedule
            .compute_fare(t0(), Some(t0() + Duration::minutes(60)), ParkingType::Bike, false)
            .unwrap();
        assert_eq!(price, Decimal::MAX);
    }

    #[test]
    fn custom_rates_are_used() {
        let schedule = FareSchedule::empty()
            .with_rate(ParkingType::Car, dec("4"))
            .with_rate(ParkingType::Bike, dec("2"));
        let exit = Some(t0() + Duration::minutes(150));
        assert_eq!(
            schedule.compute_fare(t0(), exit, ParkingType::Car, false).unwrap(),
            dec("8")
        );
        assert_eq!(
            schedule.compute_fare(t0(), exit, ParkingType::Bike, true).unwrap(),
            dec("3.8")
        );
    }
}
