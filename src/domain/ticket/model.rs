//! Ticket domain entity

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::parking_spot::ParkingSpot;
use crate::shared::errors::FareError;

/// One vehicle stay. Open while `exit_time` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: Uuid,
    pub vehicle_registration: String,
    pub spot: ParkingSpot,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Meaningless until the ticket is closed; see [`Ticket::billed_price`]
    pub price: Decimal,
}

impl Ticket {
    pub fn open(
        vehicle_registration: impl Into<String>,
        spot: ParkingSpot,
        entry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_registration: vehicle_registration.into(),
            spot,
            entry_time,
            exit_time: None,
            price: Decimal::ZERO,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Closed copy of this ticket; `self` is left open.
    pub fn close(&self, exit_time: DateTime<Utc>, price: Decimal) -> Result<Ticket, FareError> {
        if exit_time < self.entry_time {
            return Err(FareError::InvalidInterval {
                entry: self.entry_time,
                exit: Some(exit_time),
            });
        }

        Ok(Ticket {
            exit_time: Some(exit_time),
            price,
            ..self.clone()
        })
    }

    /// Final price, only once the ticket is closed
    pub fn billed_price(&self) -> Option<Decimal> {
        self.exit_time.map(|_| self.price)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit - self.entry_time)
    }
}

// ── Tests ──────────────────────────────────────────────────────
