use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::ParkingType;

/// Opaque failure reported by a storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Data integrity error: {0}")]
    Integrity(String),

    /// A write collided with a uniqueness rule, e.g. a second open ticket
    /// for the same vehicle
    #[error("Conflicting write: {0}")]
    Conflict(String),
}

/// Result type for storage collaborator calls
pub type StorageResult<T> = Result<T, StorageError>;

/// Fare engine failures. These point at bad data, not at the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FareError {
    #[error("Invalid interval: exit time {exit:?} is missing or before entry time {entry}")]
    InvalidInterval {
        entry: DateTime<Utc>,
        exit: Option<DateTime<Utc>>,
    },

    #[error("Unsupported parking category: {0}")]
    UnsupportedCategory(String),

    #[error("Fare for {0} is too large to represent")]
    AmountOverflow(ParkingType),
}

/// Operation-level failures of the parking session orchestrator
#[derive(Debug, Error)]
pub enum ParkingError {
    #[error(transparent)]
    Fare(#[from] FareError),

    #[error("Invalid vehicle registration: {0:?}")]
    InvalidVehicleRegistration(String),

    #[error("Vehicle {0} is already parked")]
    VehicleAlreadyParked(String),

    #[error("No {0} spot available")]
    NoSpotAvailable(ParkingType),

    #[error("No open parking session for vehicle {0}")]
    NoOpenSession(String),

    #[error("Ticket creation failed: {0}")]
    TicketCreationFailed(String),

    #[error("Ticket update failed: {0}")]
    TicketUpdateFailed(String),

    #[error(transparent)]
    StorageUnavailable(#[from] StorageError),
}

impl ParkingError {
    /// Stable label used for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Fare(FareError::InvalidInterval { .. }) => "invalid_interval",
            Self::Fare(FareError::UnsupportedCategory(_)) => "unsupported_category",
            Self::Fare(FareError::AmountOverflow(_)) => "fare_overflow",
            Self::InvalidVehicleRegistration(_) => "invalid_vehicle_registration",
            Self::VehicleAlreadyParked(_) => "vehicle_already_parked",
            Self::NoSpotAvailable(_) => "no_spot_available",
            Self::NoOpenSession(_) => "no_open_session",
            Self::TicketCreationFailed(_) => "ticket_creation_failed",
            Self::TicketUpdateFailed(_) => "ticket_update_failed",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Result type for parking operations
pub type ParkingResult<T> = Result<T, ParkingError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid fare configuration: {0}")]
    InvalidFare(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_converts_into_storage_unavailable() {
        let err: ParkingError = StorageError::Unavailable("connection reset".into()).into();
        assert!(matches!(err, ParkingError::StorageUnavailable(_)));
        assert_eq!(err.reason(), "storage_unavailable");
        assert_eq!(err.to_string(), "Storage unavailable: connection reset");
    }

    #[test]
    fn fare_error_keeps_its_message() {
        let err: ParkingError = FareError::UnsupportedCategory("TRUCK".into()).into();
        assert_eq!(err.reason(), "unsupported_category");
        assert_eq!(err.to_string(), "Unsupported parking category: TRUCK");
    }

    #[test]
    fn no_spot_message_names_the_category() {
        let err = ParkingError::NoSpotAvailable(ParkingType::Bike);
        assert_eq!(err.to_string(), "No BIKE spot available");
    }
}
