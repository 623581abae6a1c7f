//! # Parkit
//!
//! Parking session and fare engine: allocates spots by vehicle category,
//! issues tickets on entry and prices them on exit.
//!
//! ## Architecture
//!
//! - **domain**: Spots, tickets, the fare schedule and the storage traits
//! - **application**: Entry/exit orchestration and loyalty lookup
//! - **infrastructure**: SeaORM (SQLite) and in-memory storage
//! - **shared**: Errors and the clock abstraction

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod telemetry;

pub use config::{default_config_path, AppConfig};

pub use application::{LoyaltyService, ParkingService};
pub use domain::{FareBreakdown, FareSchedule, ParkingSpot, ParkingType, Ticket};
pub use shared::errors::{ParkingError, ParkingResult};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryStorage, SeaOrmRepositoryProvider};

pub use telemetry::init_tracing;
