pub mod fare;
pub mod parking_spot;
pub mod repositories;
pub mod ticket;

// Re-export commonly used types
pub use fare::{FareBreakdown, FareSchedule};
pub use parking_spot::{ParkingSpot, ParkingType, SpotInventory};
pub use repositories::RepositoryProvider;
pub use ticket::{Ticket, TicketStore};

pub use crate::shared::errors::{FareError, StorageError, StorageResult};
