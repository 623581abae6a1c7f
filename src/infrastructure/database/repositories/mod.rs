//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod parking_spot_repository;
pub mod repository_provider;
pub mod ticket_repository;

pub use parking_spot_repository::SeaOrmSpotInventory;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use ticket_repository::SeaOrmTicketStore;
