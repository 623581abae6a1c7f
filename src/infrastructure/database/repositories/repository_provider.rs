//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{RepositoryProvider, SpotInventory, TicketStore};

use super::parking_spot_repository::SeaOrmSpotInventory;
use super::ticket_repository::SeaOrmTicketStore;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes the spot inventory and ticket store.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let spot = repos.spots().find_next_available(ParkingType::Car).await?;
/// let open = repos.tickets().find_open_by_vehicle("AB-123-CD").await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    spots: SeaOrmSpotInventory,
    tickets: SeaOrmTicketStore,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            spots: SeaOrmSpotInventory::new(db.clone()),
            tickets: SeaOrmTicketStore::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn spots(&self) -> &dyn SpotInventory {
        &self.spots
    }

    fn tickets(&self) -> &dyn TicketStore {
        &self.tickets
    }
}
