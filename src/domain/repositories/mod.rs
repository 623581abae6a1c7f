//! Repository access for the domain layer
//!
//! `RepositoryProvider` bundles the storage collaborators the session
//! orchestrator depends on. Consumers request only the one they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let spot = repos.spots().find_next_available(ParkingType::Car).await?;
//!     let open = repos.tickets().find_open_by_vehicle("AB-123-CD").await?;
//! }
//! ```

use super::parking_spot::SpotInventory;
use super::ticket::TicketStore;

pub trait RepositoryProvider: Send + Sync {
    fn spots(&self) -> &dyn SpotInventory;
    fn tickets(&self) -> &dyn TicketStore;
}
