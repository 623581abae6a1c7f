//! Ticket store interface

use async_trait::async_trait;

use super::model::Ticket;
use crate::shared::errors::StorageResult;

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persist a new ticket. Fails with `StorageError::Conflict` when the
    /// vehicle already has an open ticket; the check and the insert are one step.
    async fn create(&self, ticket: &Ticket) -> StorageResult<()>;

    /// The ticket without an exit time for this vehicle, if any
    async fn find_open_by_vehicle(&self, vehicle_registration: &str)
        -> StorageResult<Option<Ticket>>;

    /// `true` iff exactly one stored ticket was rewritten
    async fn update(&self, ticket: &Ticket) -> StorageResult<bool>;

    /// Number of closed tickets recorded for this vehicle
    async fn count_completed_by_vehicle(&self, vehicle_registration: &str) -> StorageResult<u64>;
}
