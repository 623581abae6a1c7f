//! Recurrent-user detection

use std::sync::Arc;

use tracing::debug;

use crate::domain::{RepositoryProvider, StorageResult};

/// A vehicle needs more than this many closed tickets to count as recurrent
pub const RECURRENT_USER_THRESHOLD: u64 = 1;

pub fn is_recurrent(completed_tickets: u64) -> bool {
    completed_tickets > RECURRENT_USER_THRESHOLD
}

/// Looks up visit history to decide whether the loyalty discount applies
pub struct LoyaltyService {
    repos: Arc<dyn RepositoryProvider>,
}

impl LoyaltyService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn is_recurrent_user(&self, vehicle_registration: &str) -> StorageResult<bool> {
        let vehicle_registration = vehicle_registration.trim();
        if vehicle_registration.is_empty() {
            return Ok(false);
        }

        let completed = self
            .repos
            .tickets()
            .count_completed_by_vehicle(vehicle_registration)
            .await?;

        debug!(vehicle = vehicle_registration, completed, "Loyalty lookup");
        Ok(is_recurrent(completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticket;
    use crate::infrastructure::InMemoryStorage;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    async fn add_completed_visit(storage: &InMemoryStorage, vehicle: &str) {
        use crate::domain::TicketStore;

        let spot = storage.spot(1).unwrap();
        let ticket = Ticket::open(vehicle, spot, Utc::now() - Duration::hours(3));
        storage.create(&ticket).await.unwrap();
        let closed = ticket.close(Utc::now(), Decimal::ONE).unwrap();
        storage.update(&closed).await.unwrap();
    }

    #[test]
    fn threshold_is_strictly_more_than_one_visit() {
        assert!(!is_recurrent(0));
        assert!(!is_recurrent(1));
        assert!(is_recurrent(2));
        assert!(is_recurrent(10));
    }

    #[tokio::test]
    async fn second_completed_visit_makes_user_recurrent() {
        let storage = Arc::new(InMemoryStorage::with_default_spots());
        let loyalty = LoyaltyService::new(storage.clone());

        assert!(!loyalty.is_recurrent_user("AB-123-CD").await.unwrap());
        add_completed_visit(&storage, "AB-123-CD").await;
        assert!(!loyalty.is_recurrent_user("AB-123-CD").await.unwrap());
        add_completed_visit(&storage, "AB-123-CD").await;
        assert!(loyalty.is_recurrent_user("AB-123-CD").await.unwrap());
    }

    #[tokio::test]
    async fn open_tickets_do_not_count() {
        use crate::domain::TicketStore;

        let storage = Arc::new(InMemoryStorage::with_default_spots());
        let loyalty = LoyaltyService::new(storage.clone());
        add_completed_visit(&storage, "AB-123-CD").await;
        storage
            .create(&Ticket::open("AB-123-CD", storage.spot(2).unwrap(), Utc::now()))
            .await
            .unwrap();

        assert!(!loyalty.is_recurrent_user("AB-123-CD").await.unwrap());
    }

    #[tokio::test]
    async fn blank_registration_is_never_recurrent() {
        let storage = Arc::new(InMemoryStorage::with_default_spots());
        storage.set_offline(true);
        let loyalty = LoyaltyService::new(storage);

        // Answered without touching storage
        assert!(!loyalty.is_recurrent_user("   ").await.unwrap());
    }
}
