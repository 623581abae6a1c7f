//! In-memory storage implementation

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    ParkingSpot, ParkingType, RepositoryProvider, SpotInventory, StorageError, StorageResult,
    Ticket, TicketStore,
};

/// In-memory storage for development and testing.
///
/// Failure switches let tests simulate a lost connection per operation group.
pub struct InMemoryStorage {
    spots: DashMap<i32, ParkingSpot>,
    tickets: DashMap<Uuid, Ticket>,
    /// Open ticket per vehicle; at most one
    open_by_vehicle: DashMap<String, Uuid>,
    offline: AtomicBool,
    fail_ticket_create: AtomicBool,
    fail_ticket_update: AtomicBool,
    fail_spot_release: AtomicBool,
    update_affects_no_rows: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            spots: DashMap::new(),
            tickets: DashMap::new(),
            open_by_vehicle: DashMap::new(),
            offline: AtomicBool::new(false),
            fail_ticket_create: AtomicBool::new(false),
            fail_ticket_update: AtomicBool::new(false),
            fail_spot_release: AtomicBool::new(false),
            update_affects_no_rows: AtomicBool::new(false),
        }
    }

    /// Same layout as the database seed: spots 1-3 for cars, 4-5 for bikes
    pub fn with_default_spots() -> Self {
        Self::new()
            .with_spots(ParkingType::Car, [1, 2, 3])
            .with_spots(ParkingType::Bike, [4, 5])
    }

    pub fn with_spots(self, category: ParkingType, ids: impl IntoIterator<Item = i32>) -> Self {
        for id in ids {
            self.spots.insert(id, ParkingSpot::new(id, category, true));
        }
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_ticket_create(&self, fail: bool) {
        self.fail_ticket_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_ticket_update(&self, fail: bool) {
        self.fail_ticket_update.store(fail, Ordering::SeqCst);
    }

    pub fn fail_spot_release(&self, fail: bool) {
        self.fail_spot_release.store(fail, Ordering::SeqCst);
    }

    /// Ticket updates succeed but match no row, as if the ticket vanished
    pub fn update_affects_no_rows(&self, enabled: bool) {
        self.update_affects_no_rows.store(enabled, Ordering::SeqCst);
    }

    /// Stored copy of a spot, bypassing the failure switches
    pub fn spot(&self, spot_id: i32) -> Option<ParkingSpot> {
        self.spots.get(&spot_id).map(|s| s.clone())
    }

    /// Every stored ticket, bypassing the failure switches
    pub fn stored_tickets(&self) -> Vec<Ticket> {
        self.tickets.iter().map(|t| t.clone()).collect()
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("in-memory storage is offline".to_string()));
        }
        Ok(())
    }

    fn check_switch(&self, switch: &AtomicBool, operation: &str) -> StorageResult<()> {
        self.check_online()?;
        if switch.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("{} failed", operation)));
        }
        Ok(())
    }

    fn set_availability(&self, spot_id: i32, available: bool) -> bool {
        match self.spots.get_mut(&spot_id) {
            Some(mut spot) => {
                spot.is_available = available;
                true
            }
            None => false,
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpotInventory for InMemoryStorage {
    async fn find_next_available(&self, category: ParkingType) -> StorageResult<Option<i32>> {
        self.check_online()?;
        Ok(self
            .spots
            .iter()
            .filter(|s| s.category == category && s.is_available)
            .map(|s| s.id)
            .min())
    }

    async fn mark_occupied(&self, spot_id: i32) -> StorageResult<bool> {
        self.check_online()?;
        // get_mut holds the shard lock, so check-and-set is atomic
        match self.spots.get_mut(&spot_id) {
            Some(mut spot) if spot.is_available => {
                spot.is_available = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_available(&self, spot_id: i32) -> StorageResult<bool> {
        self.check_switch(&self.fail_spot_release, "mark_available")?;
        Ok(self.set_availability(spot_id, true))
    }

    async fn count_available(&self, category: ParkingType) -> StorageResult<u64> {
        self.check_online()?;
        Ok(self
            .spots
            .iter()
            .filter(|s| s.category == category && s.is_available)
            .count() as u64)
    }
}

#[async_trait]
impl TicketStore for InMemoryStorage {
    async fn create(&self, ticket: &Ticket) -> StorageResult<()> {
        self.check_switch(&self.fail_ticket_create, "create ticket")?;

        if !ticket.is_open() {
            self.tickets.insert(ticket.id, ticket.clone());
            return Ok(());
        }

        // The entry guard holds the shard lock until both maps are written
        match self.open_by_vehicle.entry(ticket.vehicle_registration.clone()) {
            Entry::Occupied(open) => Err(StorageError::Conflict(format!(
                "vehicle {} already has open ticket {}",
                ticket.vehicle_registration,
                open.get()
            ))),
            Entry::Vacant(slot) => {
                self.tickets.insert(ticket.id, ticket.clone());
                slot.insert(ticket.id);
                Ok(())
            }
        }
    }

    async fn find_open_by_vehicle(
        &self,
        vehicle_registration: &str,
    ) -> StorageResult<Option<Ticket>> {
        self.check_online()?;
        Ok(self
            .tickets
            .iter()
            .filter(|t| t.vehicle_registration == vehicle_registration && t.is_open())
            .max_by_key(|t| t.entry_time)
            .map(|t| t.clone()))
    }

    async fn update(&self, ticket: &Ticket) -> StorageResult<bool> {
        self.check_switch(&self.fail_ticket_update, "update ticket")?;
        if self.update_affects_no_rows.load(Ordering::SeqCst) {
            return Ok(false);
        }

        match self.tickets.get_mut(&ticket.id) {
            Some(mut stored) => *stored = ticket.clone(),
            None => return Ok(false),
        }

        if !ticket.is_open() {
            self.open_by_vehicle
                .remove_if(&ticket.vehicle_registration, |_, id| *id == ticket.id);
        }
        Ok(true)
    }

    async fn count_completed_by_vehicle(&self, vehicle_registration: &str) -> StorageResult<u64> {
        self.check_online()?;
        Ok(self
            .tickets
            .iter()
            .filter(|t| t.vehicle_registration == vehicle_registration && !t.is_open())
            .count() as u64)
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn spots(&self) -> &dyn SpotInventory {
        self
    }

    fn tickets(&self) -> &dyn TicketStore {
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────
