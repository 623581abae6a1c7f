//! Parking session orchestration
//!
//! Ties the spot inventory, the ticket store and the fare schedule together
//! for vehicle entry and exit. Every public operation either returns a ticket
//! or a specific [`ParkingError`]; the spot is never left claimed without a
//! ticket behind it.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, error, info, warn};

use super::loyalty::LoyaltyService;
use crate::domain::{FareBreakdown, FareSchedule, ParkingSpot, ParkingType, RepositoryProvider, Ticket};
use crate::shared::clock::{Clock, SystemClock};
use crate::shared::errors::{ParkingError, ParkingResult, StorageError};

/// How often entry re-reads the inventory after losing a spot to a concurrent claim
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Service for vehicle entry and exit
pub struct ParkingService {
    repos: Arc<dyn RepositoryProvider>,
    loyalty: LoyaltyService,
    fares: FareSchedule,
    clock: Arc<dyn Clock>,
}

impl ParkingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, fares: FareSchedule) -> Self {
        Self {
            loyalty: LoyaltyService::new(repos.clone()),
            repos,
            fares,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Park a vehicle: claim a free spot of `category` and open a ticket.
    pub async fn enter(
        &self,
        vehicle_registration: &str,
        category: ParkingType,
    ) -> ParkingResult<Ticket> {
        let result = self.process_entry(vehicle_registration, category).await;

        match &result {
            Ok(ticket) => {
                metrics::counter!("parking_entries_total", "category" => category.as_str())
                    .increment(1);
                info!(
                    vehicle = ticket.vehicle_registration.as_str(),
                    spot_id = ticket.spot.id,
                    ticket_id = %ticket.id,
                    category = category.as_str(),
                    "Vehicle entered"
                );
            }
            Err(e) => self.record_rejection("enter", vehicle_registration, e),
        }

        result
    }

    /// Release a vehicle: close its open ticket with the computed fare and
    /// free the spot.
    pub async fn exit(&self, vehicle_registration: &str) -> ParkingResult<Ticket> {
        let result = self.process_exit(vehicle_registration).await;

        match &result {
            Ok(ticket) => {
                let category = ticket.spot.category.as_str();
                metrics::counter!("parking_exits_total", "category" => category).increment(1);
                metrics::histogram!("parking_fare_amount", "category" => category)
                    .record(ticket.price.to_f64().unwrap_or_default());
                info!(
                    vehicle = ticket.vehicle_registration.as_str(),
                    spot_id = ticket.spot.id,
                    ticket_id = %ticket.id,
                    price = %ticket.price,
                    "Vehicle exited"
                );
            }
            Err(e) => self.record_rejection("exit", vehicle_registration, e),
        }

        result
    }

    /// The open ticket of a vehicle, if it is parked
    pub async fn current_ticket(&self, vehicle_registration: &str) -> ParkingResult<Option<Ticket>> {
        let vehicle = validate_registration(vehicle_registration)?;
        Ok(self.repos.tickets().find_open_by_vehicle(vehicle).await?)
    }

    /// What the vehicle would pay if it left now. Changes nothing.
    pub async fn preview_fare(&self, vehicle_registration: &str) -> ParkingResult<FareBreakdown> {
        let vehicle = validate_registration(vehicle_registration)?;
        let ticket = self
            .repos
            .tickets()
            .find_open_by_vehicle(vehicle)
            .await?
            .ok_or_else(|| ParkingError::NoOpenSession(vehicle.to_string()))?;

        let is_recurrent = self.loyalty.is_recurrent_user(vehicle).await?;
        let breakdown = self.fares.quote(
            ticket.entry_time,
            Some(self.clock.now()),
            ticket.spot.category,
            is_recurrent,
        )?;
        Ok(breakdown)
    }

    pub async fn available_spots(&self, category: ParkingType) -> ParkingResult<u64> {
        Ok(self.repos.spots().count_available(category).await?)
    }

    async fn process_entry(
        &self,
        vehicle_registration: &str,
        category: ParkingType,
    ) -> ParkingResult<Ticket> {
        let vehicle = validate_registration(vehicle_registration)?;

        // Fast path; the store enforces the same rule on create
        if self
            .repos
            .tickets()
            .find_open_by_vehicle(vehicle)
            .await?
            .is_some()
        {
            return Err(ParkingError::VehicleAlreadyParked(vehicle.to_string()));
        }

        let spot = self.claim_spot(category).await?;
        let ticket = Ticket::open(vehicle, spot, self.clock.now());

        let created = self.repos.tickets().create(&ticket).await;
        match created {
            Ok(()) => Ok(ticket),
            Err(StorageError::Conflict(detail)) => {
                debug!(
                    vehicle,
                    spot_id = ticket.spot.id,
                    detail = detail.as_str(),
                    "Lost entry race, releasing spot"
                );
                self.release_spot(ticket.spot.id).await;
                Err(ParkingError::VehicleAlreadyParked(vehicle.to_string()))
            }
            Err(e) => {
                error!(
                    vehicle,
                    spot_id = ticket.spot.id,
                    error = %e,
                    "Ticket creation failed, releasing spot"
                );
                self.release_spot(ticket.spot.id).await;
                Err(ParkingError::TicketCreationFailed(e.to_string()))
            }
        }
    }

    async fn process_exit(&self, vehicle_registration: &str) -> ParkingResult<Ticket> {
        let vehicle = validate_registration(vehicle_registration)?;

        let ticket = self
            .repos
            .tickets()
            .find_open_by_vehicle(vehicle)
            .await?
            .ok_or_else(|| ParkingError::NoOpenSession(vehicle.to_string()))?;

        let exit_time = self.clock.now();
        let is_recurrent = self.loyalty.is_recurrent_user(vehicle).await?;

        // Pricing errors abort here, before anything is written
        let price = self.fares.compute_fare(
            ticket.entry_time,
            Some(exit_time),
            ticket.spot.category,
            is_recurrent,
        )?;
        let closed = ticket.close(exit_time, price)?;

        let update = self.repos.tickets().update(&closed).await;

        // The spot goes back to the pool whatever happened to the ticket
        self.release_spot(closed.spot.id).await;

        match update {
            Ok(true) => Ok(closed),
            Ok(false) => Err(ParkingError::TicketUpdateFailed(format!(
                "ticket {} was not found",
                closed.id
            ))),
            Err(e) => Err(ParkingError::TicketUpdateFailed(e.to_string())),
        }
    }

    /// Find a free spot and claim it. The claim fails if another caller got
    /// there first, in which case the next free spot is tried.
    async fn claim_spot(&self, category: ParkingType) -> ParkingResult<ParkingSpot> {
        let spots = self.repos.spots();

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let Some(spot_id) = spots.find_next_available(category).await? else {
                return Err(ParkingError::NoSpotAvailable(category));
            };

            if spots.mark_occupied(spot_id).await? {
                return Ok(ParkingSpot::new(spot_id, category, false));
            }

            debug!(spot_id, attempt, "Spot claimed concurrently, retrying");
        }

        Err(ParkingError::NoSpotAvailable(category))
    }

    /// Best effort: a failed release is logged, not returned
    async fn release_spot(&self, spot_id: i32) -> bool {
        match self.repos.spots().mark_available(spot_id).await {
            Ok(true) => true,
            Ok(false) => {
                error!(spot_id, "Spot release matched no spot");
                false
            }
            Err(e) => {
                error!(spot_id, error = %e, "Failed to release spot");
                false
            }
        }
    }

    fn record_rejection(&self, operation: &'static str, vehicle: &str, err: &ParkingError) {
        metrics::counter!("parking_rejections_total", "operation" => operation, "reason" => err.reason())
            .increment(1);
        warn!(operation, vehicle, reason = err.reason(), error = %err, "Parking request failed");
    }
}

fn validate_registration(vehicle_registration: &str) -> ParkingResult<&str> {
    let trimmed = vehicle_registration.trim();
    if trimmed.is_empty() {
        return Err(ParkingError::InvalidVehicleRegistration(
            vehicle_registration.to_string(),
        ));
    }
    Ok(trimmed)
}

// ── Tests ──────────────────────────────────────────────────────
