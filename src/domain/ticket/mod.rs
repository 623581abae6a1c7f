//! Ticket aggregate
//!
//! Contains the Ticket entity and the ticket store interface.

pub mod model;
pub mod repository;

pub use model::Ticket;
pub use repository::TicketStore;
