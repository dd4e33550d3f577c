//! Persistence ports the reservation core depends on.
//!
//! Adapters live outside this crate. The core only sees these traits, so it
//! never names a concrete storage type.

use async_trait::async_trait;
use thiserror::Error;

use crate::reservation::{Reservation, ReservationId, TimeSlot};

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// A write collided with existing data, e.g. the same table booked
    /// twice for one slot.
    #[error("persistence conflict: {message}")]
    Conflict { message: String },

    /// Connectivity, query or transaction failure.
    #[error("database failure: {message}")]
    Database { message: String },

    /// A stored row could not be turned back into a reservation.
    #[error("stored reservation is corrupted: {message}")]
    Corrupted { message: String },
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

/// Repository of reservation entities.
///
/// Writes made through a repository obtained from a [`Transaction`] become
/// visible to others only after that transaction commits.
#[async_trait]
pub trait ReservationRepository: Send {
    /// Loads a reservation by ID.
    async fn get(
        &mut self,
        reservation_id: &ReservationId,
    ) -> PersistenceResult<Option<Reservation>>;

    /// Stores a new reservation.
    async fn add(&mut self, reservation: &Reservation) -> PersistenceResult<()>;

    /// Overwrites the stored state of an existing reservation.
    async fn update(&mut self, reservation: &Reservation) -> PersistenceResult<()>;

    /// Lists reservations whose slot matches `slot` exactly.
    async fn list_for_slot(&mut self, slot: &TimeSlot) -> PersistenceResult<Vec<Reservation>>;
}

/// A scoped transactional unit.
///
/// `commit` and `rollback` consume the transaction, so each happens at most
/// once. Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait Transaction: Send {
    /// The repository handle bound to this transaction.
    type Repository: ReservationRepository;

    /// Returns the repository bound to this transaction.
    fn reservations(&mut self) -> &mut Self::Repository;

    /// Makes all writes durable.
    async fn commit(self) -> PersistenceResult<()>;

    /// Discards all writes.
    async fn rollback(self) -> PersistenceResult<()>;
}

/// Factory for transactional units.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// The transaction type this unit of work opens.
    type Transaction: Transaction;

    /// Opens a new transaction.
    async fn begin(&self) -> PersistenceResult<Self::Transaction>;
}
