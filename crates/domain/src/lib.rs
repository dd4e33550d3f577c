//! Domain layer for the restaurant reservation system.
//!
//! This crate provides the reservation domain core:
//! - Value objects (`TimeSlot`, `PartySize`, `TableId`, `ReservationId`)
//! - The `Reservation` entity and the `ReservationAggregate` consistency boundary
//! - Domain events recorded by the aggregate
//! - `ReservationFactory` and `TableAllocationService`
//! - Repository and unit-of-work ports, plus the `ReservationService` use cases

pub mod aggregate;
pub mod error;
pub mod ports;
pub mod reservation;

pub use aggregate::{Aggregate, DomainEvent};
pub use error::DomainError;
pub use ports::{
    PersistenceError, PersistenceResult, ReservationRepository, Transaction, UnitOfWork,
};
pub use reservation::{
    AvailableTable, CancelReservation, CompleteReservation, ConfirmReservation,
    ConfirmationPolicy, CreateReservation, ErrorKind, PartySize, Reservation,
    ReservationAggregate, ReservationError, ReservationEvent, ReservationFactory, ReservationId,
    ReservationService, ReservationStatus, TableAllocationService, TableId, TimeSlot,
};
