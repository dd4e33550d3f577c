//! Reservation aggregate and related types.

mod aggregate;
mod allocation;
mod commands;
mod entity;
mod events;
mod factory;
mod service;
mod status;
mod value_objects;

pub use aggregate::ReservationAggregate;
pub use allocation::{AvailableTable, TableAllocationService};
pub use commands::*;
pub use entity::Reservation;
pub use events::{
    ReservationCancelledData, ReservationCompletedData, ReservationConfirmedData,
    ReservationCreatedData, ReservationEvent, TableAssignedData,
};
pub use factory::ReservationFactory;
pub use service::{ConfirmationPolicy, ReservationService};
pub use status::{ReservationStatus, UnknownStatus};
pub use value_objects::{PartySize, ReservationId, TableId, TimeSlot};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classification of reservation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value object constraint or a state-transition precondition failed.
    InvariantViolation,

    /// No candidate table could seat the party.
    NoSuitableTable,
}

/// Errors that can occur during reservation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReservationError {
    /// Slot start does not precede slot end.
    #[error("Invalid time slot: start {start} must be before end {end}")]
    InvalidTimeSlot {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Slot end cannot be represented.
    #[error("Invalid duration: {duration_min} minutes overflows the slot end")]
    InvalidDuration { duration_min: i64 },

    /// Party size below one or above [`PartySize::MAX`].
    #[error("Invalid party size: {value} (must be between 1 and 2147483647)")]
    InvalidPartySize { value: i64 },

    /// Reservation id is not a valid identifier.
    #[error("Invalid reservation id: {value}")]
    InvalidReservationId { value: String },

    /// Reservation is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: ReservationStatus,
        action: &'static str,
    },

    /// Confirmation attempted before a table was assigned.
    #[error("Cannot confirm reservation without an assigned table")]
    TableNotAssigned,

    /// A confirmed or completed reservation was rebuilt without a table.
    #[error("Reservation in {status} status must hold a table")]
    MissingTable { status: ReservationStatus },

    /// No candidate table has enough seats.
    #[error("No suitable table available for a party of {party_size}")]
    NoSuitableTable { party_size: u32 },
}

impl ReservationError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReservationError::NoSuitableTable { .. } => ErrorKind::NoSuitableTable,
            _ => ErrorKind::InvariantViolation,
        }
    }
}
