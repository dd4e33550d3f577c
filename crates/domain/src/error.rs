//! Domain error types.

use thiserror::Error;

use crate::ports::PersistenceError;
use crate::reservation::{ErrorKind, ReservationError, ReservationId};

/// Errors that can occur during reservation use cases.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A value object or aggregate rule was violated, or no table fits.
    #[error("Reservation error: {0}")]
    Reservation(#[from] ReservationError),

    /// The persistence adapter failed; the transaction was rolled back.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Reservation not found.
    #[error("Reservation not found: {0}")]
    ReservationNotFound(ReservationId),
}

impl DomainError {
    /// Returns the domain classification, if this is a domain rule failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DomainError::Reservation(err) => Some(err.kind()),
            _ => None,
        }
    }
}
