//! Reservation commands.

use chrono::{DateTime, Utc};

use super::ReservationId;

/// Command to create a new reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReservation {
    /// When the slot starts.
    pub slot_start: DateTime<Utc>,

    /// Slot length in minutes.
    pub duration_min: i64,

    /// Number of guests.
    pub party_size: i64,
}

impl CreateReservation {
    /// Creates a new CreateReservation command.
    pub fn new(slot_start: DateTime<Utc>, duration_min: i64, party_size: i64) -> Self {
        Self {
            slot_start,
            duration_min,
            party_size,
        }
    }
}

/// Command to confirm a reservation that already has a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmReservation {
    pub reservation_id: ReservationId,
}

impl ConfirmReservation {
    /// Creates a new ConfirmReservation command.
    pub fn new(reservation_id: ReservationId) -> Self {
        Self { reservation_id }
    }
}

/// Command to cancel a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
}

impl CancelReservation {
    /// Creates a new CancelReservation command.
    pub fn new(reservation_id: ReservationId) -> Self {
        Self { reservation_id }
    }
}

/// Command to mark a reservation as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteReservation {
    pub reservation_id: ReservationId,
}

impl CompleteReservation {
    /// Creates a new CompleteReservation command.
    pub fn new(reservation_id: ReservationId) -> Self {
        Self { reservation_id }
    }
}
