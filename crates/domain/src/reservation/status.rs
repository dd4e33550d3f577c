//! Reservation lifecycle states.

use serde::{Deserialize, Serialize};

/// The status of a reservation in its lifecycle.
///
/// State transitions:
/// ```text
/// Created ──► Confirmed ──► Completed
///    │            │
///    └────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Reservation exists; a table may be assigned.
    #[default]
    Created,

    /// Table assigned and reservation confirmed.
    Confirmed,

    /// Reservation was cancelled (terminal state).
    Cancelled,

    /// Guests have been seated and served (terminal state).
    Completed,
}

impl ReservationStatus {
    /// Returns true if a table can be assigned in this status.
    pub fn can_assign_table(&self) -> bool {
        matches!(self, ReservationStatus::Created)
    }

    /// Returns true if the reservation can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, ReservationStatus::Created)
    }

    /// Returns true if cancelling is allowed (cancelling twice is a no-op).
    pub fn can_cancel(&self) -> bool {
        !matches!(self, ReservationStatus::Completed)
    }

    /// Returns true if the reservation can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Cancelled | ReservationStatus::Completed
        )
    }

    /// Returns true if the reservation still holds its table.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Created | ReservationStatus::Confirmed
        )
    }

    /// Returns the persisted status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Created => "CREATED",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown reservation status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for ReservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(ReservationStatus::Created),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "COMPLETED" => Ok(ReservationStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
