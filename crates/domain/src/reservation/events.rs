//! Reservation domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{ReservationId, TableId};

/// Events recorded by the reservation aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReservationEvent {
    /// Reservation was created.
    ReservationCreated(ReservationCreatedData),

    /// A table was assigned to the reservation.
    TableAssigned(TableAssignedData),

    /// Reservation was confirmed.
    ReservationConfirmed(ReservationConfirmedData),

    /// Reservation was cancelled.
    ReservationCancelled(ReservationCancelledData),

    /// Reservation was completed.
    ReservationCompleted(ReservationCompletedData),
}

impl DomainEvent for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReservationEvent::ReservationCreated(_) => "ReservationCreated",
            ReservationEvent::TableAssigned(_) => "TableAssigned",
            ReservationEvent::ReservationConfirmed(_) => "ReservationConfirmed",
            ReservationEvent::ReservationCancelled(_) => "ReservationCancelled",
            ReservationEvent::ReservationCompleted(_) => "ReservationCompleted",
        }
    }
}

/// Data for ReservationCreated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCreatedData {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for TableAssigned event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAssignedData {
    pub reservation_id: ReservationId,

    /// The table that was assigned.
    pub table_id: TableId,

    pub occurred_at: DateTime<Utc>,
}

/// Data for ReservationConfirmed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmedData {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for ReservationCancelled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCancelledData {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Data for ReservationCompleted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCompletedData {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

// Convenience constructors for events
impl ReservationEvent {
    /// Creates a ReservationCreated event.
    pub fn reservation_created(reservation_id: ReservationId) -> Self {
        ReservationEvent::ReservationCreated(ReservationCreatedData {
            reservation_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a TableAssigned event.
    pub fn table_assigned(reservation_id: ReservationId, table_id: TableId) -> Self {
        ReservationEvent::TableAssigned(TableAssignedData {
            reservation_id,
            table_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ReservationConfirmed event.
    pub fn reservation_confirmed(reservation_id: ReservationId) -> Self {
        ReservationEvent::ReservationConfirmed(ReservationConfirmedData {
            reservation_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ReservationCancelled event.
    pub fn reservation_cancelled(reservation_id: ReservationId) -> Self {
        ReservationEvent::ReservationCancelled(ReservationCancelledData {
            reservation_id,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ReservationCompleted event.
    pub fn reservation_completed(reservation_id: ReservationId) -> Self {
        ReservationEvent::ReservationCompleted(ReservationCompletedData {
            reservation_id,
            occurred_at: Utc::now(),
        })
    }

    /// Returns the reservation this event belongs to.
    pub fn reservation_id(&self) -> ReservationId {
        match self {
            ReservationEvent::ReservationCreated(data) => data.reservation_id,
            ReservationEvent::TableAssigned(data) => data.reservation_id,
            ReservationEvent::ReservationConfirmed(data) => data.reservation_id,
            ReservationEvent::ReservationCancelled(data) => data.reservation_id,
            ReservationEvent::ReservationCompleted(data) => data.reservation_id,
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReservationEvent::ReservationCreated(data) => data.occurred_at,
            ReservationEvent::TableAssigned(data) => data.occurred_at,
            ReservationEvent::ReservationConfirmed(data) => data.occurred_at,
            ReservationEvent::ReservationCancelled(data) => data.occurred_at,
            ReservationEvent::ReservationCompleted(data) => data.occurred_at,
        }
    }
}
