//! Reservation aggregate implementation.

use crate::aggregate::Aggregate;

use super::{
    Reservation, ReservationError, ReservationEvent, ReservationId, ReservationStatus, TableId,
};

/// Reservation aggregate root.
///
/// Owns exactly one [`Reservation`] and is the only place its state changes.
/// Each operation checks its preconditions before touching anything, so a
/// failed call leaves both the entity and the recorded events unchanged.
#[derive(Debug, Clone)]
pub struct ReservationAggregate {
    root: Reservation,
    events: Vec<ReservationEvent>,
}

impl Aggregate for ReservationAggregate {
    type Event = ReservationEvent;
    type Error = ReservationError;
    type Id = ReservationId;

    fn aggregate_type() -> &'static str {
        "Reservation"
    }

    fn id(&self) -> &ReservationId {
        &self.root.id
    }

    fn events(&self) -> &[ReservationEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<ReservationEvent> {
        std::mem::take(&mut self.events)
    }
}

impl ReservationAggregate {
    /// Wraps an existing reservation, e.g. one loaded from a repository.
    pub fn new(root: Reservation) -> Self {
        Self {
            root,
            events: Vec::new(),
        }
    }

    /// Wraps a freshly built reservation and records `ReservationCreated`.
    pub fn create(root: Reservation) -> Self {
        let event = ReservationEvent::reservation_created(root.id());
        Self {
            root,
            events: vec![event],
        }
    }

    /// Returns the wrapped reservation.
    pub fn root(&self) -> &Reservation {
        &self.root
    }

    /// Releases the wrapped reservation, discarding undrained events.
    pub fn into_root(self) -> Reservation {
        self.root
    }

    /// Assigns a table. Only allowed while `Created`.
    pub fn assign_table(&mut self, table_id: TableId) -> Result<(), ReservationError> {
        let status = self.root.status();
        if !status.can_assign_table() {
            return Err(ReservationError::InvalidStateTransition {
                current_status: status,
                action: "assign table",
            });
        }

        self.root.set_table(table_id.clone());
        self.events
            .push(ReservationEvent::table_assigned(self.root.id(), table_id));
        Ok(())
    }

    /// Confirms the reservation. Requires `Created` and an assigned table.
    pub fn confirm(&mut self) -> Result<(), ReservationError> {
        let status = self.root.status();
        if !status.can_confirm() {
            return Err(ReservationError::InvalidStateTransition {
                current_status: status,
                action: "confirm",
            });
        }

        if self.root.table_id().is_none() {
            return Err(ReservationError::TableNotAssigned);
        }

        self.root.set_status(ReservationStatus::Confirmed);
        self.events
            .push(ReservationEvent::reservation_confirmed(self.root.id()));
        Ok(())
    }

    /// Cancels the reservation.
    ///
    /// Cancelling an already cancelled reservation succeeds without recording
    /// another event. Completed reservations cannot be cancelled.
    pub fn cancel(&mut self) -> Result<(), ReservationError> {
        let status = self.root.status();
        if !status.can_cancel() {
            return Err(ReservationError::InvalidStateTransition {
                current_status: status,
                action: "cancel",
            });
        }

        if status == ReservationStatus::Cancelled {
            return Ok(());
        }

        self.root.set_status(ReservationStatus::Cancelled);
        self.events
            .push(ReservationEvent::reservation_cancelled(self.root.id()));
        Ok(())
    }

    /// Marks a confirmed reservation as completed.
    pub fn mark_completed(&mut self) -> Result<(), ReservationError> {
        let status = self.root.status();
        if !status.can_complete() {
            return Err(ReservationError::InvalidStateTransition {
                current_status: status,
                action: "complete",
            });
        }

        self.root.set_status(ReservationStatus::Completed);
        self.events
            .push(ReservationEvent::reservation_completed(self.root.id()));
        Ok(())
    }
}
