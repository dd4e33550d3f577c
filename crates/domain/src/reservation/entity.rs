//! Reservation entity.

use serde::{Deserialize, Serialize};

use super::{PartySize, ReservationError, ReservationId, ReservationStatus, TableId, TimeSlot};

/// A table reservation.
///
/// Identity is the `ReservationId`. The remaining fields change only through
/// [`ReservationAggregate`](super::ReservationAggregate) operations; outside
/// this crate the entity is read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub(super) id: ReservationId,
    slot: TimeSlot,
    party_size: PartySize,
    table_id: Option<TableId>,
    status: ReservationStatus,
}

impl Reservation {
    /// Creates a fresh reservation in `Created` status with no table.
    pub(crate) fn new(id: ReservationId, slot: TimeSlot, party_size: PartySize) -> Self {
        Self {
            id,
            slot,
            party_size,
            table_id: None,
            status: ReservationStatus::Created,
        }
    }

    /// Rebuilds a reservation from stored fields.
    ///
    /// Intended for repository adapters. The fields have already been
    /// validated by their value-object constructors; a `Confirmed` or
    /// `Completed` reservation must also hold a table.
    pub fn restore(
        id: ReservationId,
        slot: TimeSlot,
        party_size: PartySize,
        table_id: Option<TableId>,
        status: ReservationStatus,
    ) -> Result<Self, ReservationError> {
        let needs_table = matches!(
            status,
            ReservationStatus::Confirmed | ReservationStatus::Completed
        );
        if needs_table && table_id.is_none() {
            return Err(ReservationError::MissingTable { status });
        }

        Ok(Self {
            id,
            slot,
            party_size,
            table_id,
            status,
        })
    }

    /// Returns the reservation ID.
    pub fn id(&self) -> ReservationId {
        self.id
    }

    /// Returns the reserved time slot.
    pub fn slot(&self) -> &TimeSlot {
        &self.slot
    }

    /// Returns the party size.
    pub fn party_size(&self) -> PartySize {
        self.party_size
    }

    /// Returns the assigned table, if any.
    pub fn table_id(&self) -> Option<&TableId> {
        self.table_id.as_ref()
    }

    /// Returns the current status.
    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub(crate) fn set_table(&mut self, table_id: TableId) {
        self.table_id = Some(table_id);
    }

    pub(crate) fn set_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }
}
