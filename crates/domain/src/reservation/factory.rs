//! Construction of new reservations from primitive inputs.

use chrono::{DateTime, Utc};

use super::{PartySize, Reservation, ReservationError, ReservationId, TimeSlot};

/// Builds valid new [`Reservation`] entities.
pub struct ReservationFactory;

impl ReservationFactory {
    /// Creates a reservation in `Created` status with no table.
    ///
    /// The slot ends `duration_min` minutes after `slot_start`, so a
    /// non-positive duration fails the slot invariant. A fresh random id is
    /// generated on every call.
    pub fn create(
        slot_start: DateTime<Utc>,
        duration_min: i64,
        party_size: i64,
    ) -> Result<Reservation, ReservationError> {
        let slot = TimeSlot::starting_at(slot_start, duration_min)?;
        let party_size = PartySize::new(party_size)?;
        Ok(Reservation::new(ReservationId::new(), slot, party_size))
    }
}
