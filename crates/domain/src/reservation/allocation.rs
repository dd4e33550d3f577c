//! Table allocation policy.

use serde::{Deserialize, Serialize};

use super::{Reservation, ReservationError, TableId};

/// A candidate table supplied by the seating context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableTable {
    pub id: TableId,
    pub capacity: u32,
}

impl AvailableTable {
    /// Creates a candidate table.
    pub fn new(id: impl Into<TableId>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }
}

/// Chooses a table for a reservation from a snapshot of candidates.
///
/// The service only computes a choice; assignment goes through the aggregate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableAllocationService;

impl TableAllocationService {
    /// Creates the allocation service.
    pub fn new() -> Self {
        Self
    }

    /// Picks the smallest table that seats the party.
    ///
    /// Ties go to the first candidate in iteration order.
    pub fn allocate<'a, I>(
        &self,
        reservation: &Reservation,
        available_tables: I,
    ) -> Result<TableId, ReservationError>
    where
        I: IntoIterator<Item = &'a AvailableTable>,
    {
        let party_size = reservation.party_size().value();

        let mut best: Option<&AvailableTable> = None;
        for table in available_tables {
            if table.capacity < party_size {
                continue;
            }
            // strict `<` keeps the first of equal capacities
            if best.is_none_or(|current| table.capacity < current.capacity) {
                best = Some(table);
            }
        }

        best.map(|table| table.id.clone())
            .ok_or(ReservationError::NoSuitableTable { party_size })
    }
}
