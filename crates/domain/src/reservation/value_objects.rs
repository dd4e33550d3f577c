//! Value objects for the reservation domain.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReservationError;

/// Unique identifier for a reservation.
///
/// Renders as the hyphenated UUID string, which is the opaque id handed back
/// to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random reservation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a reservation ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReservationId {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ReservationError::InvalidReservationId {
                value: s.to_string(),
            })
    }
}

impl From<Uuid> for ReservationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<ReservationId> for Uuid {
    fn from(id: ReservationId) -> Self {
        id.0
    }
}

/// Identifier of a physical table, owned by the seating context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Creates a new table ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the table ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TableId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Number of guests, between one and [`PartySize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct PartySize(u32);

impl PartySize {
    /// Largest party accepted; matches a signed 32-bit storage column.
    pub const MAX: u32 = i32::MAX as u32;

    /// Creates a party size, rejecting values outside `1..=MAX`.
    pub fn new(value: i64) -> Result<Self, ReservationError> {
        if !(1..=i64::from(Self::MAX)).contains(&value) {
            return Err(ReservationError::InvalidPartySize { value });
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| ReservationError::InvalidPartySize { value })
    }

    /// Returns the number of guests.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for PartySize {
    type Error = ReservationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartySize> for u32 {
    fn from(size: PartySize) -> Self {
        size.0
    }
}

impl std::fmt::Display for PartySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A half-open time range `[start, end)` for a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        TimeSlot::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

impl TimeSlot {
    /// Creates a slot; `start` must strictly precede `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ReservationError> {
        if start >= end {
            return Err(ReservationError::InvalidTimeSlot { start, end });
        }
        Ok(Self { start, end })
    }

    /// Creates a slot of `duration_min` minutes beginning at `start`.
    pub fn starting_at(start: DateTime<Utc>, duration_min: i64) -> Result<Self, ReservationError> {
        let end = TimeDelta::try_minutes(duration_min)
            .and_then(|delta| start.checked_add_signed(delta))
            .ok_or(ReservationError::InvalidDuration { duration_min })?;
        Self::new(start, end)
    }

    /// Returns the slot start.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the slot end.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the slot.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if the two slots share any instant.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
