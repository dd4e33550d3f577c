//! Core aggregate and domain event traits.

use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    ///
    /// Used as the log/metric label when events are published.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregate roots that record domain events.
///
/// An aggregate is a cluster of domain objects that can be treated as a single unit.
/// The aggregate root ensures consistency of changes being made within the aggregate.
///
/// State lives in the root entity and is changed only by the aggregate's
/// operations. Each successful operation may append events:
/// - Events are append-only while the aggregate is alive
/// - A failed operation leaves both state and events untouched
/// - The caller drains events once the change is durable
pub trait Aggregate: Send + Sync {
    /// The type of events this aggregate records.
    type Event: DomainEvent;

    /// The type of errors this aggregate's operations can produce.
    type Error: std::error::Error + Send + Sync;

    /// The identity of the root entity.
    type Id: Clone + Eq + std::hash::Hash + std::fmt::Debug + std::fmt::Display;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the root entity's identifier.
    fn id(&self) -> &Self::Id;

    /// Returns the events recorded so far, oldest first.
    fn events(&self) -> &[Self::Event];

    /// Drains the recorded events, leaving the aggregate with none.
    fn take_events(&mut self) -> Vec<Self::Event>;

    /// Returns true if events have been recorded and not yet drained.
    fn has_pending_events(&self) -> bool {
        !self.events().is_empty()
    }
}
