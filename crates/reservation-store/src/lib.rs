//! Storage adapters for the reservation ports.
//!
//! [`InMemoryUnitOfWork`] keeps everything in process and is what tests and
//! the default server mode use. [`PostgresUnitOfWork`] maps each transaction
//! onto a `sqlx` database transaction.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::{InMemoryReservationRepository, InMemoryTransaction, InMemoryUnitOfWork};
pub use postgres::{PostgresReservationRepository, PostgresTransaction, PostgresUnitOfWork};
