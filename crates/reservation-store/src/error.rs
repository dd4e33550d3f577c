use domain::PersistenceError;
use thiserror::Error;

/// Errors raised inside the storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row does not describe a valid reservation.
    #[error("Corrupted row: {0}")]
    Corrupted(String),

    /// An update targeted a reservation that is not stored.
    #[error("Reservation {0} is not stored")]
    Missing(String),

    /// The row changed after this transaction read it.
    #[error("Reservation {0} was modified concurrently")]
    Stale(String),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Returns true when the database rejected a write on a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<StoreError> for PersistenceError {
    fn from(err: StoreError) -> Self {
        if err.is_unique_violation() {
            return PersistenceError::Conflict {
                message: err.to_string(),
            };
        }

        match err {
            StoreError::Corrupted(message) => PersistenceError::Corrupted { message },
            stale @ StoreError::Stale(_) => PersistenceError::Conflict {
                message: stale.to_string(),
            },
            other => PersistenceError::Database {
                message: other.to_string(),
            },
        }
    }
}
