use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    PartySize, PersistenceResult, Reservation, ReservationId, ReservationRepository,
    ReservationStatus, TableId, TimeSlot, Transaction, UnitOfWork,
};
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{Result, StoreError};

/// PostgreSQL-backed unit of work.
///
/// Every [`begin`](UnitOfWork::begin) opens a database transaction on the
/// pool. The partial unique index on `(table_id, start_time, end_time)` makes
/// the second of two concurrent bookings of one table fail at insert or
/// commit time. Updates are conditional on the row still matching what the
/// transaction read, so a concurrent transition surfaces as a conflict.
#[derive(Clone)]
pub struct PostgresUnitOfWork {
    pool: PgPool,
}

impl PostgresUnitOfWork {
    /// Creates a new PostgreSQL unit of work.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    type Transaction = PostgresTransaction;

    async fn begin(&self) -> PersistenceResult<PostgresTransaction> {
        let tx = self.pool.begin().await.map_err(StoreError::from)?;
        Ok(PostgresTransaction {
            repository: PostgresReservationRepository {
                tx,
                read: HashMap::new(),
            },
        })
    }
}

/// A database transaction. Dropping it without commit rolls it back.
pub struct PostgresTransaction {
    repository: PostgresReservationRepository,
}

#[async_trait]
impl Transaction for PostgresTransaction {
    type Repository = PostgresReservationRepository;

    fn reservations(&mut self) -> &mut PostgresReservationRepository {
        &mut self.repository
    }

    async fn commit(self) -> PersistenceResult<()> {
        self.repository
            .tx
            .commit()
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn rollback(self) -> PersistenceResult<()> {
        self.repository
            .tx
            .rollback()
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}

/// Repository handle running its queries inside a [`PostgresTransaction`].
pub struct PostgresReservationRepository {
    tx: sqlx::Transaction<'static, Postgres>,
    /// Row state as last read or written by this transaction.
    read: HashMap<ReservationId, Reservation>,
}

impl PostgresReservationRepository {
    fn row_to_reservation(row: PgRow) -> Result<Reservation> {
        let id: Uuid = row.try_get("reservation_id")?;
        let table_id: Option<String> = row.try_get("table_id")?;
        let status: String = row.try_get("status")?;
        let start: DateTime<Utc> = row.try_get("start_time")?;
        let end: DateTime<Utc> = row.try_get("end_time")?;
        let party_size: i32 = row.try_get("party_size")?;

        let corrupted = |detail: String| StoreError::Corrupted(format!("reservation {id}: {detail}"));

        let status = status
            .parse::<ReservationStatus>()
            .map_err(|e| corrupted(e.to_string()))?;
        let slot = TimeSlot::new(start, end).map_err(|e| corrupted(e.to_string()))?;
        let party_size =
            PartySize::new(i64::from(party_size)).map_err(|e| corrupted(e.to_string()))?;

        Reservation::restore(
            ReservationId::from_uuid(id),
            slot,
            party_size,
            table_id.map(TableId::from),
            status,
        )
        .map_err(|e| corrupted(e.to_string()))
    }

    async fn fetch_one(&mut self, reservation_id: &ReservationId) -> Result<Option<Reservation>> {
        let row = sqlx::query(
            r#"
            SELECT reservation_id, table_id, status, start_time, end_time, party_size
            FROM reservations
            WHERE reservation_id = $1
            "#,
        )
        .bind(reservation_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(Self::row_to_reservation).transpose()
    }

    async fn insert(&mut self, reservation: &Reservation) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reservations (reservation_id, table_id, status, start_time, end_time, party_size)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reservation.id().as_uuid())
        .bind(reservation.table_id().map(|t| t.as_str()))
        .bind(reservation.status().as_str())
        .bind(reservation.slot().start())
        .bind(reservation.slot().end())
        .bind(party_size_column(reservation)?)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    /// Writes `reservation` over its stored row.
    ///
    /// When this transaction read the row earlier, the write only applies if
    /// the stored status and table are still the ones it read.
    async fn overwrite(&mut self, reservation: &Reservation) -> Result<()> {
        let expected = self.read.get(&reservation.id());

        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET table_id = $2, status = $3, start_time = $4, end_time = $5, party_size = $6
            WHERE reservation_id = $1
              AND ($7::TEXT IS NULL OR (status = $7 AND table_id IS NOT DISTINCT FROM $8))
            "#,
        )
        .bind(reservation.id().as_uuid())
        .bind(reservation.table_id().map(|t| t.as_str()))
        .bind(reservation.status().as_str())
        .bind(reservation.slot().start())
        .bind(reservation.slot().end())
        .bind(party_size_column(reservation)?)
        .bind(expected.map(|r| r.status().as_str()))
        .bind(expected.and_then(|r| r.table_id()).map(|t| t.as_str()))
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            let id = reservation.id().to_string();
            return Err(match expected {
                Some(_) => StoreError::Stale(id),
                None => StoreError::Missing(id),
            });
        }

        self.read.insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn fetch_for_slot(&mut self, slot: &TimeSlot) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT reservation_id, table_id, status, start_time, end_time, party_size
            FROM reservations
            WHERE start_time = $1 AND end_time = $2
            ORDER BY reservation_id ASC
            "#,
        )
        .bind(slot.start())
        .bind(slot.end())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(Self::row_to_reservation).collect()
    }
}

fn party_size_column(reservation: &Reservation) -> Result<i32> {
    i32::try_from(reservation.party_size().value()).map_err(|_| {
        StoreError::Corrupted(format!(
            "party size {} does not fit the party_size column",
            reservation.party_size()
        ))
    })
}

#[async_trait]
impl ReservationRepository for PostgresReservationRepository {
    async fn get(
        &mut self,
        reservation_id: &ReservationId,
    ) -> PersistenceResult<Option<Reservation>> {
        let found = self.fetch_one(reservation_id).await?;
        if let Some(reservation) = &found {
            self.read.insert(*reservation_id, reservation.clone());
        }
        Ok(found)
    }

    async fn add(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
        tracing::debug!(reservation_id = %reservation.id(), "Inserting reservation");
        self.insert(reservation).await?;
        self.read.insert(reservation.id(), reservation.clone());
        Ok(())
    }

    async fn update(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
        tracing::debug!(
            reservation_id = %reservation.id(),
            status = %reservation.status(),
            "Updating reservation"
        );
        Ok(self.overwrite(reservation).await?)
    }

    async fn list_for_slot(&mut self, slot: &TimeSlot) -> PersistenceResult<Vec<Reservation>> {
        Ok(self.fetch_for_slot(slot).await?)
    }
}
