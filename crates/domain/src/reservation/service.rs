//! Reservation use cases.

use std::time::Instant;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;
use crate::ports::{ReservationRepository, Transaction, UnitOfWork};

use super::{
    AvailableTable, CancelReservation, CompleteReservation, ConfirmReservation,
    CreateReservation, Reservation, ReservationAggregate, ReservationError, ReservationEvent,
    ReservationFactory, ReservationId, ReservationStatus, TableAllocationService, TimeSlot,
};

/// Whether creation confirms the reservation straight after table assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConfirmationPolicy {
    /// Assign and confirm in the same request.
    #[default]
    Immediate,

    /// Persist in `Created` with a table; confirmation is a separate request.
    Deferred,
}

impl ConfirmationPolicy {
    /// Returns the policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationPolicy::Immediate => "immediate",
            ConfirmationPolicy::Deferred => "deferred",
        }
    }

    /// Returns the status a successfully created reservation is stored with.
    pub fn created_status(&self) -> ReservationStatus {
        match self {
            ConfirmationPolicy::Immediate => ReservationStatus::Confirmed,
            ConfirmationPolicy::Deferred => ReservationStatus::Created,
        }
    }
}

impl std::str::FromStr for ConfirmationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(ConfirmationPolicy::Immediate),
            "deferred" => Ok(ConfirmationPolicy::Deferred),
            other => Err(format!("unknown confirmation policy: {other}")),
        }
    }
}

impl std::fmt::Display for ConfirmationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service for managing reservations.
///
/// Orchestrates factory, allocation and aggregate operations, and persists
/// the outcome through the unit of work. Every use case runs inside one
/// transaction that is committed on success and rolled back on any failure.
pub struct ReservationService<U: UnitOfWork> {
    uow: U,
    allocator: TableAllocationService,
    policy: ConfirmationPolicy,
}

impl<U: UnitOfWork> ReservationService<U> {
    /// Creates a service with the default (immediate) confirmation policy.
    pub fn new(uow: U) -> Self {
        Self {
            uow,
            allocator: TableAllocationService::new(),
            policy: ConfirmationPolicy::default(),
        }
    }

    /// Sets the confirmation policy.
    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the confirmation policy.
    pub fn policy(&self) -> ConfirmationPolicy {
        self.policy
    }

    /// Returns a reference to the underlying unit of work.
    pub fn unit_of_work(&self) -> &U {
        &self.uow
    }

    /// Creates a reservation, assigns the tightest-fitting table and persists it.
    ///
    /// Factory and allocation failures abort before a transaction is opened,
    /// so nothing is written.
    #[tracing::instrument(
        skip(self, cmd, available_tables),
        fields(
            party_size = cmd.party_size,
            duration_min = cmd.duration_min,
            policy = %self.policy,
        )
    )]
    pub async fn create_reservation(
        &self,
        cmd: CreateReservation,
        available_tables: &[AvailableTable],
    ) -> Result<ReservationId, DomainError> {
        let started = Instant::now();

        let reservation =
            ReservationFactory::create(cmd.slot_start, cmd.duration_min, cmd.party_size)?;
        let mut aggregate = ReservationAggregate::create(reservation);

        let table_id = self
            .allocator
            .allocate(aggregate.root(), available_tables)
            .inspect_err(|_| {
                metrics::counter!("reservation_allocation_failures_total").increment(1);
            })?;
        aggregate.assign_table(table_id)?;

        if self.policy == ConfirmationPolicy::Immediate {
            aggregate.confirm()?;
        }

        let mut tx = self.uow.begin().await?;
        if let Err(err) = tx.reservations().add(aggregate.root()).await {
            return Err(rollback(tx, err).await);
        }
        tx.commit().await?;

        let reservation_id = *aggregate.id();
        publish(aggregate.take_events());

        metrics::counter!("reservations_created_total").increment(1);
        metrics::histogram!("reservation_create_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(
            %reservation_id,
            table_id = ?aggregate.root().table_id().map(|t| t.as_str()),
            status = %aggregate.root().status(),
            "reservation created"
        );

        Ok(reservation_id)
    }

    /// Confirms a reservation that already holds a table.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_reservation(
        &self,
        cmd: ConfirmReservation,
    ) -> Result<Reservation, DomainError> {
        self.transition(cmd.reservation_id, ReservationAggregate::confirm)
            .await
    }

    /// Cancels a reservation. Cancelling twice succeeds without a second write.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        cmd: CancelReservation,
    ) -> Result<Reservation, DomainError> {
        self.transition(cmd.reservation_id, ReservationAggregate::cancel)
            .await
    }

    /// Marks a confirmed reservation as completed.
    #[tracing::instrument(skip(self))]
    pub async fn complete_reservation(
        &self,
        cmd: CompleteReservation,
    ) -> Result<Reservation, DomainError> {
        self.transition(cmd.reservation_id, ReservationAggregate::mark_completed)
            .await
    }

    /// Loads a reservation by ID.
    ///
    /// Returns None if the reservation doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_reservation(
        &self,
        reservation_id: &ReservationId,
    ) -> Result<Option<Reservation>, DomainError> {
        let mut tx = self.uow.begin().await?;
        let reservation = match tx.reservations().get(reservation_id).await {
            Ok(reservation) => reservation,
            Err(err) => return Err(rollback(tx, err).await),
        };
        tx.commit().await?;
        Ok(reservation)
    }

    /// Lists reservations booked for exactly this slot.
    #[tracing::instrument(skip(self))]
    pub async fn reservations_for_slot(
        &self,
        slot: &TimeSlot,
    ) -> Result<Vec<Reservation>, DomainError> {
        let mut tx = self.uow.begin().await?;
        let reservations = match tx.reservations().list_for_slot(slot).await {
            Ok(reservations) => reservations,
            Err(err) => return Err(rollback(tx, err).await),
        };
        tx.commit().await?;
        Ok(reservations)
    }

    /// Loads a reservation, applies one aggregate operation and saves it.
    async fn transition<F>(
        &self,
        reservation_id: ReservationId,
        action: F,
    ) -> Result<Reservation, DomainError>
    where
        F: FnOnce(&mut ReservationAggregate) -> Result<(), ReservationError> + Send,
    {
        let mut tx = self.uow.begin().await?;

        let reservation = match tx.reservations().get(&reservation_id).await {
            Ok(Some(reservation)) => reservation,
            Ok(None) => {
                return Err(rollback(tx, DomainError::ReservationNotFound(reservation_id)).await);
            }
            Err(err) => return Err(rollback(tx, err).await),
        };

        let mut aggregate = ReservationAggregate::new(reservation);
        if let Err(err) = action(&mut aggregate) {
            return Err(rollback(tx, err).await);
        }

        // idempotent no-ops record nothing and need no write
        if aggregate.has_pending_events()
            && let Err(err) = tx.reservations().update(aggregate.root()).await
        {
            return Err(rollback(tx, err).await);
        }
        tx.commit().await?;

        publish(aggregate.take_events());
        tracing::info!(
            %reservation_id,
            status = %aggregate.root().status(),
            "reservation updated"
        );

        Ok(aggregate.into_root())
    }
}

/// Rolls the transaction back and returns the error that caused it.
async fn rollback<T, E>(tx: T, err: E) -> DomainError
where
    T: Transaction,
    E: Into<DomainError>,
{
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(error = %rollback_err, "transaction rollback failed");
    }
    err.into()
}

/// Publishes drained events to the log and metrics.
fn publish(events: Vec<ReservationEvent>) {
    for event in events {
        metrics::counter!("reservation_events_total", "event_type" => event.event_type())
            .increment(1);
        tracing::info!(
            aggregate_type = ReservationAggregate::aggregate_type(),
            event_type = event.event_type(),
            reservation_id = %event.reservation_id(),
            occurred_at = %event.occurred_at(),
            "domain event"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::ports::{PersistenceError, PersistenceResult};
    use crate::reservation::{ErrorKind, ReservationStatus, TableId};

    #[derive(Default)]
    struct FakeState {
        rows: HashMap<ReservationId, Reservation>,
        commits: usize,
        rollbacks: usize,
        fail_writes: bool,
    }

    #[derive(Clone, Default)]
    struct FakeUnitOfWork {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeUnitOfWork {
        fn rows(&self) -> usize {
            self.state.lock().unwrap().rows.len()
        }

        fn commits(&self) -> usize {
            self.state.lock().unwrap().commits
        }

        fn rollbacks(&self) -> usize {
            self.state.lock().unwrap().rollbacks
        }

        fn fail_writes(&self) {
            self.state.lock().unwrap().fail_writes = true;
        }
    }

    struct FakeRepository {
        state: Arc<Mutex<FakeState>>,
        staged: HashMap<ReservationId, Reservation>,
    }

    struct FakeTransaction {
        repo: FakeRepository,
    }

    #[async_trait]
    impl ReservationRepository for FakeRepository {
        async fn get(
            &mut self,
            reservation_id: &ReservationId,
        ) -> PersistenceResult<Option<Reservation>> {
            if let Some(staged) = self.staged.get(reservation_id) {
                return Ok(Some(staged.clone()));
            }
            Ok(self.state.lock().unwrap().rows.get(reservation_id).cloned())
        }

        async fn add(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
            if self.state.lock().unwrap().fail_writes {
                return Err(PersistenceError::Database {
                    message: "disk full".to_string(),
                });
            }
            self.staged.insert(reservation.id(), reservation.clone());
            Ok(())
        }

        async fn update(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
            self.add(reservation).await
        }

        async fn list_for_slot(&mut self, slot: &TimeSlot) -> PersistenceResult<Vec<Reservation>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .rows
                .values()
                .filter(|r| r.slot() == slot)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl Transaction for FakeTransaction {
        type Repository = FakeRepository;

        fn reservations(&mut self) -> &mut FakeRepository {
            &mut self.repo
        }

        async fn commit(self) -> PersistenceResult<()> {
            let mut state = self.repo.state.lock().unwrap();
            state.rows.extend(self.repo.staged);
            state.commits += 1;
            Ok(())
        }

        async fn rollback(self) -> PersistenceResult<()> {
            self.repo.state.lock().unwrap().rollbacks += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl UnitOfWork for FakeUnitOfWork {
        type Transaction = FakeTransaction;

        async fn begin(&self) -> PersistenceResult<FakeTransaction> {
            Ok(FakeTransaction {
                repo: FakeRepository {
                    state: self.state.clone(),
                    staged: HashMap::new(),
                },
            })
        }
    }

    fn dinner() -> CreateReservation {
        CreateReservation::new(Utc.with_ymd_and_hms(2030, 1, 1, 19, 0, 0).unwrap(), 90, 3)
    }

    fn tables() -> Vec<AvailableTable> {
        vec![AvailableTable::new("T1", 2), AvailableTable::new("T2", 4)]
    }

    #[tokio::test]
    async fn test_create_reservation_confirms_immediately() {
        let uow = FakeUnitOfWork::default();
        let service = ReservationService::new(uow.clone());

        let id = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap();

        let saved = service.get_reservation(&id).await.unwrap().unwrap();
        assert_eq!(saved.table_id(), Some(&TableId::new("T2")));
        assert_eq!(saved.status(), ReservationStatus::Confirmed);
        assert!(!id.to_string().is_empty());
        assert_eq!(uow.rows(), 1);
    }

    #[tokio::test]
    async fn test_deferred_policy_persists_created() {
        let service = ReservationService::new(FakeUnitOfWork::default())
            .with_policy(ConfirmationPolicy::Deferred);

        let id = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap();
        let saved = service.get_reservation(&id).await.unwrap().unwrap();
        assert_eq!(saved.status(), ReservationStatus::Created);
        assert_eq!(saved.status(), service.policy().created_status());
        assert_eq!(saved.table_id(), Some(&TableId::new("T2")));

        let confirmed = service
            .confirm_reservation(ConfirmReservation::new(id))
            .await
            .unwrap();
        assert_eq!(confirmed.status(), ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_invalid_duration_never_opens_transaction() {
        let uow = FakeUnitOfWork::default();
        let service = ReservationService::new(uow.clone());

        let cmd = CreateReservation::new(dinner().slot_start, -10, 2);
        let err = service
            .create_reservation(cmd, &[AvailableTable::new("T1", 4)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::InvariantViolation));
        assert_eq!(uow.rows(), 0);
        assert_eq!(uow.commits(), 0);
        assert_eq!(uow.rollbacks(), 0);
    }

    #[tokio::test]
    async fn test_no_suitable_table_writes_nothing() {
        let uow = FakeUnitOfWork::default();
        let service = ReservationService::new(uow.clone());

        let cmd = CreateReservation::new(dinner().slot_start, 60, 6);
        let err = service.create_reservation(cmd, &tables()).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Reservation(ReservationError::NoSuitableTable { party_size: 6 })
        ));
        assert_eq!(uow.rows(), 0);
        assert_eq!(uow.commits(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_rolls_back() {
        let uow = FakeUnitOfWork::default();
        uow.fail_writes();
        let service = ReservationService::new(uow.clone());

        let err = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Persistence(_)));
        assert_eq!(uow.rows(), 0);
        assert_eq!(uow.commits(), 0);
        assert_eq!(uow.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_through_service() {
        let service = ReservationService::new(FakeUnitOfWork::default());
        let id = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap();

        let completed = service
            .complete_reservation(CompleteReservation::new(id))
            .await
            .unwrap();
        assert_eq!(completed.status(), ReservationStatus::Completed);

        let err = service
            .cancel_reservation(CancelReservation::new(id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InvariantViolation));

        let stored = service.get_reservation(&id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ReservationStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancel_twice_is_idempotent() {
        let uow = FakeUnitOfWork::default();
        let service = ReservationService::new(uow.clone());
        let id = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap();

        let first = service
            .cancel_reservation(CancelReservation::new(id))
            .await
            .unwrap();
        let second = service
            .cancel_reservation(CancelReservation::new(id))
            .await
            .unwrap();

        assert_eq!(first.status(), ReservationStatus::Cancelled);
        assert_eq!(second.status(), ReservationStatus::Cancelled);
        assert_eq!(uow.commits(), 3);
        assert_eq!(uow.rollbacks(), 0);
    }

    #[tokio::test]
    async fn test_unknown_reservation_is_not_found() {
        let uow = FakeUnitOfWork::default();
        let service = ReservationService::new(uow.clone());
        let id = ReservationId::new();

        let err = service
            .confirm_reservation(ConfirmReservation::new(id))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ReservationNotFound(missing) if missing == id));
        assert_eq!(uow.rollbacks(), 1);
    }

    #[tokio::test]
    async fn test_reservations_for_slot() {
        let service = ReservationService::new(FakeUnitOfWork::default());
        let id = service
            .create_reservation(dinner(), &tables())
            .await
            .unwrap();

        let slot = TimeSlot::starting_at(dinner().slot_start, 90).unwrap();
        let found = service.reservations_for_slot(&slot).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), id);

        let other = TimeSlot::starting_at(dinner().slot_start, 60).unwrap();
        assert!(service.reservations_for_slot(&other).await.unwrap().is_empty());
    }

    #[test]
    fn test_confirmation_policy_parsing() {
        assert_eq!(
            "immediate".parse::<ConfirmationPolicy>(),
            Ok(ConfirmationPolicy::Immediate)
        );
        assert_eq!(
            "Deferred".parse::<ConfirmationPolicy>(),
            Ok(ConfirmationPolicy::Deferred)
        );
        assert!("later".parse::<ConfirmationPolicy>().is_err());
    }

    #[test]
    fn test_created_status_follows_policy() {
        assert_eq!(
            ConfirmationPolicy::Immediate.created_status(),
            ReservationStatus::Confirmed
        );
        assert_eq!(
            ConfirmationPolicy::Deferred.created_status(),
            ReservationStatus::Created
        );
    }
}
