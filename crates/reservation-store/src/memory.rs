use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use domain::{
    PersistenceError, PersistenceResult, Reservation, ReservationId, ReservationRepository,
    TimeSlot, Transaction, UnitOfWork,
};
use tokio::sync::RwLock;

type Rows = HashMap<ReservationId, Reservation>;

/// In-memory unit of work for tests and the default server mode.
///
/// Committed reservations live in a shared map. Each transaction stages its
/// writes privately and applies them under the write lock on commit, so a
/// dropped or rolled back transaction leaves the map untouched.
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWork {
    rows: Arc<RwLock<Rows>>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl InMemoryUnitOfWork {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of committed reservations.
    pub async fn reservation_count(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Returns a committed reservation without opening a transaction.
    pub async fn snapshot(&self, reservation_id: &ReservationId) -> Option<Reservation> {
        self.rows.read().await.get(reservation_id).cloned()
    }

    /// Returns how many transactions have committed.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Returns how many transactions were explicitly rolled back.
    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Removes every committed reservation.
    pub async fn clear(&self) {
        self.rows.write().await.clear();
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> PersistenceResult<InMemoryTransaction> {
        Ok(InMemoryTransaction {
            repository: InMemoryReservationRepository {
                rows: Arc::clone(&self.rows),
                staged: Vec::new(),
                read: HashMap::new(),
            },
            commits: Arc::clone(&self.commits),
            rollbacks: Arc::clone(&self.rollbacks),
        })
    }
}

/// A transaction over [`InMemoryUnitOfWork`].
pub struct InMemoryTransaction {
    repository: InMemoryReservationRepository,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    type Repository = InMemoryReservationRepository;

    fn reservations(&mut self) -> &mut InMemoryReservationRepository {
        &mut self.repository
    }

    async fn commit(self) -> PersistenceResult<()> {
        let mut rows = self.repository.rows.write().await;

        // Writes staged here may collide with rows committed after they were staged.
        for (index, staged) in self.repository.staged.iter().enumerate() {
            let later = &self.repository.staged[index + 1..];
            let superseded = later.iter().any(|w| w.reservation.id() == staged.reservation.id());
            if superseded {
                continue;
            }
            if staged.is_insert && rows.contains_key(&staged.reservation.id()) {
                return Err(duplicate_id(&staged.reservation));
            }
            if !staged.is_insert {
                let current = rows
                    .get(&staged.reservation.id())
                    .ok_or_else(|| missing(&staged.reservation))?;
                if self
                    .repository
                    .read
                    .get(&staged.reservation.id())
                    .is_some_and(|seen| seen != current)
                {
                    return Err(modified(&staged.reservation));
                }
            }
            if let Some(other) = rows
                .values()
                .find(|other| holds_same_table(other, &staged.reservation))
            {
                return Err(table_taken(&staged.reservation, other));
            }
        }

        for staged in self.repository.staged {
            rows.insert(staged.reservation.id(), staged.reservation);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> PersistenceResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct StagedWrite {
    reservation: Reservation,
    is_insert: bool,
}

/// Repository handle bound to an [`InMemoryTransaction`].
///
/// Reads see committed rows overlaid with this transaction's own writes.
/// Committed rows it reads are remembered; updating one that another
/// transaction changed in the meantime fails at commit.
pub struct InMemoryReservationRepository {
    rows: Arc<RwLock<Rows>>,
    staged: Vec<StagedWrite>,
    read: Rows,
}

impl InMemoryReservationRepository {
    fn staged_version(&self, reservation_id: &ReservationId) -> Option<&Reservation> {
        self.staged
            .iter()
            .rev()
            .map(|w| &w.reservation)
            .find(|r| r.id() == *reservation_id)
    }

    async fn visible(&self) -> Rows {
        let mut view = self.rows.read().await.clone();
        for write in &self.staged {
            view.insert(write.reservation.id(), write.reservation.clone());
        }
        view
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn get(
        &mut self,
        reservation_id: &ReservationId,
    ) -> PersistenceResult<Option<Reservation>> {
        if let Some(reservation) = self.staged_version(reservation_id) {
            return Ok(Some(reservation.clone()));
        }
        let found = self.rows.read().await.get(reservation_id).cloned();
        if let Some(reservation) = &found {
            self.read
                .entry(*reservation_id)
                .or_insert_with(|| reservation.clone());
        }
        Ok(found)
    }

    async fn add(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
        let view = self.visible().await;
        if view.contains_key(&reservation.id()) {
            return Err(duplicate_id(reservation));
        }
        if let Some(other) = view.values().find(|o| holds_same_table(o, reservation)) {
            return Err(table_taken(reservation, other));
        }

        self.staged.push(StagedWrite {
            reservation: reservation.clone(),
            is_insert: true,
        });
        Ok(())
    }

    async fn update(&mut self, reservation: &Reservation) -> PersistenceResult<()> {
        let view = self.visible().await;
        if !view.contains_key(&reservation.id()) {
            return Err(missing(reservation));
        }
        if let Some(other) = view.values().find(|o| holds_same_table(o, reservation)) {
            return Err(table_taken(reservation, other));
        }

        // An update to a row inserted in this transaction is still an insert.
        let is_insert = self
            .staged
            .iter()
            .any(|w| w.is_insert && w.reservation.id() == reservation.id());
        self.staged.push(StagedWrite {
            reservation: reservation.clone(),
            is_insert,
        });
        Ok(())
    }

    async fn list_for_slot(&mut self, slot: &TimeSlot) -> PersistenceResult<Vec<Reservation>> {
        let mut found: Vec<_> = self
            .visible()
            .await
            .into_values()
            .filter(|r| r.slot() == slot)
            .collect();
        found.sort_by_key(|r| r.id().as_uuid());
        Ok(found)
    }
}

/// True when `other` is a different active reservation holding the same
/// table for the same slot as `candidate`.
fn holds_same_table(other: &Reservation, candidate: &Reservation) -> bool {
    other.id() != candidate.id()
        && other.status().is_active()
        && candidate.status().is_active()
        && other.slot() == candidate.slot()
        && other.table_id().is_some()
        && other.table_id() == candidate.table_id()
}

fn duplicate_id(reservation: &Reservation) -> PersistenceError {
    PersistenceError::Conflict {
        message: format!("reservation {} already exists", reservation.id()),
    }
}

fn missing(reservation: &Reservation) -> PersistenceError {
    PersistenceError::Database {
        message: format!("reservation {} is not stored", reservation.id()),
    }
}

fn modified(reservation: &Reservation) -> PersistenceError {
    PersistenceError::Conflict {
        message: format!("reservation {} was modified concurrently", reservation.id()),
    }
}

fn table_taken(reservation: &Reservation, other: &Reservation) -> PersistenceError {
    PersistenceError::Conflict {
        message: format!(
            "table {} is already held by reservation {} for {}",
            reservation
                .table_id()
                .map(|t| t.as_str())
                .unwrap_or_default(),
            other.id(),
            reservation.slot()
        ),
    }
}
