//! End-to-end use-case tests against the in-memory unit of work.

use chrono::{DateTime, TimeZone, Utc};
use domain::{
    AvailableTable, CancelReservation, CompleteReservation, ConfirmReservation,
    ConfirmationPolicy, CreateReservation, DomainError, ErrorKind, PersistenceError,
    ReservationError, ReservationId, ReservationService, ReservationStatus, TableId, TimeSlot,
};
use reservation_store::InMemoryUnitOfWork;

fn slot_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 1, 19, 0, 0).unwrap()
}

fn floor_plan() -> Vec<AvailableTable> {
    vec![AvailableTable::new("T1", 2), AvailableTable::new("T2", 4)]
}

fn service(uow: &InMemoryUnitOfWork) -> ReservationService<InMemoryUnitOfWork> {
    ReservationService::new(uow.clone())
}

#[tokio::test]
async fn creates_confirmed_reservation_on_best_fit_table() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow);

    let id = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 3), &floor_plan())
        .await
        .unwrap();

    let stored = uow.snapshot(&id).await.unwrap();
    assert_eq!(stored.table_id(), Some(&TableId::new("T2")));
    assert_eq!(stored.status(), ReservationStatus::Confirmed);
    assert_eq!(stored.party_size().value(), 3);
    assert_eq!(stored.slot().start(), slot_start());
    assert_eq!(stored.slot().duration().num_minutes(), 90);
    assert_eq!(uow.commit_count(), 1);
}

#[tokio::test]
async fn returned_id_is_canonical_uuid_string() {
    let uow = InMemoryUnitOfWork::new();
    let id = service(&uow)
        .create_reservation(CreateReservation::new(slot_start(), 60, 2), &floor_plan())
        .await
        .unwrap();

    let rendered = id.to_string();
    assert_eq!(rendered.len(), 36);
    assert_eq!(rendered.parse::<ReservationId>().unwrap(), id);
}

#[tokio::test]
async fn negative_duration_leaves_store_empty() {
    let uow = InMemoryUnitOfWork::new();

    let err = service(&uow)
        .create_reservation(CreateReservation::new(slot_start(), -10, 2), &floor_plan())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::InvariantViolation));
    assert_eq!(uow.reservation_count().await, 0);
    assert_eq!(uow.commit_count(), 0);
}

#[tokio::test]
async fn zero_party_leaves_store_empty() {
    let uow = InMemoryUnitOfWork::new();

    let err = service(&uow)
        .create_reservation(CreateReservation::new(slot_start(), 60, 0), &floor_plan())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Reservation(ReservationError::InvalidPartySize { value: 0 })
    ));
    assert_eq!(uow.reservation_count().await, 0);
}

#[tokio::test]
async fn oversized_party_is_rejected_without_writes() {
    let uow = InMemoryUnitOfWork::new();

    let err = service(&uow)
        .create_reservation(CreateReservation::new(slot_start(), 60, 5), &floor_plan())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::NoSuitableTable));
    assert_eq!(uow.reservation_count().await, 0);
}

#[tokio::test]
async fn empty_floor_plan_is_no_suitable_table() {
    let uow = InMemoryUnitOfWork::new();

    let err = service(&uow)
        .create_reservation(CreateReservation::new(slot_start(), 60, 1), &[])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::NoSuitableTable));
}

#[tokio::test]
async fn second_booking_of_same_table_and_slot_conflicts() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow);
    let only_table = [AvailableTable::new("T1", 4)];

    service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &only_table)
        .await
        .unwrap();
    let err = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &only_table)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Persistence(PersistenceError::Conflict { .. })
    ));
    assert_eq!(uow.reservation_count().await, 1);
}

#[tokio::test]
async fn concurrent_bookings_of_one_table_commit_once() {
    let uow = InMemoryUnitOfWork::new();
    let service = std::sync::Arc::new(service(&uow));
    let only_table = vec![AvailableTable::new("T1", 4)];

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = std::sync::Arc::clone(&service);
        let tables = only_table.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_reservation(CreateReservation::new(slot_start(), 90, 2), &tables)
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(uow.reservation_count().await, 1);
}

#[tokio::test]
async fn deferred_policy_then_confirm_cancel() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow).with_policy(ConfirmationPolicy::Deferred);

    let id = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &floor_plan())
        .await
        .unwrap();
    assert_eq!(
        uow.snapshot(&id).await.unwrap().status(),
        ReservationStatus::Created
    );

    let confirmed = service
        .confirm_reservation(ConfirmReservation::new(id))
        .await
        .unwrap();
    assert_eq!(confirmed.status(), ReservationStatus::Confirmed);

    let cancelled = service
        .cancel_reservation(CancelReservation::new(id))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), ReservationStatus::Cancelled);
    assert_eq!(
        uow.snapshot(&id).await.unwrap().status(),
        ReservationStatus::Cancelled
    );
}

#[tokio::test]
async fn cancelled_booking_frees_the_table() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow);
    let only_table = [AvailableTable::new("T1", 4)];

    let first = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &only_table)
        .await
        .unwrap();
    service
        .cancel_reservation(CancelReservation::new(first))
        .await
        .unwrap();

    let second = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &only_table)
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(uow.reservation_count().await, 2);
}

#[tokio::test]
async fn completed_reservation_cannot_be_cancelled() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow);
    let id = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &floor_plan())
        .await
        .unwrap();

    service
        .complete_reservation(CompleteReservation::new(id))
        .await
        .unwrap();
    let err = service
        .cancel_reservation(CancelReservation::new(id))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(ErrorKind::InvariantViolation));
    assert_eq!(
        uow.snapshot(&id).await.unwrap().status(),
        ReservationStatus::Completed
    );
}

#[tokio::test]
async fn concurrent_complete_and_cancel_keep_one_outcome() {
    for _ in 0..16 {
        let uow = InMemoryUnitOfWork::new();
        let service = std::sync::Arc::new(service(&uow));
        let id = service
            .create_reservation(CreateReservation::new(slot_start(), 90, 2), &floor_plan())
            .await
            .unwrap();

        let completing = {
            let service = std::sync::Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .complete_reservation(CompleteReservation::new(id))
                    .await
            })
        };
        let cancelling = {
            let service = std::sync::Arc::clone(&service);
            tokio::spawn(async move { service.cancel_reservation(CancelReservation::new(id)).await })
        };
        let completed = completing.await.unwrap();
        let cancelled = cancelling.await.unwrap();

        // Whichever lost saw either the other's status or a stale row.
        assert!(completed.is_ok() != cancelled.is_ok());
        let stored = uow.snapshot(&id).await.unwrap().status();
        let winner = completed.or(cancelled).unwrap().status();
        assert_eq!(stored, winner);
    }
}

#[tokio::test]
async fn unknown_reservation_is_not_found() {
    let uow = InMemoryUnitOfWork::new();
    let missing = ReservationId::new();

    let err = service(&uow)
        .confirm_reservation(ConfirmReservation::new(missing))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::ReservationNotFound(id) if id == missing));
    assert_eq!(err.kind(), None);
    assert_eq!(
        service(&uow).get_reservation(&missing).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn lists_reservations_for_exact_slot() {
    let uow = InMemoryUnitOfWork::new();
    let service = service(&uow);

    let a = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 2), &floor_plan())
        .await
        .unwrap();
    let b = service
        .create_reservation(CreateReservation::new(slot_start(), 90, 3), &floor_plan())
        .await
        .unwrap();
    service
        .create_reservation(CreateReservation::new(slot_start(), 120, 2), &floor_plan())
        .await
        .unwrap();

    let slot = TimeSlot::starting_at(slot_start(), 90).unwrap();
    let mut found: Vec<_> = service
        .reservations_for_slot(&slot)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id())
        .collect();
    found.sort_by_key(|id| id.as_uuid());
    let mut expected = vec![a, b];
    expected.sort_by_key(|id| id.as_uuid());

    assert_eq!(found, expected);
}
