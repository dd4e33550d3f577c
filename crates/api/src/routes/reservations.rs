//! Reservation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::{
    AvailableTable, CancelReservation, CompleteReservation, ConfirmReservation,
    CreateReservation, Reservation, ReservationId, ReservationService, UnitOfWork,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<U: UnitOfWork> {
    pub reservation_service: ReservationService<U>,
    /// Tables offered to a request that does not list its own.
    pub floor_plan: Vec<AvailableTable>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub slot_start: DateTime<Utc>,
    pub duration_min: i64,
    pub party_size: i64,
    #[serde(default)]
    pub available_tables: Option<Vec<TableRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct TableRequest {
    pub id: String,
    pub capacity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct ReservationCreatedResponse {
    pub reservation_id: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct ReservationResponse {
    pub id: String,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub party_size: u32,
    pub table_id: Option<String>,
    pub status: String,
}

impl From<&Reservation> for ReservationResponse {
    fn from(reservation: &Reservation) -> Self {
        Self {
            id: reservation.id().to_string(),
            slot_start: reservation.slot().start(),
            slot_end: reservation.slot().end(),
            party_size: reservation.party_size().value(),
            table_id: reservation.table_id().map(|t| t.to_string()),
            status: reservation.status().to_string(),
        }
    }
}

// -- Handlers --

/// POST /reservations — book a table for a party.
#[tracing::instrument(skip(state, req))]
pub async fn create<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationCreatedResponse>), ApiError> {
    let tables: Vec<AvailableTable> = match req.available_tables {
        Some(tables) => tables
            .into_iter()
            .map(|t| AvailableTable::new(t.id, t.capacity))
            .collect(),
        None => state.floor_plan.clone(),
    };

    let cmd = CreateReservation::new(req.slot_start, req.duration_min, req.party_size);
    let reservation_id = state
        .reservation_service
        .create_reservation(cmd, &tables)
        .await?;

    let response = ReservationCreatedResponse {
        reservation_id: reservation_id.to_string(),
        status: state
            .reservation_service
            .policy()
            .created_status()
            .to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /reservations/:id — load a reservation by ID.
#[tracing::instrument(skip(state))]
pub async fn get<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation_id: ReservationId = id.parse()?;
    let reservation = state
        .reservation_service
        .get_reservation(&reservation_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reservation {id} not found")))?;

    Ok(Json(ReservationResponse::from(&reservation)))
}

/// POST /reservations/:id/confirm — confirm a reservation holding a table.
#[tracing::instrument(skip(state))]
pub async fn confirm<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state
        .reservation_service
        .confirm_reservation(ConfirmReservation::new(id.parse()?))
        .await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

/// POST /reservations/:id/cancel — cancel a reservation.
#[tracing::instrument(skip(state))]
pub async fn cancel<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state
        .reservation_service
        .cancel_reservation(CancelReservation::new(id.parse()?))
        .await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}

/// POST /reservations/:id/complete — mark a confirmed reservation as completed.
#[tracing::instrument(skip(state))]
pub async fn complete<U: UnitOfWork + 'static>(
    State(state): State<Arc<AppState<U>>>,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let reservation = state
        .reservation_service
        .complete_reservation(CompleteReservation::new(id.parse()?))
        .await?;
    Ok(Json(ReservationResponse::from(&reservation)))
}
