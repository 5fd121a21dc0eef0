use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::availability::{parse_date, parse_time, AvailabilityResolver, PgScheduleStore};
use crate::db::models::{Booking, BookingStatus, NewBooking, ReschedulePayload};
use crate::db::repositories::BookingRepository;
use crate::db::DatabaseError;
use crate::error::{AppError, AppResult};

const SLOT_TAKEN: &str = "that time was just taken, please choose another";

fn resolver(state: &AppState) -> AvailabilityResolver<PgScheduleStore> {
    AvailabilityResolver::new(PgScheduleStore::new(state.db.clone()))
}

/// POST /api/bookings
///
/// The availability check here is advisory; the unique index on active
/// bookings is what actually prevents a concurrent double-book, surfacing as
/// a conflict on insert.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    payload.validate()?;
    let date = parse_date(&payload.date)?;
    let time = parse_time(&payload.time)?;

    if !resolver(&state).is_slot_free(date, time).await {
        return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
    }

    let mut tx = state.db.begin().await.map_err(DatabaseError::from)?;
    let booking = BookingRepository::create(
        &mut tx,
        date,
        time,
        &payload.customer_name,
        &payload.customer_email,
        &payload.customer_phone,
        payload.notes.as_deref(),
        payload.user_id,
    )
    .await
    .map_err(conflict_on_duplicate)?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(booking_id = %booking.id, date = %booking.date, "booking created");
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = BookingRepository::get_by_id(&state.db, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
    Ok(Json(booking))
}

/// POST /api/bookings/{id}/cancel — a status transition, never a delete.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let existing = BookingRepository::get_by_id(&state.db, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    if existing.status == BookingStatus::Completed {
        return Err(AppError::Conflict(
            "a completed booking cannot be cancelled".to_string(),
        ));
    }

    let booking =
        BookingRepository::set_status(&state.db, booking_id, BookingStatus::Cancelled).await?;
    info!(booking_id = %booking.id, "booking cancelled");
    Ok(Json(booking))
}

/// POST /api/bookings/{id}/reschedule — moves the booking to a new date and
/// time under the same exclusivity guard; the row keeps its id.
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<ReschedulePayload>,
) -> AppResult<Json<Booking>> {
    let date = parse_date(&payload.date)?;
    let time = parse_time(&payload.time)?;

    let existing = BookingRepository::get_by_id(&state.db, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    if !existing.status.is_active() || existing.status == BookingStatus::Completed {
        return Err(AppError::Conflict(
            "only confirmed bookings can be rescheduled".to_string(),
        ));
    }

    if !resolver(&state).is_slot_free(date, time).await {
        return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
    }

    let mut tx = state.db.begin().await.map_err(DatabaseError::from)?;
    let booking = BookingRepository::reschedule(&mut tx, booking_id, date, time)
        .await
        .map_err(conflict_on_duplicate)?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(booking_id = %booking.id, date = %booking.date, "booking rescheduled");
    Ok(Json(booking))
}

fn conflict_on_duplicate(err: DatabaseError) -> AppError {
    match err {
        DatabaseError::Duplicate => AppError::Conflict(SLOT_TAKEN.to_string()),
        other => AppError::Database(other),
    }
}
