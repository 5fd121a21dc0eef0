use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeMap;
use time::{Date, Month};

use crate::app_state::AppState;
use crate::availability::{parse_date, AvailabilityResolver, PgScheduleStore, ResolvedSlot};
use crate::error::{AppError, AppResult};

fn resolver(state: &AppState) -> AvailabilityResolver<PgScheduleStore> {
    AvailabilityResolver::new(PgScheduleStore::new(state.db.clone()))
}

/// GET /api/availability/{date} — the ordered slot list for one date.
pub async fn list_day_slots(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<ResolvedSlot>>> {
    let date = parse_date(&date)?;
    let slots = resolver(&state).resolve_day(date).await?;
    Ok(Json(slots))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: String,
    pub end: String,
}

/// GET /api/availability?start=...&end=... — per-day slots over a range,
/// truncated to the configured day cap and compacted to days with at least
/// one open slot.
pub async fn list_range_slots(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> AppResult<Json<BTreeMap<Date, Vec<ResolvedSlot>>>> {
    let start = parse_date(&params.start)?;
    let end = parse_date(&params.end)?;

    let days = resolver(&state)
        .resolve_range(start, end, state.env.booking.max_range_days)
        .await?;
    Ok(Json(days))
}

/// GET /api/availability/month/{year}/{month} — the dates in a month with at
/// least one bookable slot.
pub async fn list_month_days(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u8)>,
) -> AppResult<Json<Vec<Date>>> {
    let month = Month::try_from(month)
        .map_err(|_| AppError::BadRequest(format!("not a valid month: {month}")))?;
    let first = Date::from_calendar_date(year, month, 1)
        .map_err(|_| AppError::BadRequest(format!("not a valid month: {year}-{month}")))?;
    let last = Date::from_calendar_date(year, month, month.length(year))
        .map_err(|_| AppError::BadRequest(format!("not a valid month: {year}-{month}")))?;

    let days = resolver(&state).resolve_range(first, last, 31).await?;
    Ok(Json(days.into_keys().collect()))
}
