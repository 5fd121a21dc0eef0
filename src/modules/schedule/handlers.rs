use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use time::Time;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::availability::{parse_date, parse_time};
use crate::db::models::{
    DateException, ExceptionSlot, NewDateException, NewWeeklyRule, WeeklyRule,
};
use crate::db::repositories::ScheduleRepository;
use crate::error::{AppError, AppResult};

fn check_window(start: Time, end: Time) -> AppResult<()> {
    if start >= end {
        return Err(AppError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(())
}

// Weekly rules

pub async fn create_weekly_rule(
    State(state): State<AppState>,
    Json(payload): Json<NewWeeklyRule>,
) -> AppResult<(StatusCode, Json<WeeklyRule>)> {
    payload.validate()?;
    let start = parse_time(&payload.start_time)?;
    let end = parse_time(&payload.end_time)?;
    check_window(start, end)?;

    let rule =
        ScheduleRepository::create_weekly_rule(&state.db, payload.day_of_week, start, end).await?;
    info!(rule_id = %rule.id, day_of_week = rule.day_of_week, "weekly rule created");
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_weekly_rules(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WeeklyRule>>> {
    let rules = ScheduleRepository::list_weekly_rules(&state.db).await?;
    Ok(Json(rules))
}

pub async fn delete_weekly_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ScheduleRepository::delete_weekly_rule(&state.db, rule_id).await?;
    info!(%rule_id, "weekly rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Date exceptions

pub async fn upsert_exception(
    State(state): State<AppState>,
    Json(payload): Json<NewDateException>,
) -> AppResult<Json<DateException>> {
    let date = parse_date(&payload.date)?;

    // A closed day carries no slots regardless of what was submitted.
    let slots = if payload.is_available {
        let mut slots = Vec::with_capacity(payload.slots.len());
        for slot in &payload.slots {
            let start_time = parse_time(&slot.start_time)?;
            let end_time = parse_time(&slot.end_time)?;
            check_window(start_time, end_time)?;
            slots.push(ExceptionSlot {
                start_time,
                end_time,
            });
        }
        slots
    } else {
        Vec::new()
    };

    let exception =
        ScheduleRepository::upsert_exception(&state.db, date, payload.is_available, slots).await?;
    info!(%date, is_available = exception.is_available, "date exception upserted");
    Ok(Json(exception))
}

pub async fn list_exceptions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DateException>>> {
    let exceptions = ScheduleRepository::list_exceptions(&state.db).await?;
    Ok(Json(exceptions))
}

pub async fn delete_exception(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<StatusCode> {
    let date = parse_date(&date)?;
    ScheduleRepository::delete_exception(&state.db, date).await?;
    info!(%date, "date exception deleted");
    Ok(StatusCode::NO_CONTENT)
}
