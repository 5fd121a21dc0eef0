use serde::{Deserialize, Serialize};
use sqlx::types::{Json, Uuid};
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

use super::timefmt;

/// One slot window inside a date exception, stored as a JSONB array element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionSlot {
    #[serde(with = "timefmt")]
    pub start_time: Time,
    #[serde(with = "timefmt")]
    pub end_time: Time,
}

/// A one-off override for a single calendar date. When present it fully
/// replaces the weekly rules for that date: `is_available = false` or an
/// empty slot list closes the day outright, there is no partial fallback.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct DateException {
    pub id: Uuid,
    pub date: Date,
    pub is_available: bool,
    pub slots: Json<Vec<ExceptionSlot>>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewDateException {
    pub date: String,
    pub is_available: bool,
    #[serde(default)]
    pub slots: Vec<NewExceptionSlot>,
}

#[derive(Debug, Deserialize)]
pub struct NewExceptionSlot {
    pub start_time: String,
    pub end_time: String,
}
