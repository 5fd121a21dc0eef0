use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{OffsetDateTime, Time};
use validator::Validate;

use super::timefmt;

/// A recurring weekly availability window. Several rules may exist for the
/// same day (e.g. a morning and an afternoon block); overlapping rules are
/// kept as-is and never merged.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WeeklyRule {
    pub id: Uuid,
    /// 0-6, Sunday-indexed.
    pub day_of_week: i16,
    #[serde(with = "timefmt")]
    pub start_time: Time,
    #[serde(with = "timefmt")]
    pub end_time: Time,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewWeeklyRule {
    #[validate(range(min = 0, max = 6, message = "day_of_week must be 0-6, Sunday-indexed"))]
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
}
