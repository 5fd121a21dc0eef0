use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, Time};

use crate::db::models::{DateException, WeeklyRule};
use crate::db::repositories::{BookingRepository, ScheduleRepository};
use crate::db::DatabaseError;

/// The three queryable sets the resolver needs from storage: weekly rules by
/// day-of-week, the exception for a date, and the start times of active
/// bookings on a date.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn weekly_rules_for(&self, day_of_week: i16) -> Result<Vec<WeeklyRule>, DatabaseError>;

    async fn exception_for(&self, date: Date) -> Result<Option<DateException>, DatabaseError>;

    async fn active_booking_times(&self, date: Date) -> Result<Vec<Time>, DatabaseError>;
}

/// Postgres-backed store delegating to the repositories.
#[derive(Clone)]
pub struct PgScheduleStore {
    pool: PgPool,
}

impl PgScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn weekly_rules_for(&self, day_of_week: i16) -> Result<Vec<WeeklyRule>, DatabaseError> {
        ScheduleRepository::weekly_rules_for_day(&self.pool, day_of_week).await
    }

    async fn exception_for(&self, date: Date) -> Result<Option<DateException>, DatabaseError> {
        ScheduleRepository::exception_for_date(&self.pool, date).await
    }

    async fn active_booking_times(&self, date: Date) -> Result<Vec<Time>, DatabaseError> {
        BookingRepository::active_times_for_date(&self.pool, date).await
    }
}
