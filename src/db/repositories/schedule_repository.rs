use sqlx::types::Json;
use sqlx::PgPool;
use time::{Date, Time};
use uuid::Uuid;

use crate::db::models::{DateException, ExceptionSlot, WeeklyRule};
use crate::db::DatabaseError;

const WEEKLY_RULE_COLUMNS: &str = "id, day_of_week, start_time, end_time, created_at";
const EXCEPTION_COLUMNS: &str = "id, date, is_available, slots, created_at";

pub struct ScheduleRepository;

impl ScheduleRepository {
    // Weekly rule functions
    pub async fn create_weekly_rule(
        pool: &PgPool,
        day_of_week: i16,
        start_time: Time,
        end_time: Time,
    ) -> Result<WeeklyRule, DatabaseError> {
        let rule = sqlx::query_as::<_, WeeklyRule>(&format!(
            r#"
            INSERT INTO weekly_rules (day_of_week, start_time, end_time)
            VALUES ($1, $2, $3)
            RETURNING {WEEKLY_RULE_COLUMNS}
            "#
        ))
        .bind(day_of_week)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(pool)
        .await?;

        Ok(rule)
    }

    pub async fn list_weekly_rules(pool: &PgPool) -> Result<Vec<WeeklyRule>, DatabaseError> {
        let rules = sqlx::query_as::<_, WeeklyRule>(&format!(
            r#"
            SELECT {WEEKLY_RULE_COLUMNS}
            FROM weekly_rules
            ORDER BY day_of_week, start_time
            "#
        ))
        .fetch_all(pool)
        .await?;

        Ok(rules)
    }

    pub async fn weekly_rules_for_day(
        pool: &PgPool,
        day_of_week: i16,
    ) -> Result<Vec<WeeklyRule>, DatabaseError> {
        let rules = sqlx::query_as::<_, WeeklyRule>(&format!(
            r#"
            SELECT {WEEKLY_RULE_COLUMNS}
            FROM weekly_rules
            WHERE day_of_week = $1
            ORDER BY start_time
            "#
        ))
        .bind(day_of_week)
        .fetch_all(pool)
        .await?;

        Ok(rules)
    }

    pub async fn delete_weekly_rule(pool: &PgPool, rule_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM weekly_rules WHERE id = $1")
            .bind(rule_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    // Date exception functions
    pub async fn upsert_exception(
        pool: &PgPool,
        date: Date,
        is_available: bool,
        slots: Vec<ExceptionSlot>,
    ) -> Result<DateException, DatabaseError> {
        let exception = sqlx::query_as::<_, DateException>(&format!(
            r#"
            INSERT INTO date_exceptions (date, is_available, slots)
            VALUES ($1, $2, $3)
            ON CONFLICT (date)
            DO UPDATE SET is_available = EXCLUDED.is_available, slots = EXCLUDED.slots
            RETURNING {EXCEPTION_COLUMNS}
            "#
        ))
        .bind(date)
        .bind(is_available)
        .bind(Json(slots))
        .fetch_one(pool)
        .await?;

        Ok(exception)
    }

    pub async fn list_exceptions(pool: &PgPool) -> Result<Vec<DateException>, DatabaseError> {
        let exceptions = sqlx::query_as::<_, DateException>(&format!(
            r#"
            SELECT {EXCEPTION_COLUMNS}
            FROM date_exceptions
            ORDER BY date
            "#
        ))
        .fetch_all(pool)
        .await?;

        Ok(exceptions)
    }

    pub async fn exception_for_date(
        pool: &PgPool,
        date: Date,
    ) -> Result<Option<DateException>, DatabaseError> {
        let exception = sqlx::query_as::<_, DateException>(&format!(
            r#"
            SELECT {EXCEPTION_COLUMNS}
            FROM date_exceptions
            WHERE date = $1
            "#
        ))
        .bind(date)
        .fetch_optional(pool)
        .await?;

        Ok(exception)
    }

    pub async fn delete_exception(pool: &PgPool, date: Date) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM date_exceptions WHERE date = $1")
            .bind(date)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }
}
