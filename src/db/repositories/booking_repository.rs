use sqlx::{PgPool, Postgres, Transaction};
use time::{Date, Time};
use uuid::Uuid;

use crate::db::models::{Booking, BookingStatus};
use crate::db::DatabaseError;

const BOOKING_COLUMNS: &str = "id, date, time, customer_name, customer_email, customer_phone, \
                               status, notes, user_id, created_at, updated_at";

pub struct BookingRepository;

impl BookingRepository {
    /// Insert a booking for `(date, time)`. The partial unique index on
    /// active bookings turns a concurrent double-book into
    /// [`DatabaseError::Duplicate`].
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        date: Date,
        time: Time,
        customer_name: &str,
        customer_email: &str,
        customer_phone: &str,
        notes: Option<&str>,
        user_id: Option<Uuid>,
    ) -> Result<Booking, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (date, time, customer_name, customer_email, customer_phone, notes, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(date)
        .bind(time)
        .bind(customer_name)
        .bind(customer_email.to_lowercase())
        .bind(customer_phone)
        .bind(notes)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(booking)
    }

    pub async fn get_by_id(pool: &PgPool, booking_id: Uuid) -> Result<Option<Booking>, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE id = $1
            "#
        ))
        .bind(booking_id)
        .fetch_optional(pool)
        .await?;

        Ok(booking)
    }

    /// Start times of every active booking on `date`. Cancelled bookings do
    /// not occupy their slot.
    pub async fn active_times_for_date(
        pool: &PgPool,
        date: Date,
    ) -> Result<Vec<Time>, DatabaseError> {
        let times = sqlx::query_scalar::<_, Time>(
            r#"
            SELECT time
            FROM bookings
            WHERE date = $1 AND status <> 'cancelled'
            "#,
        )
        .bind(date)
        .fetch_all(pool)
        .await?;

        Ok(times)
    }

    pub async fn set_status(
        pool: &PgPool,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(booking_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Ok(booking)
    }

    /// Move a booking to a new `(date, time)`. The same unique index guards
    /// the target slot; the row keeps its id and is marked `rescheduled`.
    pub async fn reschedule(
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        date: Date,
        time: Time,
    ) -> Result<Booking, DatabaseError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET date = $1, time = $2, status = 'rescheduled', updated_at = NOW()
            WHERE id = $3
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(date)
        .bind(time)
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Ok(booking)
    }
}
