use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

use super::timefmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Rescheduled,
    Completed,
}

impl BookingStatus {
    /// Active bookings occupy their slot; only cancellation releases it.
    pub fn is_active(self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub date: Date,
    #[serde(with = "timefmt")]
    pub time: Time,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: BookingStatus,
    pub notes: Option<String>,
    /// Anonymous bookings are permitted, so the owner link is optional.
    pub user_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBooking {
    pub date: String,
    pub time: String,
    #[validate(length(min = 1, max = 120, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub customer_email: String,
    #[validate(length(min = 5, max = 32, message = "A phone number is required"))]
    pub customer_phone: String,
    pub notes: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReschedulePayload {
    pub date: String,
    pub time: String,
}
