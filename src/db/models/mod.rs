mod booking;
mod date_exception;
pub mod timefmt;
mod weekly_rule;

pub use booking::{Booking, BookingStatus, NewBooking, ReschedulePayload};
pub use date_exception::{DateException, ExceptionSlot, NewDateException, NewExceptionSlot};
pub use weekly_rule::{NewWeeklyRule, WeeklyRule};
