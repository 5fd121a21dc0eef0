//! Slot availability for the booking calendar.
//!
//! A day's bookable slots come from the weekly recurring schedule unless a
//! date exception overrides it, and existing active bookings mark individual
//! slots as taken. The resolver is a pure read over stored state: no caching,
//! no retries, and on storage failure it fails closed rather than guessing
//! that a slot is open.

mod resolver;
mod store;

pub use resolver::AvailabilityResolver;
pub use store::{PgScheduleStore, ScheduleStore};

use serde::Serialize;
use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::db::models::timefmt;
use crate::db::DatabaseError;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Availability data unavailable: {0}")]
    DataUnavailable(#[from] DatabaseError),
}

/// A slot annotated with whether it can currently be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSlot {
    #[serde(with = "timefmt")]
    pub time: Time,
    #[serde(with = "timefmt")]
    pub end_time: Time,
    pub available: bool,
}

/// Parse a `YYYY-MM-DD` date, rejecting it before any query is issued.
pub fn parse_date(raw: &str) -> Result<Date, AvailabilityError> {
    Date::parse(raw, ISO_DATE)
        .map_err(|_| AvailabilityError::InvalidInput(format!("not a valid date: {raw:?}")))
}

/// Parse a zero-padded `HH:MM` clock time.
pub fn parse_time(raw: &str) -> Result<Time, AvailabilityError> {
    Time::parse(raw, timefmt::HH_MM)
        .map_err(|_| AvailabilityError::InvalidInput(format!("not a valid time: {raw:?}")))
}

/// 0-6, Sunday-indexed, matching how weekly rules are keyed.
pub(crate) fn day_of_week(date: Date) -> i16 {
    i16::from(date.weekday().number_days_from_sunday())
}

/// Mark each base window against the booked start times and sort ascending.
/// Windows are taken as-is: overlapping or duplicate entries from the weekly
/// schedule each produce their own slot.
pub(crate) fn mark_booked(base: Vec<(Time, Time)>, booked: &[Time]) -> Vec<ResolvedSlot> {
    let mut slots: Vec<ResolvedSlot> = base
        .into_iter()
        .map(|(start, end)| ResolvedSlot {
            time: start,
            end_time: end,
            available: !booked.contains(&start),
        })
        .collect();
    slots.sort_by_key(|slot| slot.time);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn marks_booked_start_times_only() {
        let base = vec![(time!(9:00), time!(10:00)), (time!(10:00), time!(11:00))];
        let slots = mark_booked(base, &[time!(9:00)]);

        assert_eq!(slots.len(), 2);
        assert!(!slots[0].available);
        assert!(slots[1].available);
    }

    #[test]
    fn sorts_ascending_by_start_time() {
        let base = vec![(time!(14:00), time!(15:00)), (time!(9:00), time!(10:00))];
        let slots = mark_booked(base, &[]);

        assert_eq!(slots[0].time, time!(9:00));
        assert_eq!(slots[1].time, time!(14:00));
    }

    #[test]
    fn overlapping_windows_are_not_merged() {
        let base = vec![(time!(9:00), time!(10:00)), (time!(9:00), time!(10:30))];
        let slots = mark_booked(base, &[]);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].time, slots[1].time);
    }

    #[test]
    fn serializes_as_wire_triple() {
        let slot = ResolvedSlot {
            time: time!(9:00),
            end_time: time!(10:00),
            available: true,
        };
        let value = serde_json::to_value(&slot).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"time": "09:00", "endTime": "10:00", "available": true})
        );
    }

    #[test]
    fn parses_iso_dates_and_clock_times() {
        assert_eq!(parse_date("2024-06-03").unwrap(), date!(2024 - 06 - 03));
        assert_eq!(parse_time("09:30").unwrap(), time!(9:30));
        assert!(matches!(
            parse_date("03/06/2024"),
            Err(AvailabilityError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_time("9am"),
            Err(AvailabilityError::InvalidInput(_))
        ));
    }

    #[test]
    fn sunday_indexed_day_of_week() {
        assert_eq!(day_of_week(date!(2024 - 06 - 02)), 0); // Sunday
        assert_eq!(day_of_week(date!(2024 - 06 - 03)), 1); // Monday
        assert_eq!(day_of_week(date!(2024 - 06 - 08)), 6); // Saturday
    }
}
