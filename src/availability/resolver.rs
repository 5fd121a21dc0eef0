use std::collections::BTreeMap;

use time::{Date, Time};
use tracing::warn;

use super::{day_of_week, mark_booked, AvailabilityError, ResolvedSlot, ScheduleStore};

/// Computes bookable slots from the weekly schedule, date exceptions, and
/// existing bookings. Stateless; every call re-reads stored state, so calls
/// are idempotent and safe to repeat or run concurrently.
pub struct AvailabilityResolver<S> {
    store: S,
}

impl<S: ScheduleStore> AvailabilityResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The ordered slot list for one date.
    ///
    /// A date exception, when present, fully replaces the weekly rules:
    /// `is_available = false` or an empty slot list closes the day, with no
    /// partial fallback to the recurring schedule. Without an exception,
    /// every weekly rule matching the day-of-week contributes one slot.
    /// Slots whose start time is held by an active booking come back with
    /// `available = false`.
    pub async fn resolve_day(&self, date: Date) -> Result<Vec<ResolvedSlot>, AvailabilityError> {
        let base: Vec<(Time, Time)> = match self.store.exception_for(date).await? {
            Some(exception) => {
                if !exception.is_available || exception.slots.is_empty() {
                    return Ok(Vec::new());
                }
                exception
                    .slots
                    .iter()
                    .map(|slot| (slot.start_time, slot.end_time))
                    .collect()
            }
            None => self
                .store
                .weekly_rules_for(day_of_week(date))
                .await?
                .into_iter()
                .map(|rule| (rule.start_time, rule.end_time))
                .collect(),
        };

        if base.is_empty() {
            return Ok(Vec::new());
        }

        let booked = self.store.active_booking_times(date).await?;
        Ok(mark_booked(base, &booked))
    }

    /// Resolve each day from `start` through `end` inclusive, computing at
    /// most `max_days` days from `start`; days beyond the cap are silently
    /// omitted. Days without a single available slot are left out of the
    /// map, so the keys read as "days worth offering".
    pub async fn resolve_range(
        &self,
        start: Date,
        end: Date,
        max_days: u32,
    ) -> Result<BTreeMap<Date, Vec<ResolvedSlot>>, AvailabilityError> {
        let mut days = BTreeMap::new();
        let mut date = start;
        let mut computed = 0u32;

        while date <= end && computed < max_days {
            let slots = self.resolve_day(date).await?;
            if slots.iter().any(|slot| slot.available) {
                days.insert(date, slots);
            }
            computed += 1;
            match date.next_day() {
                Some(next) => date = next,
                None => break,
            }
        }

        Ok(days)
    }

    /// Whether `time` is an offered, unbooked slot start on `date`.
    ///
    /// A time the schedule never offered answers `false`, the same as a
    /// booked one: creation must not succeed for a slot the resolver did not
    /// produce. Storage errors also answer `false` (fail closed) so a caller
    /// retries instead of double-booking. This check races with concurrent
    /// inserts; the bookings unique index is the authoritative guard.
    pub async fn is_slot_free(&self, date: Date, time: Time) -> bool {
        match self.resolve_day(date).await {
            Ok(slots) => slots
                .iter()
                .any(|slot| slot.time == time && slot.available),
            Err(err) => {
                warn!(%date, error = %err, "availability check failed, treating slot as taken");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sqlx::types::Json;
    use std::collections::HashMap;
    use time::macros::{date, time};
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::db::models::{BookingStatus, DateException, ExceptionSlot, WeeklyRule};
    use crate::db::DatabaseError;

    #[derive(Default)]
    struct MemStore {
        rules: Vec<WeeklyRule>,
        exceptions: HashMap<Date, DateException>,
        bookings: Vec<(Date, Time, BookingStatus)>,
        unreachable: bool,
    }

    impl MemStore {
        fn with_rule(mut self, day_of_week: i16, start: Time, end: Time) -> Self {
            self.rules.push(WeeklyRule {
                id: Uuid::now_v7(),
                day_of_week,
                start_time: start,
                end_time: end,
                created_at: OffsetDateTime::UNIX_EPOCH,
            });
            self
        }

        fn with_exception(mut self, date: Date, is_available: bool, slots: Vec<(Time, Time)>) -> Self {
            self.exceptions.insert(
                date,
                DateException {
                    id: Uuid::now_v7(),
                    date,
                    is_available,
                    slots: Json(
                        slots
                            .into_iter()
                            .map(|(start_time, end_time)| ExceptionSlot {
                                start_time,
                                end_time,
                            })
                            .collect(),
                    ),
                    created_at: OffsetDateTime::UNIX_EPOCH,
                },
            );
            self
        }

        fn with_booking(mut self, date: Date, time: Time, status: BookingStatus) -> Self {
            self.bookings.push((date, time, status));
            self
        }
    }

    #[async_trait]
    impl ScheduleStore for MemStore {
        async fn weekly_rules_for(
            &self,
            day_of_week: i16,
        ) -> Result<Vec<WeeklyRule>, DatabaseError> {
            if self.unreachable {
                return Err(DatabaseError::ConnectionError("store down".into()));
            }
            Ok(self
                .rules
                .iter()
                .filter(|rule| rule.day_of_week == day_of_week)
                .cloned()
                .collect())
        }

        async fn exception_for(&self, date: Date) -> Result<Option<DateException>, DatabaseError> {
            if self.unreachable {
                return Err(DatabaseError::ConnectionError("store down".into()));
            }
            Ok(self.exceptions.get(&date).cloned())
        }

        async fn active_booking_times(&self, date: Date) -> Result<Vec<Time>, DatabaseError> {
            if self.unreachable {
                return Err(DatabaseError::ConnectionError("store down".into()));
            }
            Ok(self
                .bookings
                .iter()
                .filter(|(d, _, status)| *d == date && status.is_active())
                .map(|(_, t, _)| *t)
                .collect())
        }
    }

    // 2024-06-03 is a Monday.
    const MONDAY: Date = date!(2024 - 06 - 03);

    fn resolver(store: MemStore) -> AvailabilityResolver<MemStore> {
        AvailabilityResolver::new(store)
    }

    #[tokio::test]
    async fn weekly_rule_yields_open_slot() {
        let r = resolver(MemStore::default().with_rule(1, time!(9:00), time!(10:00)));

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert_eq!(
            slots,
            vec![ResolvedSlot {
                time: time!(9:00),
                end_time: time!(10:00),
                available: true,
            }]
        );
    }

    #[tokio::test]
    async fn confirmed_booking_marks_slot_taken() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_booking(MONDAY, time!(9:00), BookingStatus::Confirmed),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert!(!slots[0].available);
        assert!(!r.is_slot_free(MONDAY, time!(9:00)).await);
    }

    #[tokio::test]
    async fn one_booking_takes_exactly_one_of_many_slots() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_rule(1, time!(10:00), time!(11:00))
                .with_rule(1, time!(14:00), time!(15:00))
                .with_booking(MONDAY, time!(10:00), BookingStatus::Confirmed),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.iter().filter(|slot| !slot.available).count(), 1);
        assert!(!slots[1].available);
    }

    #[tokio::test]
    async fn cancelled_booking_does_not_block() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_booking(MONDAY, time!(9:00), BookingStatus::Cancelled),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert!(slots[0].available);
        assert!(r.is_slot_free(MONDAY, time!(9:00)).await);
    }

    #[tokio::test]
    async fn rescheduled_and_completed_bookings_still_block() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_rule(1, time!(10:00), time!(11:00))
                .with_booking(MONDAY, time!(9:00), BookingStatus::Rescheduled)
                .with_booking(MONDAY, time!(10:00), BookingStatus::Completed),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert!(slots.iter().all(|slot| !slot.available));
    }

    #[tokio::test]
    async fn closed_exception_wins_over_weekly_rules() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_exception(MONDAY, false, vec![]),
        );

        assert!(r.resolve_day(MONDAY).await.unwrap().is_empty());
        assert!(!r.is_slot_free(MONDAY, time!(9:00)).await);
    }

    #[tokio::test]
    async fn open_exception_with_no_slots_is_closed() {
        // No partial fallback to the weekly schedule.
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_exception(MONDAY, true, vec![]),
        );

        assert!(r.resolve_day(MONDAY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exception_slots_replace_weekly_rules() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_exception(MONDAY, true, vec![(time!(13:00), time!(14:00))]),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].time, time!(13:00));
    }

    #[tokio::test]
    async fn unknown_time_is_not_free() {
        let r = resolver(MemStore::default().with_rule(1, time!(9:00), time!(10:00)));

        assert!(r.is_slot_free(MONDAY, time!(9:00)).await);
        assert!(!r.is_slot_free(MONDAY, time!(11:00)).await);
    }

    #[tokio::test]
    async fn is_slot_free_matches_resolve_day() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_rule(1, time!(10:00), time!(11:00))
                .with_booking(MONDAY, time!(9:00), BookingStatus::Confirmed),
        );

        let slots = r.resolve_day(MONDAY).await.unwrap();
        for slot in &slots {
            assert_eq!(r.is_slot_free(MONDAY, slot.time).await, slot.available);
        }
    }

    #[tokio::test]
    async fn range_caps_computed_days() {
        // Rules on every day of the week, so every computed day qualifies.
        let mut store = MemStore::default();
        for dow in 0..7 {
            store = store.with_rule(dow, time!(9:00), time!(10:00));
        }
        let r = resolver(store);

        let days = r
            .resolve_range(date!(2024 - 06 - 01), date!(2024 - 06 - 30), 5)
            .await
            .unwrap();
        assert_eq!(days.len(), 5);
        assert!(days.contains_key(&date!(2024 - 06 - 01)));
        assert!(!days.contains_key(&date!(2024 - 06 - 06)));
    }

    #[tokio::test]
    async fn range_omits_days_without_available_slots() {
        // Monday open, Tuesday fully booked, rest of the week unscheduled.
        let tuesday = date!(2024 - 06 - 04);
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_rule(2, time!(9:00), time!(10:00))
                .with_booking(tuesday, time!(9:00), BookingStatus::Confirmed),
        );

        let days = r
            .resolve_range(MONDAY, date!(2024 - 06 - 09), 30)
            .await
            .unwrap();
        assert_eq!(days.keys().collect::<Vec<_>>(), vec![&MONDAY]);
    }

    #[tokio::test]
    async fn empty_range_when_start_after_end() {
        let r = resolver(MemStore::default().with_rule(1, time!(9:00), time!(10:00)));

        let days = r
            .resolve_range(date!(2024 - 06 - 10), MONDAY, 30)
            .await
            .unwrap();
        assert!(days.is_empty());
    }

    #[tokio::test]
    async fn resolve_day_is_idempotent() {
        let r = resolver(
            MemStore::default()
                .with_rule(1, time!(9:00), time!(10:00))
                .with_rule(1, time!(10:00), time!(11:00))
                .with_booking(MONDAY, time!(10:00), BookingStatus::Confirmed),
        );

        let first = r.resolve_day(MONDAY).await.unwrap();
        let second = r.resolve_day(MONDAY).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fails_closed_when_store_is_unreachable() {
        let mut store = MemStore::default().with_rule(1, time!(9:00), time!(10:00));
        store.unreachable = true;
        let r = resolver(store);

        assert!(matches!(
            r.resolve_day(MONDAY).await,
            Err(AvailabilityError::DataUnavailable(_))
        ));
        assert!(!r.is_slot_free(MONDAY, time!(9:00)).await);
    }
}
