//! Wall-clock access
//!
//! All "today" logic goes through a [`Clock`] so that day boundaries follow
//! one time zone consistently and tests can pin the current instant.

use crate::tracker::types::CalendarDate;
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

const MILLIS_PER_DAY: i64 = 24 * 3600 * 1000;

/// Source of the current instant and its local calendar day
pub trait Clock: Send + Sync {
    /// Current instant, epoch milliseconds
    fn now_millis(&self) -> i64;

    /// Local calendar day containing `millis`
    fn date_of(&self, millis: i64) -> Option<CalendarDate>;

    /// Local wall-clock "HH:MM" of `millis`
    fn time_of_day(&self, millis: i64) -> Option<String>;

    /// Local calendar day of the current instant
    fn today(&self) -> CalendarDate {
        let now = self.now_millis();
        self.date_of(now)
            .unwrap_or_else(|| CalendarDate::from_naive(Utc::now().date_naive()))
    }
}

/// Machine clock in the machine's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    fn local(millis: i64) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(millis).single()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn date_of(&self, millis: i64) -> Option<CalendarDate> {
        Self::local(millis).map(|dt| CalendarDate::from_naive(dt.date_naive()))
    }

    fn time_of_day(&self, millis: i64) -> Option<String> {
        Self::local(millis).map(|dt| dt.format("%H:%M").to_string())
    }
}

/// Settable clock with a fixed UTC offset
#[derive(Debug)]
pub struct FixedClock {
    now: AtomicI64,
    offset: FixedOffset,
}

impl FixedClock {
    /// Clock frozen at `millis` in UTC
    pub fn at(millis: i64) -> Self {
        Self::with_offset(millis, Utc.fix())
    }

    /// Clock frozen at `millis` with days split on `offset`
    pub fn with_offset(millis: i64, offset: FixedOffset) -> Self {
        Self {
            now: AtomicI64::new(millis),
            offset,
        }
    }

    /// Clock frozen at local `hour:00` on `date`
    pub fn on(date: CalendarDate, hour: u32) -> Self {
        let clock = Self::at(0);
        clock.set_local(date, hour);
        clock
    }

    /// Epoch millis of local `hour:00` on `date`
    pub fn local_millis(&self, date: CalendarDate, hour: u32) -> i64 {
        let naive = date
            .naive()
            .and_hms_opt(hour.min(23), 0, 0)
            .unwrap_or_default();
        naive.and_utc().timestamp_millis() - self.offset.local_minus_utc() as i64 * 1000
    }

    /// Move the clock to local `hour:00` on `date`
    pub fn set_local(&self, date: CalendarDate, hour: u32) {
        self.now
            .store(self.local_millis(date, hour), Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_millis(days * MILLIS_PER_DAY);
    }

    fn local(&self, millis: i64) -> Option<DateTime<FixedOffset>> {
        self.offset.timestamp_millis_opt(millis).single()
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn date_of(&self, millis: i64) -> Option<CalendarDate> {
        self.local(millis)
            .map(|dt| CalendarDate::from_naive(dt.date_naive()))
    }

    fn time_of_day(&self, millis: i64) -> Option<String> {
        self.local(millis).map(|dt| dt.format("%H:%M").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_day_boundaries() {
        let day = CalendarDate::from_ymd(2024, 6, 15).unwrap();
        let clock = FixedClock::on(day, 10);

        assert_eq!(clock.today(), day);
        assert_eq!(clock.date_of(clock.local_millis(day, 0)), Some(day));
        assert_eq!(
            clock.date_of(clock.local_millis(day, 0) - 1),
            day.previous()
        );
        assert_eq!(clock.time_of_day(clock.now_millis()).as_deref(), Some("10:00"));
    }

    #[test]
    fn test_fixed_clock_offset_shifts_days() {
        // 2024-06-15 23:30 UTC is already the 16th at UTC+2
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let utc_late = CalendarDate::from_ymd(2024, 6, 15)
            .unwrap()
            .naive()
            .and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let clock = FixedClock::with_offset(utc_late, offset);

        assert_eq!(clock.today(), CalendarDate::from_ymd(2024, 6, 16).unwrap());
    }

    #[test]
    fn test_fixed_clock_advance() {
        let day = CalendarDate::from_ymd(2024, 12, 31).unwrap();
        let clock = FixedClock::on(day, 12);
        clock.advance_days(1);
        assert_eq!(clock.today(), CalendarDate::from_ymd(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_system_clock_today_is_some_day() {
        let clock = SystemClock;
        let now = clock.now_millis();
        assert!(clock.date_of(now).is_some());
        assert_eq!(clock.time_of_day(now).map(|t| t.len()), Some(5));
    }
}
