//! Local calendar days
//!
//! A day runs from local midnight to the next local midnight, half-open.
//! Everything is stored in UTC, so the mapping goes through a time zone.

use chrono::{DateTime, Days, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// The instants `[start, end)` making up one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// Maps between instants and calendar days in one time zone
#[derive(Clone)]
pub struct Calendar<Tz: TimeZone> {
    tz: Tz,
}

impl Calendar<Local> {
    /// The host's local time zone
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for Calendar<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// First instant of `date`.
    ///
    /// A DST jump can skip local midnight; the day then starts at the first
    /// local time that exists.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let mut time = NaiveTime::MIN;
        for _ in 0..=8 {
            match self.tz.from_local_datetime(&date.and_time(time)) {
                LocalResult::Single(t) => return t.with_timezone(&Utc),
                LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
                LocalResult::None => time += Duration::minutes(15),
            }
        }
        Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
    }

    pub fn day_range(&self, date: NaiveDate) -> DayRange {
        let start = self.start_of_day(date);
        let end = match date.checked_add_days(Days::new(1)) {
            Some(next) => self.start_of_day(next),
            None => start,
        };
        DayRange { start, end }
    }

    /// Calendar day an instant falls on
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};

    /// UTC-3, moving to UTC-2 at local midnight on 2018-11-04, so clocks jump
    /// from 00:00 straight to 01:00 that day.
    #[derive(Debug, Clone, Copy)]
    struct MidnightGap;

    impl MidnightGap {
        fn switch_local() -> NaiveDateTime {
            day(2018, 11, 4).and_time(NaiveTime::MIN)
        }

        fn offset(summer: bool) -> FixedOffset {
            FixedOffset::west_opt(if summer { 2 * 3600 } else { 3 * 3600 }).unwrap()
        }
    }

    impl TimeZone for MidnightGap {
        type Offset = FixedOffset;

        fn from_offset(_: &FixedOffset) -> Self {
            MidnightGap
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            LocalResult::Single(Self::offset(*local >= day(2018, 11, 4)))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let switch = Self::switch_local();
            if *local < switch {
                LocalResult::Single(Self::offset(false))
            } else if *local < switch + Duration::hours(1) {
                LocalResult::None
            } else {
                LocalResult::Single(Self::offset(true))
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            Self::offset(*utc >= day(2018, 11, 4))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            Self::offset(*utc >= Self::switch_local() + Duration::hours(3))
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_utc_day_range() {
        let calendar = Calendar::new(Utc);
        let range = calendar.day_range(day(2025, 1, 9));
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap());
        assert!(range.contains(&range.start));
        assert!(!range.contains(&range.end));
    }

    #[test]
    fn test_offset_day_range_starts_at_local_midnight() {
        let calendar = Calendar::new(FixedOffset::east_opt(2 * 3600).unwrap());
        let range = calendar.day_range(day(2025, 1, 9));
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 1, 8, 22, 0, 0).unwrap());
        assert_eq!(range.end - range.start, Duration::hours(24));
    }

    #[test]
    fn test_date_of_uses_local_day() {
        let calendar = Calendar::new(FixedOffset::west_opt(5 * 3600).unwrap());
        let late_utc = Utc.with_ymd_and_hms(2025, 1, 10, 3, 0, 0).unwrap();
        assert_eq!(calendar.date_of(&late_utc), day(2025, 1, 9));
    }

    #[test]
    fn test_day_starts_after_skipped_midnight() {
        let calendar = Calendar::new(MidnightGap);
        let range = calendar.day_range(day(2018, 11, 4));
        assert_eq!(range.start, Utc.with_ymd_and_hms(2018, 11, 4, 3, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2018, 11, 5, 2, 0, 0).unwrap());
        assert_eq!(range.end - range.start, Duration::hours(23));

        let before = calendar.day_range(day(2018, 11, 3));
        assert_eq!(before.end, range.start);
        assert_eq!(calendar.date_of(&range.start), day(2018, 11, 4));
    }
}
