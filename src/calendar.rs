//! Office calendar: local-time conversions, day bounds and business hours.
//!
//! All calendar decisions use the server's local zone. Instants are kept in
//! UTC everywhere else and converted at this boundary.

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};

pub const WORK_START_HOUR: u32 = 9;
pub const WORK_END_HOUR: u32 = 18;
pub const LUNCH_START_HOUR: u32 = 12;
pub const LUNCH_END_HOUR: u32 = 13;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn to_local(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(&Local).naive_local()
}

/// Resolves a local wall time to an instant. Ambiguous times pick the
/// earlier instant; times inside a DST gap move one hour forward.
pub fn from_local(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub fn today(clock: &dyn Clock) -> NaiveDate {
    to_local(clock.now()).date()
}

/// Strict `YYYY-MM-DD`. Signed or five-digit years are refused so the day
/// arithmetic below stays inside chrono's range.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 || !raw.as_bytes()[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn at_hour(date: NaiveDate, hour: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    at_hour(date, 0)
}

/// Last representable instant of `date`, for inclusive range filters.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Paid stretches of a day, lunch excluded. Weekends have none.
pub fn business_windows(date: NaiveDate) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    if is_weekend(date) {
        return Vec::new();
    }
    vec![
        (at_hour(date, WORK_START_HOUR), at_hour(date, LUNCH_START_HOUR)),
        (at_hour(date, LUNCH_END_HOUR), at_hour(date, WORK_END_HOUR)),
    ]
}
