//! Billable minutes under the office calendar, plus the wall-clock renderings
//! stored when a work is completed.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::calendar::{self, WORK_END_HOUR, WORK_START_HOUR};

pub const FULL_DAY_MINUTES: i64 = 8 * 60;

/// Minutes of `[start, end)` that fall inside business hours.
///
/// A single day is clamped to 09:00-18:00 with 12:00-13:00 removed. Longer
/// intervals add the tail of the first day, 480 minutes per weekday in
/// between and the head of the last day.
pub fn billable_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    if end <= start {
        return 0;
    }
    let (first, last) = (start.date(), end.date());
    if first == last {
        return single_day_minutes(start, end);
    }

    let mut minutes = single_day_minutes(start, calendar::at_hour(first, WORK_END_HOUR))
        + single_day_minutes(calendar::at_hour(last, WORK_START_HOUR), end);

    let mut day = first.succ_opt();
    while let Some(current) = day.filter(|current| *current < last) {
        if !calendar::is_weekend(current) {
            minutes += FULL_DAY_MINUTES;
        }
        day = current.succ_opt();
    }
    minutes
}

fn single_day_minutes(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let seconds: i64 = calendar::business_windows(start.date())
        .into_iter()
        .map(|(from, to)| {
            let (lo, hi) = (start.max(from), end.min(to));
            if hi > lo {
                (hi - lo).num_seconds()
            } else {
                0
            }
        })
        .sum();
    seconds / 60
}

/// Wall-clock length of a finished work: rendering and truncated minutes.
pub fn wall_clock(start: DateTime<Utc>, end: DateTime<Utc>) -> (String, i64) {
    let elapsed = end - start;
    (render(elapsed.num_seconds()), elapsed.num_minutes())
}

/// `4h15m0s`, `15m3s`, `42s`.
fn render(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total = total_seconds.abs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

/// Stats rendering: `2s 5dk` above an hour, `45dk` below.
pub fn format_minutes(minutes: i64) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}s {mins}dk")
    } else {
        format!("{mins}dk")
    }
}
