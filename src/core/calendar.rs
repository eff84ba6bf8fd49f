//! Calendar arithmetic for expiry dates and reminder windows.

use chrono::{Datelike, Days, NaiveDate};

/// Add `months` calendar months to `start`, clamping the day to the last day
/// of the target month (Jan 31 + 1 month is Feb 28 or 29).
///
/// Dates beyond chrono's range saturate to `NaiveDate::MAX` / `NaiveDate::MIN`.
pub fn add_months(start: NaiveDate, months: i32) -> NaiveDate {
    if months == 0 {
        return start;
    }
    let index = i64::from(start.month0()) + i64::from(months);
    let year = i64::from(start.year()) + index.div_euclid(12);
    let month = (index.rem_euclid(12) + 1) as u32;

    let saturated = if months > 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    };
    let Ok(year) = i32::try_from(year) else {
        return saturated;
    };
    let day = start.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(saturated)
}

/// Whole days from `today` until `expires_on`; negative once expired.
pub fn days_until(expires_on: NaiveDate, today: NaiveDate) -> i64 {
    (expires_on - today).num_days()
}

/// Last day (inclusive) of a reminder window opening on `today`.
pub fn window_end(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-based) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}
