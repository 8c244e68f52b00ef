use chrono::{Datelike, Duration, NaiveDate};

/// The Monday–Sunday span identified as one planner week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Returns the Monday of the week containing `date`.
/// A Sunday goes back six days, any other day back to the preceding Monday.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Monday and Sunday of the week containing `date`.
pub fn week_bounds_of(date: NaiveDate) -> WeekBounds {
    let start = monday_of(date);
    WeekBounds {
        start,
        end: start + Duration::days(6),
    }
}

/// Sunday of the week containing `date`, derived from the days remaining
/// until Sunday (0 when `date` already is one). Must agree with
/// `week_bounds_of(date).end` for every date.
pub fn week_end_of(date: NaiveDate) -> NaiveDate {
    let from_sunday = date.weekday().num_days_from_sunday() as i64;
    let days_until_sunday = if from_sunday == 0 { 0 } else { 7 - from_sunday };
    date + Duration::days(days_until_sunday)
}

/// Sunday of the week after the one containing `date`.
/// Always `week_end_of(date) + 7` days.
pub fn next_week_end_of(date: NaiveDate) -> NaiveDate {
    let from_sunday = date.weekday().num_days_from_sunday() as i64;
    let days = if from_sunday == 0 { 7 } else { 14 - from_sunday };
    date + Duration::days(days)
}

/// Returns `date` offset by `days` (which may be negative).
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}
