use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

/// French 3-letter weekday abbreviations, indexed 0 = Sunday .. 6 = Saturday.
const WEEKDAYS_FR: [&str; 7] = ["dim", "lun", "mar", "mer", "jeu", "ven", "sam"];

/// French month abbreviations, indexed 0 = January.
const MONTHS_FR: [&str; 12] = [
    "jan", "fév", "mar", "avr", "mai", "juin", "juil", "aoû", "sep", "oct", "nov", "déc",
];

/// Zero-padded `YYYY-MM-DD`, the format expected by date form fields.
pub fn format_date_for_input(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Zero-padded `DD/MM/YYYY`.
pub fn format_date_fr(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `"jjj JJ/MM"`, e.g. `"lun 04/03"`, the backend's full short day label.
pub fn format_day_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_FR[date.weekday().num_days_from_sunday() as usize];
    format!("{weekday} {:02}/{:02}", date.day(), date.month())
}

/// Formats a due date string as `"jjj JJ/MM"`. Unparseable input comes back
/// unchanged rather than failing; the failure is logged.
pub fn format_due_date_short(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    match parse_iso_date(input) {
        Some(date) => format_day_label(date),
        None => {
            warn!(input, "failed to parse due date, returning it unformatted");
            input.to_string()
        }
    }
}

/// `"J mmm"` without zero padding, e.g. `"1 mar"`, the backend's short format.
pub fn format_date_short(date: NaiveDate) -> String {
    format!("{} {}", date.day(), MONTHS_FR[date.month0() as usize])
}

/// `"J mmm au J mmm"`, the display range the backend serializes for a week.
pub fn format_display_range(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} au {}", format_date_short(start), format_date_short(end))
}

/// Accepts plain `YYYY-MM-DD` dates as well as ISO date-times, keeping only
/// the calendar date.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    None
}
