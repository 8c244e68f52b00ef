use crate::calc::format::parse_iso_date;
use crate::calc::week::{self, WeekBounds};
use crate::data::persistence::Persistable;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Fixed title shown when no week export is available. There is deliberately
/// no locally computed range: only the backend knows the title format.
pub const WEEK_TITLE_FALLBACK: &str = "Semaine en cours";

/// One day's metadata within the exported week, keyed by its ISO date.
/// Older exports may carry only `date`; the other fields then default.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DayRecord {
    pub date: String,
    #[serde(default)]
    pub day_name: String,
    #[serde(default)]
    pub display_date: String,
    #[serde(default)]
    pub is_past: bool,
    #[serde(default)]
    pub is_today: bool,
}

/// Week metadata exported by the planner backend (week_info.json).
/// Authoritative when present: week_start is a Monday, week_end the
/// following Sunday.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ServerWeekInfo {
    #[serde(rename = "week_start")]
    pub week_start_raw: String,
    #[serde(rename = "week_end")]
    pub week_end_raw: String,
    #[serde(default)]
    pub display_range: String,
    #[serde(default)]
    pub days: Vec<DayRecord>,
    #[serde(skip)]
    pub week_start: Option<NaiveDate>,
    #[serde(skip)]
    pub week_end: Option<NaiveDate>,
}

impl Persistable for ServerWeekInfo {
    fn filename() -> &'static str {
        "week_info.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl ServerWeekInfo {
    pub fn parse_dates(&mut self) -> Result<()> {
        self.week_start = Some(
            parse_iso_date(&self.week_start_raw)
                .with_context(|| format!("failed to parse week_start '{}'", self.week_start_raw))?,
        );
        self.week_end = Some(
            parse_iso_date(&self.week_end_raw)
                .with_context(|| format!("failed to parse week_end '{}'", self.week_end_raw))?,
        );
        Ok(())
    }

    /// Both bounds, when both raw dates parsed.
    pub fn bounds(&self) -> Option<WeekBounds> {
        match (self.week_start, self.week_end) {
            (Some(start), Some(end)) => Some(WeekBounds { start, end }),
            _ => None,
        }
    }
}

/// Session-wide week context. Holds the backend's week export when one is
/// available and answers every week query with an explicit fallback path
/// otherwise. Constructed once at startup and passed by reference; replacing
/// the export goes through `initialize`, which returns the previous value.
#[derive(Debug, Default)]
pub struct WeekContext {
    server_info: Option<ServerWeekInfo>,
}

impl WeekContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads week_info.json from the data directory. An absent export leaves
    /// the context on its fallback path; an export with unparseable dates is
    /// kept for its days/display_range but degrades the date queries.
    pub fn load() -> Result<Self> {
        let mut context = WeekContext::new();
        if let Some(mut info) = ServerWeekInfo::load_optional()? {
            if let Err(err) = info.parse_dates() {
                warn!("week export has unparseable bounds: {err:#}");
            }
            context.initialize(info);
        } else {
            debug!("no week export found, using local week computation");
        }
        Ok(context)
    }

    /// Stores `info` and returns the previously held export, making
    /// re-initialization observable to the caller.
    pub fn initialize(&mut self, info: ServerWeekInfo) -> Option<ServerWeekInfo> {
        self.server_info.replace(info)
    }

    /// Monday and Sunday of the current week: the export's bounds when
    /// parsed, otherwise computed from `today`.
    pub fn current_week_bounds(&self, today: NaiveDate) -> WeekBounds {
        self.server_info
            .as_ref()
            .and_then(ServerWeekInfo::bounds)
            .unwrap_or_else(|| week::week_bounds_of(today))
    }

    /// Sunday of the current week. The fallback derives it from the days
    /// remaining until Sunday, independently of the Monday computation.
    pub fn current_week_end(&self, today: NaiveDate) -> NaiveDate {
        match self.server_info.as_ref().and_then(|info| info.week_end) {
            Some(end) => end,
            None => week::week_end_of(today),
        }
    }

    /// Sunday of next week; always one week after `current_week_end`.
    pub fn next_week_end(&self, today: NaiveDate) -> NaiveDate {
        match self.server_info.as_ref().and_then(|info| info.week_end) {
            Some(end) => end + Duration::days(7),
            None => week::next_week_end_of(today),
        }
    }

    /// The export's display range, or the fixed fallback label.
    pub fn week_title(&self) -> String {
        match self.server_info.as_ref() {
            Some(info) if !info.display_range.is_empty() => info.display_range.clone(),
            _ => WEEK_TITLE_FALLBACK.to_string(),
        }
    }

    /// Inclusive membership in the exported week. Always false without
    /// parsed export bounds: week membership is only answered against the
    /// authoritative week, never a locally guessed one.
    pub fn is_date_in_current_week(&self, date: NaiveDate) -> bool {
        match self.server_info.as_ref().and_then(ServerWeekInfo::bounds) {
            Some(bounds) => date >= bounds.start && date <= bounds.end,
            None => false,
        }
    }

    /// String-input variant accepting `YYYY-MM-DD` or ISO date-times; the
    /// time of day is ignored. Unparseable input is simply not in the week.
    pub fn is_date_str_in_current_week(&self, input: &str) -> bool {
        match parse_iso_date(input) {
            Some(date) => self.is_date_in_current_week(date),
            None => false,
        }
    }

    /// Exact-date lookup in the exported day list.
    pub fn day_info(&self, date_str: &str) -> Option<&DayRecord> {
        self.server_info
            .as_ref()?
            .days
            .iter()
            .find(|day| day.date == date_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn day(date: &str) -> DayRecord {
        DayRecord {
            date: date.to_string(),
            ..DayRecord::default()
        }
    }

    fn march_week() -> ServerWeekInfo {
        let mut info = ServerWeekInfo {
            week_start_raw: "2024-03-04".to_string(),
            week_end_raw: "2024-03-10".to_string(),
            display_range: "4 mar au 10 mar".to_string(),
            days: vec![day("2024-03-04"), day("2024-03-05")],
            week_start: None,
            week_end: None,
        };
        info.parse_dates().unwrap();
        info
    }

    fn context_with(info: ServerWeekInfo) -> WeekContext {
        let mut context = WeekContext::new();
        context.initialize(info);
        context
    }

    #[test]
    fn test_parse_dates_populates_bounds() {
        let info = march_week();
        let bounds = info.bounds().unwrap();
        assert_eq!(bounds.start, d(2024, 3, 4));
        assert_eq!(bounds.end, d(2024, 3, 10));
    }

    #[test]
    fn test_parse_dates_accepts_datetime_strings() {
        let mut info = ServerWeekInfo {
            week_start_raw: "2024-03-04T00:00:00".to_string(),
            week_end_raw: "2024-03-10T23:59:59".to_string(),
            ..ServerWeekInfo::default()
        };
        info.parse_dates().unwrap();
        assert_eq!(info.week_start, Some(d(2024, 3, 4)));
        assert_eq!(info.week_end, Some(d(2024, 3, 10)));
    }

    #[test]
    fn test_parse_dates_invalid_returns_error() {
        let mut info = ServerWeekInfo {
            week_start_raw: "not-a-date".to_string(),
            week_end_raw: "2024-03-10".to_string(),
            ..ServerWeekInfo::default()
        };
        assert!(info.parse_dates().is_err());
        assert!(info.bounds().is_none());
    }

    #[test]
    fn test_initialize_returns_previous_export() {
        let mut context = WeekContext::new();
        assert!(context.initialize(march_week()).is_none());
        let previous = context.initialize(march_week());
        assert!(previous.is_some());
        assert_eq!(previous.unwrap().week_start_raw, "2024-03-04");
    }

    #[test]
    fn test_current_week_bounds_prefers_export() {
        let context = context_with(march_week());
        // Any "today" is ignored while the export is authoritative.
        let bounds = context.current_week_bounds(d(2030, 1, 1));
        assert_eq!(bounds.start, d(2024, 3, 4));
        assert_eq!(bounds.end, d(2024, 3, 10));
    }

    #[test]
    fn test_current_week_bounds_fallback_without_export() {
        let context = WeekContext::new();
        let bounds = context.current_week_bounds(d(2024, 3, 6));
        assert_eq!(bounds.start, d(2024, 3, 4));
        assert_eq!(bounds.end, d(2024, 3, 10));
    }

    #[test]
    fn test_current_week_bounds_fallback_with_unparsed_export() {
        let info = ServerWeekInfo {
            week_start_raw: "garbage".to_string(),
            week_end_raw: "garbage".to_string(),
            ..ServerWeekInfo::default()
        };
        let context = context_with(info);
        let bounds = context.current_week_bounds(d(2024, 3, 6));
        assert_eq!(bounds.start, d(2024, 3, 4));
    }

    #[test]
    fn test_week_ends_from_export() {
        let context = context_with(march_week());
        assert_eq!(context.current_week_end(d(2030, 1, 1)), d(2024, 3, 10));
        assert_eq!(context.next_week_end(d(2030, 1, 1)), d(2024, 3, 17));
    }

    #[test]
    fn test_week_ends_fallback() {
        let context = WeekContext::new();
        assert_eq!(context.current_week_end(d(2024, 3, 6)), d(2024, 3, 10));
        assert_eq!(context.next_week_end(d(2024, 3, 6)), d(2024, 3, 17));
        // A Sunday is its own week end.
        assert_eq!(context.current_week_end(d(2024, 3, 10)), d(2024, 3, 10));
        assert_eq!(context.next_week_end(d(2024, 3, 10)), d(2024, 3, 17));
    }

    #[test]
    fn test_next_week_end_is_current_plus_seven_both_paths() {
        let with_export = context_with(march_week());
        let without = WeekContext::new();
        let today = d(2024, 3, 6);
        for context in [&with_export, &without] {
            assert_eq!(
                context.next_week_end(today),
                context.current_week_end(today) + Duration::days(7)
            );
        }
    }

    #[test]
    fn test_week_title_prefers_export() {
        let context = context_with(march_week());
        assert_eq!(context.week_title(), "4 mar au 10 mar");
    }

    #[test]
    fn test_week_title_fallback() {
        assert_eq!(WeekContext::new().week_title(), WEEK_TITLE_FALLBACK);
        // An export without a range also falls back to the fixed label.
        let info = ServerWeekInfo {
            week_start_raw: "2024-03-04".to_string(),
            week_end_raw: "2024-03-10".to_string(),
            ..ServerWeekInfo::default()
        };
        assert_eq!(context_with(info).week_title(), WEEK_TITLE_FALLBACK);
    }

    #[test]
    fn test_is_date_in_current_week_membership() {
        let context = context_with(march_week());
        assert!(context.is_date_in_current_week(d(2024, 3, 4)));
        assert!(context.is_date_in_current_week(d(2024, 3, 10)));
        assert!(!context.is_date_in_current_week(d(2024, 3, 3)));
        assert!(!context.is_date_in_current_week(d(2024, 3, 11)));
    }

    #[test]
    fn test_is_date_str_in_current_week_ignores_time_of_day() {
        let context = context_with(march_week());
        assert!(context.is_date_str_in_current_week("2024-03-04"));
        assert!(context.is_date_str_in_current_week("2024-03-10T23:00:00"));
        assert!(!context.is_date_str_in_current_week("2024-03-11"));
        assert!(!context.is_date_str_in_current_week("not-a-date"));
    }

    #[test]
    fn test_is_date_in_current_week_false_without_export() {
        let context = WeekContext::new();
        assert!(!context.is_date_in_current_week(d(2024, 3, 6)));
        assert!(!context.is_date_str_in_current_week("2024-03-06"));
    }

    #[test]
    fn test_day_info_lookup() {
        let context = context_with(march_week());
        let found = context.day_info("2024-03-05");
        assert!(found.is_some());
        assert_eq!(found.unwrap().date, "2024-03-05");
        assert!(context.day_info("2099-01-01").is_none());
    }

    #[test]
    fn test_day_info_none_without_export() {
        assert!(WeekContext::new().day_info("2024-03-05").is_none());
    }

    #[test]
    fn test_week_info_json_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let info = march_week();
        info.save_to(tmp.path()).unwrap();
        let mut loaded = ServerWeekInfo::load_from(tmp.path()).unwrap();
        loaded.parse_dates().unwrap();
        assert_eq!(loaded.week_start, Some(d(2024, 3, 4)));
        assert_eq!(loaded.display_range, "4 mar au 10 mar");
        assert_eq!(loaded.days.len(), 2);
    }

    #[test]
    fn test_week_info_deserializes_backend_export() {
        let json = r#"{
            "week_start": "2024-03-04",
            "week_end": "2024-03-10",
            "display_range": "4 mar au 10 mar",
            "days": [
                {
                    "date": "2024-03-04",
                    "day_name": "Lundi",
                    "day_short": "lun",
                    "display_date": "lun 04/03",
                    "is_past": true,
                    "is_today": false,
                    "is_future": false
                },
                {"date": "2024-03-05"}
            ],
            "is_current_week": true
        }"#;
        let mut info: ServerWeekInfo = serde_json::from_str(json).unwrap();
        info.parse_dates().unwrap();
        assert_eq!(info.days[0].day_name, "Lundi");
        assert_eq!(info.days[0].display_date, "lun 04/03");
        assert!(info.days[0].is_past);
        // Sparse records fill in defaults; unconsumed export keys are ignored.
        assert!(!info.days[1].is_past);
        assert_eq!(info.days[1].display_date, "");
    }
}
