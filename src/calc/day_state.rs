use chrono::NaiveDate;

/// Relationship of a displayed day to today. Exactly one state applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayState {
    Past,
    Current,
    Future,
}

impl DayState {
    /// Derives the state from calendar dates.
    pub fn classify(today: NaiveDate, date: NaiveDate) -> DayState {
        if date < today {
            DayState::Past
        } else if date == today {
            DayState::Current
        } else {
            DayState::Future
        }
    }

    /// Recovers a state from the is_past/is_today flags carried by exported
    /// day records. Neither flag set means Future.
    pub fn from_flags(is_past: bool, is_today: bool) -> DayState {
        if is_past {
            DayState::Past
        } else if is_today {
            DayState::Current
        } else {
            DayState::Future
        }
    }

    /// Stable marker name, matching the day classes the planner backend emits.
    pub fn marker(self) -> &'static str {
        match self {
            DayState::Past => "past-day",
            DayState::Current => "current-day",
            DayState::Future => "future-day",
        }
    }

    /// Past days are read-only in the timetable.
    pub fn is_read_only(self) -> bool {
        matches!(self, DayState::Past)
    }
}
