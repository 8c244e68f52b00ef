pub mod day_state;
pub mod format;
pub mod week;

pub use day_state::DayState;
pub use week::WeekBounds;
