pub mod notification;
pub mod persistence;
pub mod settings;
pub mod week_info;

pub use notification::{Notification, SaveResponse, Severity};
pub use persistence::Persistable;
pub use settings::PlannerSettings;
pub use week_info::{DayRecord, ServerWeekInfo, WeekContext};
