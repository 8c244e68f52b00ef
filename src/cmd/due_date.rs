use crate::calc::format::format_date_for_input;
use crate::data::WeekContext;
use anyhow::Result;
use chrono::{Local, NaiveDate};

pub fn run(next: bool, reference: Option<NaiveDate>) -> Result<()> {
    let context = WeekContext::load()?;
    let today = reference.unwrap_or_else(|| Local::now().date_naive());
    println!("{}", due_date(&context, next, today));
    Ok(())
}

/// The `YYYY-MM-DD` due date closing the current week, or the next one.
pub(crate) fn due_date(context: &WeekContext, next: bool, today: NaiveDate) -> String {
    let sunday = if next {
        context.next_week_end(today)
    } else {
        context.current_week_end(today)
    };
    format_date_for_input(sunday)
}
