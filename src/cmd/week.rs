use crate::calc::format::{format_date_for_input, format_day_label, format_display_range};
use crate::calc::week::add_days;
use crate::calc::DayState;
use crate::data::WeekContext;
use anyhow::Result;
use chrono::{Local, NaiveDate};

pub fn run(reference: Option<NaiveDate>) -> Result<()> {
    let context = WeekContext::load()?;
    let today = Local::now().date_naive();
    write_week(&context, today, reference, &mut std::io::stdout())
}

/// Prints the week holding `reference` (the exported week when one is
/// loaded), one line per day with its label, state marker and ISO date.
pub(crate) fn write_week<W: std::io::Write>(
    context: &WeekContext,
    today: NaiveDate,
    reference: Option<NaiveDate>,
    out: &mut W,
) -> Result<()> {
    let bounds = context.current_week_bounds(reference.unwrap_or(today));

    writeln!(out, "{}", context.week_title())?;
    writeln!(out, "Du {}", format_display_range(bounds.start, bounds.end))?;
    writeln!(out, "---")?;

    for offset in 0..7 {
        let date = add_days(bounds.start, offset);
        let iso = format_date_for_input(date);
        let label = match context.day_info(&iso) {
            Some(record) if !record.display_date.is_empty() => record.display_date.clone(),
            _ => format_day_label(date),
        };
        let state = DayState::classify(today, date);
        writeln!(out, "{label:<12} {:<12} {iso}", state.marker())?;
    }
    Ok(())
}
