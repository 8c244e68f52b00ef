use crate::calc::format::format_due_date_short;
use crate::data::WeekContext;
use anyhow::Result;

pub fn run(date: &str) -> Result<()> {
    let context = WeekContext::load()?;
    write_day(&context, date, &mut std::io::stdout())
}

/// Prints the exported record for a day, or a not-found line. The date is
/// echoed through the short formatter, which leaves unparseable input as-is.
pub(crate) fn write_day<W: std::io::Write>(
    context: &WeekContext,
    date: &str,
    out: &mut W,
) -> Result<()> {
    match context.day_info(date) {
        Some(record) => {
            let label = if record.display_date.is_empty() {
                format_due_date_short(date)
            } else {
                record.display_date.clone()
            };
            writeln!(out, "{label}")?;
            if !record.day_name.is_empty() {
                writeln!(out, "Jour     : {}", record.day_name)?;
            }
            writeln!(out, "Date     : {}", record.date)?;
            writeln!(out, "Statut   : {}", day_status(record))?;
        }
        None => writeln!(out, "Aucune information pour {date}")?,
    }
    Ok(())
}

fn day_status(record: &crate::data::DayRecord) -> &'static str {
    crate::calc::DayState::from_flags(record.is_past, record.is_today).marker()
}
