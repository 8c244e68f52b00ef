use crate::data::PlannerSettings;
use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    println!("Fichiers de configuration initialisés.");
    Ok(())
}

/// Writes the config into `dir`: defaults when absent, otherwise the existing
/// values re-written in normalized form. week_info.json is never created
/// here: only the planner backend exports it.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    PlannerSettings::load_from(dir)?.save_to(dir)
}
