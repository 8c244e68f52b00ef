use crate::data::persistence::Persistable;
use anyhow::Result;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Planner-wide settings, mirroring the backend's settings form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Duration of one timetable slot, in minutes.
    pub time_unit_minutes: u32,
    /// Start of the day grid, "HH:MM".
    pub day_start_time: String,
    /// Number of slots in a day.
    pub time_units_per_day: u32,
    /// Work-in-progress cap across the week.
    pub wip_limit: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            time_unit_minutes: 30,
            day_start_time: "09:00".to_string(),
            time_units_per_day: 20,
            wip_limit: 100,
        }
    }
}

/// Wrapper that reads the `settings` key from config.yaml, so other tools
/// can keep their own keys in the same file.
#[derive(Serialize, Deserialize, Default, Debug)]
struct SettingsWrapper {
    #[serde(default)]
    settings: PlannerSettings,
}

impl Persistable for SettingsWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl PlannerSettings {
    pub fn load() -> Result<Self> {
        Ok(SettingsWrapper::load()?.settings)
    }

    pub fn save(&self) -> Result<()> {
        SettingsWrapper {
            settings: self.clone(),
        }
        .save()
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        Ok(SettingsWrapper::load_from(dir)?.settings)
    }

    pub fn save_to(&self, dir: &Path) -> Result<()> {
        SettingsWrapper {
            settings: self.clone(),
        }
        .save_to(dir)
    }

    /// Start of the day grid as a time of day, when well-formed.
    pub fn day_start(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.day_start_time, "%H:%M").ok()
    }

    /// Checks the settings form constraints; returns every violated rule,
    /// with the backend's French messages.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(5..=60).contains(&self.time_unit_minutes) {
            errors.push("L'unité de temps doit être entre 5 et 60 minutes".to_string());
        } else if self.time_unit_minutes % 5 != 0 {
            errors.push("L'unité de temps doit être un multiple de 5".to_string());
        }

        match self.day_start() {
            Some(time) if time.minute() % 5 == 0 => {}
            Some(_) => errors.push("Les minutes doivent être par palier de 5".to_string()),
            None => errors.push("L'heure de début doit être au format HH:MM".to_string()),
        }

        if self.time_units_per_day == 0 {
            errors.push("Le nombre d'unités par jour doit être supérieur à 0".to_string());
        }

        let max_wip_limit = self.time_units_per_day * 7;
        if self.wip_limit == 0 {
            errors.push("La WIP limit doit être supérieure à 0".to_string());
        } else if self.wip_limit > max_wip_limit {
            errors.push(format!(
                "La WIP limit ne peut pas dépasser {max_wip_limit} (time_units_per_day × 7)"
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_values() {
        let settings = PlannerSettings::default();
        assert_eq!(settings.time_unit_minutes, 30);
        assert_eq!(settings.day_start_time, "09:00");
        assert_eq!(settings.time_units_per_day, 20);
        assert_eq!(settings.wip_limit, 100);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(PlannerSettings::default().validate().is_empty());
    }

    #[test]
    fn test_time_unit_out_of_range() {
        let mut settings = PlannerSettings::default();
        settings.time_unit_minutes = 4;
        assert_eq!(
            settings.validate(),
            vec!["L'unité de temps doit être entre 5 et 60 minutes".to_string()]
        );
        settings.time_unit_minutes = 65;
        assert_eq!(settings.validate().len(), 1);
    }

    #[test]
    fn test_time_unit_must_be_multiple_of_five() {
        let mut settings = PlannerSettings::default();
        settings.time_unit_minutes = 27;
        assert_eq!(
            settings.validate(),
            vec!["L'unité de temps doit être un multiple de 5".to_string()]
        );
    }

    #[test]
    fn test_day_start_format_checked() {
        let mut settings = PlannerSettings::default();
        settings.day_start_time = "nine".to_string();
        assert_eq!(
            settings.validate(),
            vec!["L'heure de début doit être au format HH:MM".to_string()]
        );
    }

    #[test]
    fn test_day_start_minutes_step_of_five() {
        let mut settings = PlannerSettings::default();
        settings.day_start_time = "09:07".to_string();
        assert_eq!(
            settings.validate(),
            vec!["Les minutes doivent être par palier de 5".to_string()]
        );
    }

    #[test]
    fn test_units_per_day_positive() {
        let mut settings = PlannerSettings::default();
        settings.time_units_per_day = 0;
        let errors = settings.validate();
        assert!(errors.contains(&"Le nombre d'unités par jour doit être supérieur à 0".to_string()));
        // With zero units the WIP cap of units × 7 = 0 is also exceeded.
        assert!(errors.iter().any(|e| e.starts_with("La WIP limit")));
    }

    #[test]
    fn test_wip_limit_positive_and_capped() {
        let mut settings = PlannerSettings::default();
        settings.wip_limit = 0;
        assert_eq!(
            settings.validate(),
            vec!["La WIP limit doit être supérieure à 0".to_string()]
        );
        settings.wip_limit = 141; // 20 × 7 = 140
        assert_eq!(
            settings.validate(),
            vec!["La WIP limit ne peut pas dépasser 140 (time_units_per_day × 7)".to_string()]
        );
        settings.wip_limit = 140;
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_multiple_errors_reported_together() {
        let settings = PlannerSettings {
            time_unit_minutes: 3,
            day_start_time: "bad".to_string(),
            time_units_per_day: 20,
            wip_limit: 100,
        };
        assert_eq!(settings.validate().len(), 2);
    }

    #[test]
    fn test_day_start_parses_time() {
        let settings = PlannerSettings::default();
        let time = settings.day_start().unwrap();
        assert_eq!(time.hour(), 9);
        assert_eq!(time.minute(), 0);
    }

    #[test]
    fn test_yaml_roundtrip_through_wrapper() {
        let tmp = TempDir::new().unwrap();
        let settings = PlannerSettings {
            time_unit_minutes: 15,
            day_start_time: "08:30".to_string(),
            time_units_per_day: 32,
            wip_limit: 200,
        };
        settings.save_to(tmp.path()).unwrap();
        let loaded = PlannerSettings::load_from(tmp.path()).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_settings_key_uses_defaults() {
        // config.yaml belonging to another tool, without a settings key
        let yaml = "other_tool: {}";
        let wrapper: SettingsWrapper = serde_norway::from_str(yaml).unwrap();
        assert_eq!(wrapper.settings, PlannerSettings::default());
    }
}
