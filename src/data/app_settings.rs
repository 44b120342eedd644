use crate::data::persistence::Persistable;
use crate::data::staff::StaffMember;
use crate::data::work_record::DEFAULT_EMPLOYEE_ID;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    /// Staff id used when `--employee` is not given.
    pub default_employee: String,
    /// Length of a standard working day, for overtime and early leave.
    pub standard_work_minutes: i64,
    /// Step used by the month view's break +/- keys.
    pub break_step_minutes: i64,
    /// How far back month listings may reach.
    pub retention_days: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            default_employee: DEFAULT_EMPLOYEE_ID.to_string(),
            standard_work_minutes: 8 * 60,
            break_step_minutes: 10,
            retention_days: 365,
        }
    }
}

/// Wrapper that reads the `settings` and `staff` keys from config.yaml.
#[derive(Serialize, Deserialize, Default, Debug)]
struct SettingsWrapper {
    #[serde(default)]
    settings: AppSettings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    staff: Vec<StaffMember>,
}

impl Persistable for SettingsWrapper {
    fn filename() -> &'static str {
        "config.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl AppSettings {
    pub fn load() -> Result<Self> {
        Ok(SettingsWrapper::load()?.settings)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        Ok(SettingsWrapper::load_from(dir)?.settings)
    }

    /// Writes config.yaml with these settings and the given staff directory.
    pub fn save_to(&self, dir: &Path, staff: &[StaffMember]) -> Result<()> {
        SettingsWrapper {
            settings: self.clone(),
            staff: staff.to_vec(),
        }
        .save_to(dir)
    }
}

/// The staff directory from config.yaml; empty when the key is absent.
pub fn load_staff() -> Result<Vec<StaffMember>> {
    Ok(SettingsWrapper::load()?.staff)
}

#[cfg(test)]
fn load_staff_from(dir: &Path) -> Result<Vec<StaffMember>> {
    Ok(SettingsWrapper::load_from(dir)?.staff)
}
