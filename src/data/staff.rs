use serde::{Deserialize, Serialize};

/// One entry of the `staff` list in config.yaml.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_active() -> bool {
    true
}

impl StaffMember {
    pub fn new(id: &str) -> Self {
        StaffMember {
            id: id.to_string(),
            display_name: String::new(),
            active: true,
            sort_order: 0,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = name.to_string();
        self
    }

    pub fn with_sort_order(mut self, order: i32) -> Self {
        self.sort_order = order;
        self
    }

    #[cfg(test)]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Display name, or the id when none is set.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}

/// Active members ordered by `sort_order`, then id.
///
/// With an empty directory, every id in `known` becomes a member, so a store
/// that was never given a staff list still shows everyone who has records.
pub fn active_staff(directory: &[StaffMember], known: &[String]) -> Vec<StaffMember> {
    if directory.is_empty() {
        return known.iter().map(|id| StaffMember::new(id)).collect();
    }
    let mut staff: Vec<StaffMember> = directory.iter().filter(|m| m.active).cloned().collect();
    staff.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
    staff.dedup_by(|a, b| a.id == b.id);
    staff
}
