use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyIssues {
    pub property_id: Uuid,
    pub title: String,
    /// Referenced by either column but absent on disk
    pub missing: Vec<String>,
    /// In the legacy column only
    pub legacy_only: Vec<String>,
    /// In `photos` only
    pub photo_only: Vec<String>,
    pub duplicates: Vec<String>,
    /// Legacy entries that do not name a file at all
    pub invalid: Vec<String>,
}

impl PropertyIssues {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.legacy_only.is_empty()
            && self.photo_only.is_empty()
            && self.duplicates.is_empty()
            && self.invalid.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    pub checked_properties: usize,
    pub stored_files: usize,
    pub properties: Vec<PropertyIssues>,
    pub orphans: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.properties.is_empty() && self.orphans.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepairOptions {
    /// Copy missing files in from the staging directory before dropping references
    #[serde(default = "default_true")]
    pub restore_from_staging: bool,
    #[serde(default)]
    pub remove_orphans: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RepairOptions {
    fn default() -> Self {
        RepairOptions { restore_from_staging: true, remove_orphans: false }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    pub properties_changed: Vec<Uuid>,
    pub restored_files: Vec<String>,
    pub dropped_references: Vec<String>,
    pub removed_orphans: Vec<String>,
}
