use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    UnderConstruction,
    Completed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub status: ProjectStatus,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::UnderConstruction).unwrap(),
            "\"under_construction\""
        );
        let status: ProjectStatus = serde_json::from_str("\"planning\"").unwrap();
        assert_eq!(status, ProjectStatus::Planning);
    }
}
