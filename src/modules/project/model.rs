use serde::Deserialize;
use validator::Validate;

use crate::modules::project::schema::ProjectStatus;

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProjectModel {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters long"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: String,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProjectModel {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub status: Option<ProjectStatus>,
    pub images: Option<Vec<String>>,
}
