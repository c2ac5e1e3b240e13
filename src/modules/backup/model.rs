use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use uuid::Uuid;

use crate::modules::{
    announcement::schema::AnnouncementEntity,
    project::schema::ProjectEntity,
    property::schema::{Photo, PropertyEntity},
    testimonial::schema::TestimonialEntity,
    user::schema::{UserEntity, UserRole},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupKind {
    Database,
    PropertyImages,
    ImageTree,
}

impl BackupKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            BackupKind::Database => "database",
            BackupKind::PropertyImages => "property-images",
            BackupKind::ImageTree => "image-tree",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub kind: BackupKind,
    pub property_id: Option<Uuid>,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// A user row without credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for RedactedUser {
    fn from(user: UserEntity) -> Self {
        RedactedUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            display_name: user.display_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseTables {
    pub properties: Vec<PropertyEntity>,
    pub announcements: Vec<AnnouncementEntity>,
    pub projects: Vec<ProjectEntity>,
    pub testimonials: Vec<TestimonialEntity>,
    pub users: Vec<RedactedUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub tables: DatabaseTables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyImageSnapshot {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub reason: String,
    pub property_id: Uuid,
    pub title: String,
    pub images: Vec<String>,
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreSummary {
    pub properties: u64,
    pub announcements: u64,
    pub projects: u64,
    pub testimonials: u64,
    pub users: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileRestoreSummary {
    pub copied: Vec<String>,
    pub skipped_existing: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PruneSummary {
    pub removed: Vec<String>,
}

impl PropertyImageSnapshot {
    pub fn capture(
        property_id: Uuid,
        title: &str,
        images: &[String],
        photos: &[Photo],
        reason: &str,
    ) -> Self {
        PropertyImageSnapshot {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            reason: reason.to_string(),
            property_id,
            title: title.to_string(),
            images: images.to_vec(),
            photos: photos.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RestoreRequest {
    #[validate(length(min = 1, max = 200, message = "Backup name is required"))]
    pub name: String,
}
