use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::announcement::{
    model::{CreateAnnouncementModel, UpdateAnnouncementModel},
    repository::AnnouncementRepository,
    schema::AnnouncementEntity,
};

fn check_window(
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), error::SystemError> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end < start => {
            Err(error::SystemError::bad_request("ends_at must not be before starts_at"))
        }
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository + Send + Sync>,
}

impl AnnouncementService {
    pub fn with_dependencies(repo: Arc<dyn AnnouncementRepository + Send + Sync>) -> Self {
        AnnouncementService { repo }
    }

    pub async fn list_visible(&self) -> Result<Vec<AnnouncementEntity>, error::SystemError> {
        self.repo.list_visible(Utc::now()).await
    }

    pub async fn list_all(&self) -> Result<Vec<AnnouncementEntity>, error::SystemError> {
        self.repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<AnnouncementEntity, error::SystemError> {
        self.repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Announcement not found"))
    }

    pub async fn create(
        &self,
        model: CreateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError> {
        check_window(model.starts_at, model.ends_at)?;
        let announcement = self.repo.create(&model).await?;
        info!("Announcement {} created", announcement.id);
        Ok(announcement)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError> {
        let current = self.get(id).await?;
        check_window(
            changes.starts_at.unwrap_or(current.starts_at),
            changes.ends_at.unwrap_or(current.ends_at),
        )?;
        self.repo.update(&id, &changes).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Announcement not found"));
        }
        info!("Announcement {} deleted", id);
        Ok(())
    }
}
