use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::announcement::{
        model::{CreateAnnouncementModel, UpdateAnnouncementModel},
        schema::AnnouncementEntity,
    },
};

#[async_trait::async_trait]
pub trait AnnouncementRepository {
    async fn find_by_id(&self, id: &Uuid)
    -> Result<Option<AnnouncementEntity>, error::SystemError>;
    async fn list_visible(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementEntity>, error::SystemError>;
    async fn list_all(&self) -> Result<Vec<AnnouncementEntity>, error::SystemError>;
    async fn create(
        &self,
        model: &CreateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError>;
    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
