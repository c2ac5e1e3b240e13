use uuid::Uuid;

use crate::{
    api::error,
    modules::project::{
        model::{CreateProjectModel, UpdateProjectModel},
        schema::ProjectEntity,
    },
};

#[async_trait::async_trait]
pub trait ProjectRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProjectEntity>, error::SystemError>;
    async fn list(&self) -> Result<Vec<ProjectEntity>, error::SystemError>;
    async fn create(&self, model: &CreateProjectModel) -> Result<ProjectEntity, error::SystemError>;
    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateProjectModel,
    ) -> Result<ProjectEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
