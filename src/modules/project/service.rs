use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::project::{
    model::{CreateProjectModel, UpdateProjectModel},
    repository::ProjectRepository,
    schema::ProjectEntity,
};

#[derive(Clone)]
pub struct ProjectService {
    repo: Arc<dyn ProjectRepository + Send + Sync>,
}

impl ProjectService {
    pub fn with_dependencies(repo: Arc<dyn ProjectRepository + Send + Sync>) -> Self {
        ProjectService { repo }
    }

    pub async fn list(&self) -> Result<Vec<ProjectEntity>, error::SystemError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<ProjectEntity, error::SystemError> {
        self.repo.find_by_id(&id).await?.ok_or_else(|| error::SystemError::not_found("Project not found"))
    }

    pub async fn create(&self, model: CreateProjectModel) -> Result<ProjectEntity, error::SystemError> {
        let project = self.repo.create(&model).await?;
        info!("Project {} created", project.id);
        Ok(project)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateProjectModel,
    ) -> Result<ProjectEntity, error::SystemError> {
        self.repo.update(&id, &changes).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Project not found"));
        }
        info!("Project {} deleted", id);
        Ok(())
    }
}
