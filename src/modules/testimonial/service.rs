use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::error;
use crate::modules::testimonial::{
    model::{CreateTestimonialModel, UpdateTestimonialModel},
    repository::TestimonialRepository,
    schema::TestimonialEntity,
};

#[derive(Clone)]
pub struct TestimonialService {
    repo: Arc<dyn TestimonialRepository + Send + Sync>,
}

impl TestimonialService {
    pub fn with_dependencies(repo: Arc<dyn TestimonialRepository + Send + Sync>) -> Self {
        TestimonialService { repo }
    }

    pub async fn list_published(&self) -> Result<Vec<TestimonialEntity>, error::SystemError> {
        self.repo.list(true).await
    }

    pub async fn list_all(&self) -> Result<Vec<TestimonialEntity>, error::SystemError> {
        self.repo.list(false).await
    }

    pub async fn create(
        &self,
        model: CreateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError> {
        let testimonial = self.repo.create(&model).await?;
        info!("Testimonial {} created", testimonial.id);
        Ok(testimonial)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError> {
        self.repo.update(&id, &changes).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Testimonial not found"));
        }
        Ok(())
    }
}
