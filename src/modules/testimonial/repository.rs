use uuid::Uuid;

use crate::{
    api::error,
    modules::testimonial::{
        model::{CreateTestimonialModel, UpdateTestimonialModel},
        schema::TestimonialEntity,
    },
};

#[async_trait::async_trait]
pub trait TestimonialRepository {
    async fn list(&self, published_only: bool)
    -> Result<Vec<TestimonialEntity>, error::SystemError>;
    async fn create(
        &self,
        model: &CreateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError>;
    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;
}
