use uuid::Uuid;

use crate::{
    api::error,
    modules::testimonial::{
        model::{CreateTestimonialModel, UpdateTestimonialModel},
        repository::TestimonialRepository,
        schema::TestimonialEntity,
    },
};

#[derive(Clone)]
pub struct TestimonialRepositoryPg {
    pool: sqlx::PgPool,
}

impl TestimonialRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TestimonialRepository for TestimonialRepositoryPg {
    async fn list(
        &self,
        published_only: bool,
    ) -> Result<Vec<TestimonialEntity>, error::SystemError> {
        let testimonials = sqlx::query_as::<_, TestimonialEntity>(
            r#"
            SELECT * FROM testimonials
            WHERE is_published OR NOT $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(published_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(testimonials)
    }

    async fn create(
        &self,
        model: &CreateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError> {
        let testimonial = sqlx::query_as::<_, TestimonialEntity>(
            r#"
            INSERT INTO testimonials (id, author_name, content, rating, is_published)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&model.author_name)
        .bind(&model.content)
        .bind(model.rating)
        .bind(model.is_published)
        .fetch_one(&self.pool)
        .await?;
        Ok(testimonial)
    }

    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateTestimonialModel,
    ) -> Result<TestimonialEntity, error::SystemError> {
        let testimonial = sqlx::query_as::<_, TestimonialEntity>(
            r#"
            UPDATE testimonials
            SET
                author_name  = COALESCE($2, author_name),
                content      = COALESCE($3, content),
                rating       = COALESCE($4, rating),
                is_published = COALESCE($5, is_published)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.author_name)
        .bind(&changes.content)
        .bind(changes.rating)
        .bind(changes.is_published)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Testimonial not found"))?;
        Ok(testimonial)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
