use uuid::Uuid;

use crate::{
    api::error,
    modules::project::{
        model::{CreateProjectModel, UpdateProjectModel},
        repository::ProjectRepository,
        schema::ProjectEntity,
    },
};

#[derive(Clone)]
pub struct ProjectRepositoryPg {
    pool: sqlx::PgPool,
}

impl ProjectRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProjectRepository for ProjectRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ProjectEntity>, error::SystemError> {
        let project = sqlx::query_as::<_, ProjectEntity>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    async fn list(&self) -> Result<Vec<ProjectEntity>, error::SystemError> {
        let projects =
            sqlx::query_as::<_, ProjectEntity>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(projects)
    }

    async fn create(&self, model: &CreateProjectModel) -> Result<ProjectEntity, error::SystemError> {
        let project = sqlx::query_as::<_, ProjectEntity>(
            r#"
            INSERT INTO projects (id, name, description, location, status, images)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&model.name)
        .bind(&model.description)
        .bind(&model.location)
        .bind(model.status)
        .bind(&model.images)
        .fetch_one(&self.pool)
        .await?;
        Ok(project)
    }

    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateProjectModel,
    ) -> Result<ProjectEntity, error::SystemError> {
        let project = sqlx::query_as::<_, ProjectEntity>(
            r#"
            UPDATE projects
            SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                location    = COALESCE($4, location),
                status      = COALESCE($5, status),
                images      = COALESCE($6, images),
                updated_at  = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.location)
        .bind(changes.status)
        .bind(&changes.images)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Project not found"))?;
        Ok(project)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
