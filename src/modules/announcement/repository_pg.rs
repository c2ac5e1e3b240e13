use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    modules::announcement::{
        model::{CreateAnnouncementModel, UpdateAnnouncementModel},
        repository::AnnouncementRepository,
        schema::AnnouncementEntity,
    },
};

#[derive(Clone)]
pub struct AnnouncementRepositoryPg {
    pool: sqlx::PgPool,
}

impl AnnouncementRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AnnouncementRepository for AnnouncementRepositoryPg {
    async fn find_by_id(
        &self,
        id: &Uuid,
    ) -> Result<Option<AnnouncementEntity>, error::SystemError> {
        let announcement =
            sqlx::query_as::<_, AnnouncementEntity>("SELECT * FROM announcements WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(announcement)
    }

    async fn list_visible(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnnouncementEntity>, error::SystemError> {
        let announcements = sqlx::query_as::<_, AnnouncementEntity>(
            r#"
            SELECT * FROM announcements
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= $1)
              AND (ends_at IS NULL OR ends_at >= $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(announcements)
    }

    async fn list_all(&self) -> Result<Vec<AnnouncementEntity>, error::SystemError> {
        let announcements = sqlx::query_as::<_, AnnouncementEntity>(
            "SELECT * FROM announcements ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(announcements)
    }

    async fn create(
        &self,
        model: &CreateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError> {
        let announcement = sqlx::query_as::<_, AnnouncementEntity>(
            r#"
            INSERT INTO announcements (id, title, content, is_active, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&model.title)
        .bind(&model.content)
        .bind(model.is_active)
        .bind(model.starts_at)
        .bind(model.ends_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(announcement)
    }

    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdateAnnouncementModel,
    ) -> Result<AnnouncementEntity, error::SystemError> {
        let announcement = sqlx::query_as::<_, AnnouncementEntity>(
            r#"
            UPDATE announcements
            SET
                title      = COALESCE($2, title),
                content    = COALESCE($3, content),
                is_active  = COALESCE($4, is_active),
                starts_at  = CASE WHEN $5::boolean THEN $6 ELSE starts_at END,
                ends_at    = CASE WHEN $7::boolean THEN $8 ELSE ends_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.is_active)
        .bind(changes.starts_at.is_some())
        .bind(changes.starts_at.flatten())
        .bind(changes.ends_at.is_some())
        .bind(changes.ends_at.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Announcement not found"))?;
        Ok(announcement)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }
}
