use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestimonialEntity {
    pub id: Uuid,
    pub author_name: String,
    pub content: String,
    /// 1..=5
    pub rating: i16,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
