use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sqlx(rename = "OWNER")]
    Owner,
    #[sqlx(rename = "ADMIN")]
    Admin,
    #[sqlx(rename = "USER")]
    User,
}

impl UserRole {
    /// Owners manage everyone, admins manage everyone but owners.
    pub fn can_manage(&self, target: &UserRole) -> bool {
        match self {
            UserRole::Owner => true,
            UserRole::Admin => *target != UserRole::Owner,
            UserRole::User => false,
        }
    }

    /// Only an owner hands out the owner or admin role.
    pub fn can_assign(&self, role: &UserRole) -> bool {
        match self {
            UserRole::Owner => true,
            UserRole::Admin => *role == UserRole::User,
            UserRole::User => false,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Owner | UserRole::Admin)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hash_password: String,
    pub role: UserRole,
    pub is_active: bool,
    pub display_name: String,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
