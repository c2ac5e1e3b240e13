use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{
        model::{InsertUser, UpdateUser},
        schema::{UserEntity, UserRole},
    },
};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError>;
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError>;
    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError>;
    async fn update(&self, id: &Uuid, user: &UpdateUser) -> Result<UserEntity, error::SystemError>;
    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    /// Newest first, soft-deleted users excluded
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserEntity>, error::SystemError>;
    async fn count(&self) -> Result<i64, error::SystemError>;
    async fn exists_with_role(&self, role: UserRole) -> Result<bool, error::SystemError>;
}
