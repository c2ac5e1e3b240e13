use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{error, success::{page_window, Paginated}};
use crate::configs::RedisCache;
use crate::ENV;

use crate::modules::user::model::{
    CreateUserModel, InsertUser, SignInModel, SignUpModel, UpdateUser, UpdateUserModel,
    UserResponse,
};
use crate::modules::user::{
    repository::UserRepository,
    schema::{UserEntity, UserRole},
};
use crate::utils::{hash_password, verify_password, Claims, TypeClaims};

const PROFILE_TTL_SECONDS: u64 = 3600;

fn profile_key(id: &Uuid) -> String {
    format!("user:{id}")
}

fn refresh_key(jti: &Uuid) -> String {
    format!("refresh_token:{jti}")
}

fn refresh_jti(claims: &Claims) -> Result<Uuid, error::SystemError> {
    match (&claims._type, claims.jti) {
        (Some(TypeClaims::RefreshToken), Some(jti)) => Ok(jti),
        _ => Err(error::SystemError::unauthorized("Refresh token invalid or expired")),
    }
}

/// A refresh `jti` is consumed on first use; a second presentation finds nothing stored.
fn check_refresh_owner(stored: Option<Uuid>, claims: &Claims) -> Result<(), error::SystemError> {
    if stored != Some(claims.sub) {
        warn!("Refresh token {:?} reused or revoked", claims.jti);
        return Err(error::SystemError::unauthorized("Refresh token invalid or expired"));
    }
    Ok(())
}

fn check_update(
    actor_id: Uuid,
    actor_role: UserRole,
    target: &UserEntity,
    changes: &UpdateUserModel,
) -> Result<(), error::SystemError> {
    let is_self = actor_id == target.id;
    if !is_self && !actor_role.can_manage(&target.role) {
        return Err(error::SystemError::forbidden("Not allowed to modify this user"));
    }
    if let Some(role) = &changes.role {
        if *role != target.role && (is_self || !actor_role.can_assign(role)) {
            return Err(error::SystemError::forbidden("Not allowed to assign this role"));
        }
    }
    if is_self && changes.is_active == Some(false) {
        return Err(error::SystemError::bad_request("Cannot deactivate yourself"));
    }
    Ok(())
}

fn check_delete(
    actor_id: Uuid,
    actor_role: UserRole,
    target: &UserEntity,
) -> Result<(), error::SystemError> {
    if actor_id == target.id {
        return Err(error::SystemError::bad_request("Cannot delete yourself"));
    }
    if !actor_role.can_manage(&target.role) {
        return Err(error::SystemError::forbidden("Not allowed to delete this user"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository + Send + Sync>,
    cache: Arc<RedisCache>,
}

impl UserService {
    pub fn with_dependencies(
        repo: Arc<dyn UserRepository + Send + Sync>,
        cache: Arc<RedisCache>,
    ) -> Self {
        info!("UserService initialized with dependencies");
        UserService { repo, cache }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<UserResponse, error::SystemError> {
        let key = profile_key(&id);
        if let Some(cached_user) = self.cache.get::<UserResponse>(&key).await? {
            info!("User {} found in cache", id);
            return Ok(cached_user);
        }
        let user_entity = self.repo.find_by_id(&id).await?;
        if let Some(entity) = user_entity {
            self.cache.set(&key, &UserResponse::from(entity.clone()), PROFILE_TTL_SECONDS).await?;
            info!("User {} cached", id);
            Ok(UserResponse::from(entity))
        } else {
            Err(error::SystemError::not_found("User not found"))
        }
    }

    pub async fn list_users(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Paginated<UserResponse>, error::SystemError> {
        let (page, limit, offset) = page_window(page, limit, 20);
        let (users, total) = tokio::try_join!(self.repo.list(limit, offset), self.repo.count())?;
        let items = users.into_iter().map(UserResponse::from).collect();
        Ok(Paginated::new(items, total, page, limit))
    }

    pub async fn create_user(
        &self,
        actor_role: UserRole,
        user: CreateUserModel,
    ) -> Result<Uuid, error::SystemError> {
        if !actor_role.can_assign(&user.role) {
            return Err(error::SystemError::forbidden("Not allowed to create a user with this role"));
        }

        let new_user = InsertUser {
            username: user.username,
            email: user.email,
            hash_password: hash_password(&user.password)?,
            role: user.role,
            is_active: user.is_active,
            display_name: user.display_name,
        };

        let id = self.repo.create(&new_user).await?;
        info!("User {} created with role {:?}", id, new_user.role);
        Ok(id)
    }

    pub async fn update_user(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        id: Uuid,
        user: UpdateUserModel,
    ) -> Result<UserResponse, error::SystemError> {
        if user.email.is_none()
            && user.display_name.is_none()
            && user.password.is_none()
            && user.role.is_none()
            && user.is_active.is_none()
        {
            return Err(error::SystemError::bad_request("No fields to update"));
        }

        let target = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;

        check_update(actor_id, actor_role, &target, &user)?;

        let hash_password = match &user.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let update_user = UpdateUser {
            email: user.email,
            display_name: user.display_name,
            hash_password,
            role: user.role,
            is_active: user.is_active,
        };

        let entity = self.repo.update(&id, &update_user).await?;

        self.cache.delete(&profile_key(&id)).await?;
        Ok(UserResponse::from(entity))
    }

    pub async fn delete_user(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        id: Uuid,
    ) -> Result<(), error::SystemError> {
        let target = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("User not found"))?;
        check_delete(actor_id, actor_role, &target)?;

        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("User not found"));
        }

        self.cache.delete(&profile_key(&id)).await?;
        info!("User {} deleted", id);
        Ok(())
    }

    pub async fn sign_up(&self, user: SignUpModel) -> Result<uuid::Uuid, error::SystemError> {
        let hash_password = hash_password(&user.password)?;

        let new_user = InsertUser {
            username: user.username,
            email: user.email,
            hash_password,
            role: UserRole::User,
            is_active: true,
            display_name: user.display_name,
        };

        let user_id = self.repo.create(&new_user).await?;
        Ok(user_id)
    }

    pub async fn sign_in(&self, user: SignInModel) -> Result<(String, String), error::SystemError> {
        let user_entity = self
            .repo
            .find_by_username(&user.username)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("Invalid username or password"))?;

        let valid = verify_password(&user_entity.hash_password, &user.password)?;
        if !valid {
            return Err(error::SystemError::unauthorized("Invalid username or password"));
        }

        if !user_entity.is_active {
            return Err(error::SystemError::forbidden("Account is disabled"));
        }

        self.issue_tokens(&user_entity).await
    }

    pub async fn refresh(
        &self,
        refresh_token: Option<String>,
    ) -> Result<(String, String), error::SystemError> {
        let token =
            refresh_token.ok_or_else(|| error::SystemError::unauthorized("Missing refresh token"))?;

        let claims = Claims::decode(&token, ENV.jwt_secret.as_ref())
            .map_err(|_| error::SystemError::unauthorized("Refresh token invalid or expired"))?;

        let jti = refresh_jti(&claims)?;
        let stored = self.cache.take::<Uuid>(&refresh_key(&jti)).await?;
        check_refresh_owner(stored, &claims)?;

        let user_entity = self
            .repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| error::SystemError::unauthorized("User no longer exists"))?;
        if !user_entity.is_active {
            return Err(error::SystemError::forbidden("Account is disabled"));
        }

        self.issue_tokens(&user_entity).await
    }

    pub async fn sign_out(&self, refresh_token: Option<String>) -> Result<(), error::SystemError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        if let Ok(Claims { jti: Some(jti), .. }) = Claims::decode(&token, ENV.jwt_secret.as_ref()) {
            self.cache.delete(&refresh_key(&jti)).await?;
        }
        Ok(())
    }

    /// Deactivated or deleted accounts lose access even while their access token is valid.
    pub async fn is_active(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        Ok(self.repo.find_by_id(id).await?.is_some_and(|user| user.is_active))
    }

    /// Creates the owner account from the environment when none exists yet.
    pub async fn ensure_owner(&self) -> Result<(), error::SystemError> {
        let (Some(username), Some(password)) = (&ENV.owner_username, &ENV.owner_password) else {
            return Ok(());
        };

        if self.repo.exists_with_role(UserRole::Owner).await? {
            return Ok(());
        }

        let owner = InsertUser {
            username: username.clone(),
            email: ENV.owner_email.clone().unwrap_or_else(|| format!("{username}@localhost")),
            hash_password: hash_password(password)?,
            role: UserRole::Owner,
            is_active: true,
            display_name: username.clone(),
        };
        let id = self.repo.create(&owner).await?;
        info!("Owner account {} bootstrapped", id);
        Ok(())
    }

    async fn issue_tokens(
        &self,
        user_entity: &UserEntity,
    ) -> Result<(String, String), error::SystemError> {
        let access_token =
            Claims::new(&user_entity.id, &user_entity.role, ENV.access_token_expiration)
                .with_type(TypeClaims::AccessToken)
                .encode(ENV.jwt_secret.as_ref())?;

        let jti = Uuid::now_v7();

        let refresh_token =
            Claims::new(&user_entity.id, &user_entity.role, ENV.refresh_token_expiration)
                .with_jti(jti)
                .with_type(TypeClaims::RefreshToken)
                .encode(ENV.jwt_secret.as_ref())?;

        self.cache.set(&refresh_key(&jti), &user_entity.id, ENV.refresh_token_expiration).await?;

        Ok((access_token, refresh_token))
    }
}
