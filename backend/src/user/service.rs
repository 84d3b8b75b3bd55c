//! Account management for administrators

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{hash_password, DEFAULT_COST};
use crate::error::ApiError;
use crate::models::{User, UserResponse, UserRole};
use crate::store::UserStore;
use crate::user::model::{NewUser, UpdateUserRequest, UserQuery};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Could not find user with matching id {}", id))
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            bcrypt_cost: DEFAULT_COST,
        }
    }

    /// Override the bcrypt cost used for new password hashes
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    async fn hash(&self, password: &str) -> Result<String, ApiError> {
        hash_password(password, self.bcrypt_cost)
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// Create an active account. Taken usernames are a `Conflict`.
    pub async fn create(&self, new_user: NewUser) -> Result<UserResponse, ApiError> {
        let password_hash = self.hash(&new_user.password).await?;

        let user = self
            .store
            .insert_user(User {
                id: Uuid::new_v4(),
                username: new_user.username,
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                password_hash,
                refresh_token_hash: None,
                role: new_user.role,
                is_active: true,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");

        Ok(user.into())
    }

    pub async fn find_all(&self, query: UserQuery) -> Result<Vec<UserResponse>, ApiError> {
        let users = self.store.list_users(&query.into_filter()).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<UserResponse, ApiError> {
        Ok(self.load(id).await?.into())
    }

    async fn load(&self, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Apply a partial update on behalf of `acting_user`
    ///
    /// Disabling an account or changing its password ends its session.
    /// Administrators cannot disable or demote themselves.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
        acting_user: Uuid,
    ) -> Result<UserResponse, ApiError> {
        if id == acting_user
            && (request.is_active == Some(false)
                || request.role.is_some_and(|role| role != UserRole::Admin))
        {
            return Err(ApiError::BadRequest(
                "Administrators cannot disable or demote their own account".to_string(),
            ));
        }

        let mut user = self.load(id).await?;
        let mut end_session = false;

        if let Some(username) = request.username {
            user.username = username;
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name;
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(password) = request.password {
            user.password_hash = self.hash(&password).await?;
            end_session = true;
        }
        if let Some(is_active) = request.is_active {
            user.is_active = is_active;
            end_session |= !is_active;
        }

        let mut user = self
            .store
            .update_user(user)
            .await?
            .ok_or_else(|| not_found(id))?;

        if end_session {
            self.store.set_refresh_token(id, None).await?;
            user.refresh_token_hash = None;
        }

        tracing::info!(
            user_id = %id,
            by = %acting_user,
            is_active = user.is_active,
            session_ended = end_session,
            "User updated"
        );

        Ok(user.into())
    }

    pub async fn delete(&self, id: Uuid, acting_user: Uuid) -> Result<Uuid, ApiError> {
        if id == acting_user {
            return Err(ApiError::BadRequest(
                "Administrators cannot delete their own account".to_string(),
            ));
        }

        if !self.store.delete_user(id).await? {
            return Err(not_found(id));
        }

        tracing::info!(user_id = %id, by = %acting_user, "User deleted");

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: UserService,
        admin: UserResponse,
    }

    fn new_user(username: &str, role: UserRole) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "password-1".to_string(),
            first_name: "First".to_string(),
            last_name: "Last".to_string(),
            role,
        }
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store.clone()).with_bcrypt_cost(4);
        let admin = service
            .create(new_user("root", UserRole::Admin))
            .await
            .unwrap();
        Fixture {
            store,
            service,
            admin,
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password() {
        let fx = fixture().await;
        let stored = fx.store.find_by_id(fx.admin.id).await.unwrap().unwrap();

        assert_ne!(stored.password_hash, "password-1");
        assert!(crate::auth::verify_password("password-1", &stored.password_hash)
            .await
            .unwrap());
        assert!(fx.admin.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let fx = fixture().await;
        let err = fx
            .service
            .create(new_user("root", UserRole::User))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_disabling_ends_session() {
        let fx = fixture().await;
        let bob = fx.service.create(new_user("bob", UserRole::User)).await.unwrap();
        fx.store
            .set_refresh_token(bob.id, Some("hash".to_string()))
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                bob.id,
                UpdateUserRequest {
                    is_active: Some(false),
                    ..UpdateUserRequest::default()
                },
                fx.admin.id,
            )
            .await
            .unwrap();

        assert!(!updated.is_active);
        let stored = fx.store.find_by_id(bob.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
    }

    #[tokio::test]
    async fn test_profile_edit_keeps_session() {
        let fx = fixture().await;
        let bob = fx.service.create(new_user("bob", UserRole::User)).await.unwrap();
        fx.store
            .set_refresh_token(bob.id, Some("hash".to_string()))
            .await
            .unwrap();

        let updated = fx
            .service
            .update(
                bob.id,
                UpdateUserRequest {
                    first_name: Some("Robert".to_string()),
                    role: Some(UserRole::Editor),
                    ..UpdateUserRequest::default()
                },
                fx.admin.id,
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Robert");
        assert_eq!(updated.role, UserRole::Editor);
        let stored = fx.store.find_by_id(bob.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token_hash.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn test_admin_cannot_lock_themselves_out() {
        let fx = fixture().await;

        let disable = UpdateUserRequest {
            is_active: Some(false),
            ..UpdateUserRequest::default()
        };
        let demote = UpdateUserRequest {
            role: Some(UserRole::Editor),
            ..UpdateUserRequest::default()
        };

        for request in [disable, demote] {
            let err = fx
                .service
                .update(fx.admin.id, request, fx.admin.id)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)));
        }

        let err = fx.service.delete(fx.admin.id, fx.admin.id).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_and_missing_user() {
        let fx = fixture().await;
        let bob = fx.service.create(new_user("bob", UserRole::User)).await.unwrap();

        assert_eq!(fx.service.delete(bob.id, fx.admin.id).await.unwrap(), bob.id);
        assert!(matches!(
            fx.service.find_by_id(bob.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.delete(bob.id, fx.admin.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
