use crate::{
    auth::{hash_password, verify_password, PasswordPolicy},
    common::now,
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{user, UserRole},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Clone, Validate)]
struct NewUser {
    #[validate(length(min = 1, max = 100))]
    username: String,
}

/// User accounts with Argon2-hashed credentials
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    password_policy: PasswordPolicy,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
            password_policy: PasswordPolicy::default(),
        }
    }

    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<user::Model, ServiceError> {
        let username = username.trim().to_string();
        NewUser {
            username: username.clone(),
        }
        .validate()?;
        self.password_policy
            .validate(password, Some(&username))
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if self.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Username {} is already taken",
                username
            )));
        }

        let created = user::ActiveModel {
            username: Set(username),
            password_hash: Set(hash_password(password)?),
            role: Set(role),
            created_at: Set(now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::db_error)?;

        info!(user_id = created.id, role = %created.role, "User created");
        self.event_sender
            .publish(Event::UserCreated {
                user_id: created.id,
                username: created.username.clone(),
                role: created.role,
            })
            .await;

        Ok(created)
    }

    /// Returns the user when the password matches; unknown users and wrong
    /// passwords fail identically.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let invalid = || ServiceError::AuthError("Invalid username or password".to_string());

        let Some(found) = self.find_by_username(username.trim()).await? else {
            warn!("Login attempt for unknown user");
            return Err(invalid());
        };

        if verify_password(password, &found.password_hash)? {
            Ok(found)
        } else {
            warn!(user_id = found.id, "Password mismatch");
            Err(invalid())
        }
    }

    #[instrument(skip(self))]
    pub async fn change_role(&self, user_id: i32, role: UserRole) -> Result<user::Model, ServiceError> {
        let found = user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        let mut active = found.into_active_model();
        active.role = Set(role);
        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(user_id, role = %updated.role, "User role changed");
        Ok(updated)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }
}
