use crate::auth::{UserContext, UserSession};
use crate::config::Settings;
use crate::error::ApiError;
use crate::repositories::user_repo::{User, UserCreate, UserRepository};
use crate::utils::crypto::{hash_password, verify_password};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    settings: Arc<Settings>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl AuthService {
    pub fn new(settings: Arc<Settings>, user_repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self {
            settings,
            user_repo,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession, ApiError> {
        let invalid = || ApiError::Authentication("Invalid username or password".to_string());

        let user = match self.user_repo.find_by_username(username).await? {
            Some(u) if u.is_active => u,
            _ => return Err(invalid()),
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(username = %username, "failed login attempt");
            return Err(invalid());
        }

        self.user_repo.update_last_login(user.id).await?;
        tracing::info!(user_id = user.id, username = %user.username, "user logged in");

        Ok(self.create_session(&user))
    }

    /// Resolves a cookie session to a live user. Expired sessions and
    /// missing or deactivated users yield `None`.
    pub async fn resolve(&self, session: &UserSession) -> Result<Option<UserContext>, ApiError> {
        if session.is_expired() {
            return Ok(None);
        }

        let user = self.user_repo.find_by_id(session.user_id).await?;
        Ok(user
            .filter(|u| u.is_active)
            .map(|u| UserContext::from_user(&u)))
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, ApiError> {
        let password_hash = hash_password(password)?;
        self.user_repo
            .create_user(&UserCreate {
                username: username.to_string(),
                password_hash,
                is_staff,
                is_superuser,
            })
            .await
    }

    /// Creates the configured superuser when it does not exist yet.
    pub async fn ensure_admin(&self) -> Result<(), ApiError> {
        let (Some(username), Some(password)) = (
            self.settings.admin_username.as_deref(),
            self.settings.admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.user_repo.find_by_username(username).await?.is_some() {
            tracing::debug!(username = %username, "admin user already present");
            return Ok(());
        }

        let user = self.create_user(username, password, true, true).await?;
        tracing::info!(user_id = user.id, username = %user.username, "created admin user");
        Ok(())
    }

    fn create_session(&self, user: &User) -> UserSession {
        let expiry = i64::try_from(self.settings.auth_session_expiry_seconds).unwrap_or(i64::MAX);
        UserSession {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            expires_at: Utc::now() + Duration::seconds(expiry),
            session_id: Uuid::new_v4().to_string(),
        }
    }
}
