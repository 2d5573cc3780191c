use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Staff or superuser.
    pub fn is_elevated(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserCreate {
    pub username: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError>;
    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError>;
    async fn update_last_login(&self, user_id: i64) -> Result<(), ApiError>;
}

const USER_COLUMNS: &str =
    "id, username, password_hash, is_staff, is_superuser, is_active, created_at, last_login_at";

pub struct SqlxUserRepository {
    pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(user)
    }

    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError> {
        let sql = format!(
            r#"INSERT INTO users (username, password_hash, is_staff, is_superuser)
               VALUES ($1, $2, $3, $4)
               RETURNING {}"#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(user)
    }

    async fn update_last_login(&self, user_id: i64) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }
}
