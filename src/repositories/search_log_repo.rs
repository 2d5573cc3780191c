use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{SearchLog, SearchLogCreate},
};

/// Search logs are append-only: there is no update or delete.
#[async_trait]
pub trait SearchLogRepository: Send + Sync {
    async fn create(&self, log: &SearchLogCreate) -> Result<SearchLog, ApiError>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<SearchLog>, ApiError>;
}

pub struct SqlxSearchLogRepository {
    pool: DatabasePool,
}

impl SqlxSearchLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchLogRepository for SqlxSearchLogRepository {
    async fn create(&self, log: &SearchLogCreate) -> Result<SearchLog, ApiError> {
        let result = sqlx::query_as::<_, SearchLog>(
            r#"
            INSERT INTO search_logs (query, date_from, date_to, results_count)
            VALUES ($1, $2, $3, $4)
            RETURNING id, query, date_from, date_to, search_date, results_count
            "#,
        )
        .bind(&log.query)
        .bind(log.date_from)
        .bind(log.date_to)
        .bind(log.results_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<SearchLog>, ApiError> {
        let results = sqlx::query_as::<_, SearchLog>(
            r#"
            SELECT id, query, date_from, date_to, search_date, results_count
            FROM search_logs
            ORDER BY search_date DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }
}
