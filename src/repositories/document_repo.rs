use async_trait::async_trait;

use crate::{
    database::DatabasePool,
    error::ApiError,
    models::{Document, DocumentCreate, DocumentFilter, DocumentUpdate},
};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &DocumentCreate) -> Result<Document, ApiError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Document>, ApiError>;
    /// Newest first (`upload_date DESC, id DESC`).
    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, ApiError>;
    async fn update(&self, id: i64, update: &DocumentUpdate) -> Result<Document, ApiError>;
    /// Sets the thumbnail only while it is still unset. `None` when nothing was updated.
    async fn attach_thumbnail(&self, id: i64, key: &str) -> Result<Option<Document>, ApiError>;
    async fn toggle_active(&self, id: i64) -> Result<Document, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    async fn count(&self, active: Option<bool>) -> Result<i64, ApiError>;
}

const DOCUMENT_COLUMNS: &str = "id, title, description, original_date, upload_date, document_file, \
     document_type, thumbnail, keywords, is_active";

pub struct SqlxDocumentRepository {
    pool: DatabasePool,
}

impl SqlxDocumentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// `%kw%` with the ILIKE metacharacters escaped.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Document with id {} not found", id))
}

#[async_trait]
impl DocumentRepository for SqlxDocumentRepository {
    async fn create(&self, document: &DocumentCreate) -> Result<Document, ApiError> {
        let sql = format!(
            r#"
            INSERT INTO documents (title, description, original_date, document_file, document_type, keywords)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let result = sqlx::query_as::<_, Document>(&sql)
            .bind(&document.title)
            .bind(&document.description)
            .bind(document.original_date)
            .bind(&document.document_file)
            .bind(document.document_type)
            .bind(&document.keywords)
            .fetch_one(&self.pool)
            .await?;

        Ok(result)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>, ApiError> {
        let sql = format!("SELECT {} FROM documents WHERE id = $1", DOCUMENT_COLUMNS);

        let result = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, ApiError> {
        let patterns: Vec<String> = filter.keywords.iter().map(|k| like_pattern(k)).collect();
        let sql = format!(
            r#"
            SELECT {}
            FROM documents
            WHERE ($1::boolean IS NULL OR is_active = $1)
              AND (cardinality($2::text[]) = 0
                   OR title ILIKE ANY($2)
                   OR description ILIKE ANY($2)
                   OR keywords ILIKE ANY($2))
              AND ($3::date IS NULL OR original_date >= $3)
              AND ($4::date IS NULL OR original_date <= $4)
            ORDER BY upload_date DESC, id DESC
            LIMIT $5
            "#,
            DOCUMENT_COLUMNS
        );

        let results = sqlx::query_as::<_, Document>(&sql)
            .bind(filter.active)
            .bind(patterns)
            .bind(filter.date_from)
            .bind(filter.date_to)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(results)
    }

    async fn update(&self, id: i64, update: &DocumentUpdate) -> Result<Document, ApiError> {
        let sql = format!(
            r#"
            UPDATE documents
            SET title = $2, description = $3, original_date = $4, document_type = $5, keywords = $6
            WHERE id = $1
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(&update.description)
            .bind(update.original_date)
            .bind(update.document_type)
            .bind(&update.keywords)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn attach_thumbnail(&self, id: i64, key: &str) -> Result<Option<Document>, ApiError> {
        let sql = format!(
            "UPDATE documents SET thumbnail = $2 WHERE id = $1 AND thumbnail IS NULL RETURNING {}",
            DOCUMENT_COLUMNS
        );

        let result = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(result)
    }

    async fn toggle_active(&self, id: i64) -> Result<Document, ApiError> {
        let sql = format!(
            "UPDATE documents SET is_active = NOT is_active WHERE id = $1 RETURNING {}",
            DOCUMENT_COLUMNS
        );

        sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn count(&self, active: Option<bool>) -> Result<i64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE ($1::boolean IS NULL OR is_active = $1)",
        )
        .bind(active)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
