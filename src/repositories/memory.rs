//! Embedded repositories selected by a `memory:` database URL.
//!
//! They mirror the PostgreSQL implementations closely enough that the HTTP
//! tests can run without a database server.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    error::ApiError,
    models::{
        Document, DocumentCreate, DocumentFilter, DocumentUpdate, KeywordQuery, SearchLog,
        SearchLogCreate,
    },
    repositories::{
        user_repo::{User, UserCreate},
        DocumentRepository, SearchLogRepository, UserRepository,
    },
};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Document with id {} not found", id))
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    table: RwLock<Table<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &DocumentCreate) -> Result<Document, ApiError> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let created = Document {
            id,
            title: document.title.clone(),
            description: document.description.clone(),
            original_date: document.original_date,
            upload_date: Utc::now(),
            document_file: document.document_file.clone(),
            document_type: document.document_type,
            thumbnail: None,
            keywords: document.keywords.clone(),
            is_active: true,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Document>, ApiError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, ApiError> {
        let keywords = KeywordQuery::from_keywords(&filter.keywords);
        let table = self.table.read().await;

        let mut documents: Vec<Document> = table
            .rows
            .values()
            .filter(|d| filter.active.map_or(true, |active| d.is_active == active))
            .filter(|d| keywords.matches(d))
            .filter(|d| filter.within_dates(d.original_date))
            .cloned()
            .collect();

        documents.sort_by(|a, b| {
            b.upload_date
                .cmp(&a.upload_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = filter.limit {
            documents.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }

        Ok(documents)
    }

    async fn update(&self, id: i64, update: &DocumentUpdate) -> Result<Document, ApiError> {
        let mut table = self.table.write().await;
        let document = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        document.title = update.title.clone();
        document.description = update.description.clone();
        document.original_date = update.original_date;
        document.document_type = update.document_type;
        document.keywords = update.keywords.clone();
        Ok(document.clone())
    }

    async fn attach_thumbnail(&self, id: i64, key: &str) -> Result<Option<Document>, ApiError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(document) if document.thumbnail.is_none() => {
                document.thumbnail = Some(key.to_string());
                Ok(Some(document.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn toggle_active(&self, id: i64) -> Result<Document, ApiError> {
        let mut table = self.table.write().await;
        let document = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        document.is_active = !document.is_active;
        Ok(document.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }

    async fn count(&self, active: Option<bool>) -> Result<i64, ApiError> {
        let table = self.table.read().await;
        let count = table
            .rows
            .values()
            .filter(|d| active.map_or(true, |a| d.is_active == a))
            .count();
        Ok(count as i64)
    }
}

#[derive(Default)]
pub struct InMemorySearchLogRepository {
    table: RwLock<Table<SearchLog>>,
}

impl InMemorySearchLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SearchLogRepository for InMemorySearchLogRepository {
    async fn create(&self, log: &SearchLogCreate) -> Result<SearchLog, ApiError> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();
        let created = SearchLog {
            id,
            query: log.query.clone(),
            date_from: log.date_from,
            date_to: log.date_to,
            search_date: Utc::now(),
            results_count: log.results_count,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<SearchLog>, ApiError> {
        let table = self.table.read().await;
        let mut logs: Vec<SearchLog> = table.rows.values().cloned().collect();
        logs.sort_by(|a, b| {
            b.search_date
                .cmp(&a.search_date)
                .then_with(|| b.id.cmp(&a.id))
        });
        logs.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(logs)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create_user(&self, user: &UserCreate) -> Result<User, ApiError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.username == user.username) {
            return Err(ApiError::Validation(format!(
                "User '{}' already exists",
                user.username
            )));
        }
        let id = table.allocate_id();
        let created = User {
            id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn update_last_login(&self, user_id: i64) -> Result<(), ApiError> {
        if let Some(user) = self.table.write().await.rows.get_mut(&user_id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}
