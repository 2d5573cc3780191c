use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::ApiError,
    models::{Document, DocumentFilter, DocumentView, SearchLog},
    repositories::{DocumentRepository, SearchLogRepository},
    services::storage::BlobStorage,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DocumentCounts {
    pub total_documents: i64,
    pub active_documents: i64,
    pub inactive_documents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub documents: Vec<DocumentView>,
    pub search_logs: Vec<SearchLog>,
    #[serde(flatten)]
    pub counts: DocumentCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletePreview {
    pub document: DocumentView,
    #[serde(flatten)]
    pub counts: DocumentCounts,
}

pub struct ModerationService {
    document_repo: Arc<dyn DocumentRepository + Send + Sync>,
    search_log_repo: Arc<dyn SearchLogRepository + Send + Sync>,
    storage: Arc<BlobStorage>,
    search_log_limit: i64,
}

impl ModerationService {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository + Send + Sync>,
        search_log_repo: Arc<dyn SearchLogRepository + Send + Sync>,
        storage: Arc<BlobStorage>,
        search_log_limit: i64,
    ) -> Self {
        Self {
            document_repo,
            search_log_repo,
            storage,
            search_log_limit,
        }
    }

    pub async fn toggle(&self, id: i64) -> Result<Document, ApiError> {
        let document = self.document_repo.toggle_active(id).await?;
        tracing::info!(
            document_id = id,
            is_active = document.is_active,
            "document visibility toggled"
        );
        Ok(document)
    }

    pub async fn delete_preview(&self, id: i64) -> Result<DeletePreview, ApiError> {
        let document = self
            .document_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;

        Ok(DeletePreview {
            document: DocumentView::from(document),
            counts: self.counts().await?,
        })
    }

    /// Removes the file, then the thumbnail, then the record.
    ///
    /// Blobs that are already gone are skipped. Any other storage error stops
    /// the deletion before the record is touched.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let document = self
            .document_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))?;

        if !self.storage.delete(&document.document_file).await? {
            tracing::warn!(document_id = id, file = %document.document_file, "document file already missing");
        }
        if let Some(thumbnail) = &document.thumbnail {
            if !self.storage.delete(thumbnail).await? {
                tracing::warn!(document_id = id, file = %thumbnail, "thumbnail already missing");
            }
        }

        self.document_repo.delete(id).await?;
        tracing::info!(document_id = id, title = %document.title, "document deleted");
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let documents = self.document_repo.list(&DocumentFilter::default()).await?;
        let search_logs = self
            .search_log_repo
            .list_recent(self.search_log_limit)
            .await?;

        Ok(Dashboard {
            documents: documents.iter().map(DocumentView::from).collect(),
            search_logs,
            counts: self.counts().await?,
        })
    }

    pub async fn counts(&self) -> Result<DocumentCounts, ApiError> {
        let total_documents = self.document_repo.count(None).await?;
        let active_documents = self.document_repo.count(Some(true)).await?;
        Ok(DocumentCounts {
            total_documents,
            active_documents,
            inactive_documents: total_documents - active_documents,
        })
    }
}
