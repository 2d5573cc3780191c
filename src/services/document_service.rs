//! Document Service
//!
//! Owns the create/read/update pipeline around the document repository,
//! the blob storage and the thumbnail generator.

use std::sync::Arc;

use crate::{
    error::ApiError,
    forms::ValidatedDocument,
    models::{Document, DocumentCreate, DocumentFilter, DocumentUpdate},
    repositories::DocumentRepository,
    services::{
        storage::{BlobStorage, Namespace},
        thumbnail_service::{ThumbnailGenerator, ThumbnailOutcome},
    },
};

pub struct DocumentService {
    document_repo: Arc<dyn DocumentRepository + Send + Sync>,
    storage: Arc<BlobStorage>,
    thumbnails: ThumbnailGenerator,
}

impl DocumentService {
    pub fn new(
        document_repo: Arc<dyn DocumentRepository + Send + Sync>,
        storage: Arc<BlobStorage>,
        thumbnails: ThumbnailGenerator,
    ) -> Self {
        Self {
            document_repo,
            storage,
            thumbnails,
        }
    }

    /// Stores the file, inserts the record, then tries to attach a thumbnail.
    ///
    /// A thumbnail failure never fails the upload.
    pub async fn create(&self, validated: ValidatedDocument) -> Result<Document, ApiError> {
        let file_key = self
            .storage
            .store(
                Namespace::Documents,
                &validated.file.file_name,
                &validated.file.bytes,
            )
            .await?;

        let create = DocumentCreate {
            title: validated.title,
            description: validated.description,
            original_date: validated.original_date,
            document_file: file_key.clone(),
            document_type: validated.document_type,
            keywords: validated.keywords,
        };

        let document = match self.document_repo.create(&create).await {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&file_key).await {
                    tracing::warn!(file = %file_key, error = %cleanup, "failed to remove orphaned upload");
                }
                return Err(e);
            }
        };

        tracing::info!(
            document_id = document.id,
            file = %document.document_file,
            document_type = %document.document_type,
            "document created"
        );

        Ok(self.ensure_thumbnail(document).await)
    }

    /// Active documents only; inactive ids are reported as not found.
    pub async fn get_active(&self, id: i64) -> Result<Document, ApiError> {
        match self.document_repo.get_by_id(id).await? {
            Some(document) if document.is_active => Ok(document),
            _ => Err(ApiError::NotFound(format!("Document {} not found", id))),
        }
    }

    pub async fn get(&self, id: i64) -> Result<Document, ApiError> {
        self.document_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Document {} not found", id)))
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<Document>, ApiError> {
        self.document_repo
            .list(&DocumentFilter::active().with_limit(limit))
            .await
    }

    /// Persists new metadata. A document still lacking a thumbnail gets another attempt.
    pub async fn update(&self, id: i64, update: DocumentUpdate) -> Result<Document, ApiError> {
        let document = self.document_repo.update(id, &update).await?;
        tracing::info!(document_id = id, "document metadata updated");

        if document.thumbnail.is_some() {
            return Ok(document);
        }
        Ok(self.ensure_thumbnail(document).await)
    }

    /// Stored file name and contents. A missing blob is `NotFound`.
    pub async fn read_file(&self, document: &Document) -> Result<(String, Vec<u8>), ApiError> {
        let bytes = self.storage.read(&document.document_file).await?;
        Ok((document.file_name().to_string(), bytes))
    }

    async fn ensure_thumbnail(&self, document: Document) -> Document {
        let key = match self.thumbnails.generate(&document.document_file).await {
            ThumbnailOutcome::Produced(key) => key,
            ThumbnailOutcome::Skipped | ThumbnailOutcome::Failed(_) => return document,
        };

        match self.document_repo.attach_thumbnail(document.id, &key).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                // Another writer attached one first, or the record is gone.
                self.discard_thumbnail(&key).await;
                document
            }
            Err(e) => {
                tracing::warn!(document_id = document.id, error = %e, "failed to attach thumbnail");
                self.discard_thumbnail(&key).await;
                document
            }
        }
    }

    async fn discard_thumbnail(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(thumbnail = %key, error = %e, "failed to remove orphaned thumbnail");
        }
    }
}
