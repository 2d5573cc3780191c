use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "document_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Photo,
    Scan,
    Multipage,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Photo,
        DocumentType::Scan,
        DocumentType::Multipage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Photo => "photo",
            DocumentType::Scan => "scan",
            DocumentType::Multipage => "multipage",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Photo => "Photograph",
            DocumentType::Scan => "Document scan",
            DocumentType::Multipage => "Multi-page document",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        DocumentType::Photo
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An archived file plus its metadata.
///
/// `document_file` and `thumbnail` are storage keys such as `documents/<uuid>.png`,
/// never the name the file was uploaded under.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub original_date: NaiveDate,
    pub upload_date: DateTime<Utc>,
    pub document_file: String,
    pub document_type: DocumentType,
    pub thumbnail: Option<String>,
    pub keywords: String,
    pub is_active: bool,
}

impl Document {
    pub fn keywords_list(&self) -> Vec<String> {
        if self.keywords.is_empty() {
            return Vec::new();
        }
        self.keywords
            .split(',')
            .map(|kw| kw.trim().to_string())
            .collect()
    }

    pub fn detail_url(&self) -> String {
        format!("/document/{}/", self.id)
    }

    pub fn download_url(&self) -> String {
        format!("/document/{}/download/", self.id)
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.thumbnail.as_ref().map(|key| format!("/media/{}", key))
    }

    /// File name of the stored blob, used for the download attachment name.
    pub fn file_name(&self) -> &str {
        self.document_file
            .rsplit('/')
            .next()
            .unwrap_or(&self.document_file)
    }
}

#[derive(Debug, Clone)]
pub struct DocumentCreate {
    pub title: String,
    pub description: String,
    pub original_date: NaiveDate,
    pub document_file: String,
    pub document_type: DocumentType,
    pub keywords: String,
}

/// Editable metadata. Upload date, file and thumbnail are deliberately absent.
#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub title: String,
    pub description: String,
    pub original_date: NaiveDate,
    pub document_type: DocumentType,
    pub keywords: String,
}

/// Filter for listing documents. Keywords are expected lower-cased and non-empty.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub active: Option<bool>,
    pub keywords: Vec<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl DocumentFilter {
    pub fn active() -> Self {
        Self {
            active: Some(true),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn within_dates(&self, date: NaiveDate) -> bool {
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }
}

/// Response DTO for a document with derived links
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub original_date: NaiveDate,
    pub upload_date: DateTime<Utc>,
    pub document_type: DocumentType,
    pub document_type_label: &'static str,
    pub keywords: String,
    pub keywords_list: Vec<String>,
    pub is_active: bool,
    pub file_name: String,
    pub thumbnail_url: Option<String>,
    pub detail_url: String,
    pub download_url: String,
}

impl From<&Document> for DocumentView {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id,
            title: document.title.clone(),
            description: document.description.clone(),
            original_date: document.original_date,
            upload_date: document.upload_date,
            document_type: document.document_type,
            document_type_label: document.document_type.label(),
            keywords: document.keywords.clone(),
            keywords_list: document.keywords_list(),
            is_active: document.is_active,
            file_name: document.file_name().to_string(),
            thumbnail_url: document.thumbnail_url(),
            detail_url: document.detail_url(),
            download_url: document.download_url(),
        }
    }
}

impl From<Document> for DocumentView {
    fn from(document: Document) -> Self {
        Self::from(&document)
    }
}
