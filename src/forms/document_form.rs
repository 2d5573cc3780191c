use axum::{body::Bytes, extract::Multipart};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{non_blank, required_date, required_text, FieldErrors, REQUIRED};
use crate::{
    error::ApiError,
    models::{DocumentType, DocumentUpdate},
};

pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Raw multipart submission of the add-document form.
#[derive(Debug, Default)]
pub struct DocumentForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub original_date: Option<String>,
    pub document_type: Option<String>,
    pub keywords: Option<String>,
    pub document_file: Option<UploadedFile>,
}

#[derive(Debug, Clone)]
pub struct ValidatedDocument {
    pub title: String,
    pub description: String,
    pub original_date: NaiveDate,
    pub document_type: DocumentType,
    pub keywords: String,
    pub file: UploadedFile,
}

impl DocumentForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = DocumentForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read multipart field: {}", e)))?
        {
            let field_name = field.name().unwrap_or("").to_string();

            if field_name == "document_file" {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read file data: {}", e))
                })?;
                form.document_file = Some(UploadedFile { file_name, bytes });
                continue;
            }

            let slot = match field_name.as_str() {
                "title" => &mut form.title,
                "description" => &mut form.description,
                "original_date" => &mut form.original_date,
                "document_type" => &mut form.document_type,
                "keywords" => &mut form.keywords,
                _ => continue,
            };
            let text = field.text().await.map_err(|e| {
                ApiError::Validation(format!("Failed to read field '{}': {}", field_name, e))
            })?;
            *slot = Some(text);
        }

        Ok(form)
    }

    pub fn validate(self, max_upload_bytes: u64) -> Result<ValidatedDocument, FieldErrors> {
        let mut errors = FieldErrors::default();

        let metadata = validate_metadata(
            &mut errors,
            MetadataInput {
                title: self.title.as_deref(),
                description: self.description.as_deref(),
                original_date: self.original_date.as_deref(),
                document_type: self.document_type.as_deref(),
                keywords: self.keywords.as_deref(),
            },
        );
        let file = validate_file(&mut errors, self.document_file, max_upload_bytes);

        match (metadata, file) {
            (Some(m), Some(file)) if errors.is_empty() => Ok(ValidatedDocument {
                title: m.title,
                description: m.description,
                original_date: m.original_date,
                document_type: m.document_type,
                keywords: m.keywords,
                file,
            }),
            _ => Err(errors),
        }
    }

    /// Field description served on `GET /document/add/`.
    pub fn describe(max_upload_bytes: u64) -> Value {
        let choices: Vec<Value> = DocumentType::ALL
            .iter()
            .map(|t| json!({ "value": t.as_str(), "label": t.label() }))
            .collect();

        json!({
            "enctype": "multipart/form-data",
            "fields": [
                { "name": "title", "type": "text", "required": true, "max_length": TITLE_MAX_CHARS },
                { "name": "description", "type": "textarea", "required": true },
                { "name": "original_date", "type": "date", "required": true, "format": "YYYY-MM-DD" },
                { "name": "document_file", "type": "file", "required": true, "max_bytes": max_upload_bytes },
                {
                    "name": "document_type",
                    "type": "select",
                    "required": true,
                    "default": DocumentType::default().as_str(),
                    "choices": choices,
                },
                { "name": "keywords", "type": "text", "required": false, "help": "comma separated" },
            ],
        })
    }
}

/// Urlencoded metadata edit. File, thumbnail and upload date cannot be changed here.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentEditForm {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub original_date: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
}

impl DocumentEditForm {
    pub fn validate(self) -> Result<DocumentUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let metadata = validate_metadata(
            &mut errors,
            MetadataInput {
                title: self.title.as_deref(),
                description: self.description.as_deref(),
                original_date: self.original_date.as_deref(),
                document_type: self.document_type.as_deref(),
                keywords: self.keywords.as_deref(),
            },
        );

        match metadata {
            Some(m) if errors.is_empty() => Ok(DocumentUpdate {
                title: m.title,
                description: m.description,
                original_date: m.original_date,
                document_type: m.document_type,
                keywords: m.keywords,
            }),
            _ => Err(errors),
        }
    }
}

struct MetadataInput<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
    original_date: Option<&'a str>,
    document_type: Option<&'a str>,
    keywords: Option<&'a str>,
}

struct Metadata {
    title: String,
    description: String,
    original_date: NaiveDate,
    document_type: DocumentType,
    keywords: String,
}

fn validate_metadata(errors: &mut FieldErrors, input: MetadataInput<'_>) -> Option<Metadata> {
    let title = required_text(errors, "title", input.title, Some(TITLE_MAX_CHARS));
    let description = required_text(errors, "description", input.description, None);
    let original_date = required_date(errors, "original_date", input.original_date);
    let document_type = match non_blank(input.document_type) {
        None => {
            errors.add("document_type", REQUIRED);
            None
        }
        Some(raw) => {
            let parsed = DocumentType::parse(raw);
            if parsed.is_none() {
                errors.add(
                    "document_type",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        raw
                    ),
                );
            }
            parsed
        }
    };
    let keywords = non_blank(input.keywords).unwrap_or("").to_string();

    Some(Metadata {
        title: title?,
        description: description?,
        original_date: original_date?,
        document_type: document_type?,
        keywords,
    })
}

fn validate_file(
    errors: &mut FieldErrors,
    file: Option<UploadedFile>,
    max_upload_bytes: u64,
) -> Option<UploadedFile> {
    let Some(file) = file.filter(|f| !f.file_name.trim().is_empty()) else {
        errors.add("document_file", REQUIRED);
        return None;
    };
    if file.bytes.is_empty() {
        errors.add("document_file", "The submitted file is empty.");
        return None;
    }
    if file.bytes.len() as u64 > max_upload_bytes {
        errors.add(
            "document_file",
            format!(
                "File size {} exceeds maximum allowed size of {} bytes.",
                file.bytes.len(),
                max_upload_bytes
            ),
        );
        return None;
    }
    Some(file)
}
