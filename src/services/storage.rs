use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::ApiError;

/// Top-level directories under the media root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Documents,
    Thumbnails,
}

impl Namespace {
    pub fn dir(&self) -> &'static str {
        match self {
            Namespace::Documents => "documents",
            Namespace::Thumbnails => "thumbnails",
        }
    }

    fn file_name(&self, extension: &str) -> String {
        match self {
            Namespace::Documents => format!("{}.{}", Uuid::new_v4(), extension),
            Namespace::Thumbnails => format!("thumb_{}.{}", Uuid::new_v4(), extension),
        }
    }
}

/// Local-disk blob storage addressed by keys such as `documents/<uuid>.png`.
pub struct BlobStorage {
    root: PathBuf,
}

impl BlobStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates both namespace directories.
    pub async fn ensure_dirs(&self) -> Result<(), ApiError> {
        for namespace in [Namespace::Documents, Namespace::Thumbnails] {
            fs::create_dir_all(self.root.join(namespace.dir())).await?;
        }
        Ok(())
    }

    /// Writes `data` under a fresh uuid name and returns its key.
    ///
    /// The extension is taken from `original_name`, reduced to ASCII
    /// alphanumerics; `bin` is used when nothing usable remains.
    pub async fn store(
        &self,
        namespace: Namespace,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, ApiError> {
        let dir = self.root.join(namespace.dir());
        fs::create_dir_all(&dir).await?;

        let stored_name = namespace.file_name(&sanitize_extension(original_name));
        fs::write(dir.join(&stored_name), data).await?;

        let key = format!("{}/{}", namespace.dir(), stored_name);
        tracing::debug!(key = %key, bytes = data.len(), "stored blob");
        Ok(key)
    }

    /// Missing blobs are `NotFound`.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, ApiError> {
        let path = self.path_of(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ApiError::NotFound(format!("File {} not found", key)))
            }
            Err(e) => Err(ApiError::Io(e)),
        }
    }

    /// Returns `false` when the blob was already gone.
    pub async fn delete(&self, key: &str) -> Result<bool, ApiError> {
        let path = self.path_of(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ApiError::Io(e)),
        }
    }

    /// Absolute path for a key. Rejects keys outside the known namespaces.
    pub fn path_of(&self, key: &str) -> Result<PathBuf, ApiError> {
        let (dir, name) = key
            .split_once('/')
            .ok_or_else(|| ApiError::validation(format!("Invalid storage key '{}'", key)))?;

        let known = [Namespace::Documents, Namespace::Thumbnails]
            .iter()
            .any(|n| n.dir() == dir);
        if !known || !is_plain_file_name(name) {
            return Err(ApiError::validation(format!("Invalid storage key '{}'", key)));
        }

        Ok(self.root.join(dir).join(name))
    }
}

fn sanitize_extension(original_name: &str) -> String {
    let ext: String = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(16)
        .collect();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}

/// A single path component with no traversal or separators.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.starts_with('.')
}
