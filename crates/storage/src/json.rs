//! Document store backed by a JSON export of document trees.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use drill_core::model::{DocumentId, DocumentNode};
use serde::Deserialize;

use crate::repository::{DocumentRepository, InMemoryRepository, StorageError};

/// Accepted top-level shapes: a single tree, a list of trees, or
/// `{ "documents": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Wrapped { documents: Vec<DocumentNode> },
    Many(Vec<DocumentNode>),
    One(DocumentNode),
}

impl DocumentFile {
    fn into_roots(self) -> Vec<DocumentNode> {
        match self {
            DocumentFile::Wrapped { documents } | DocumentFile::Many(documents) => documents,
            DocumentFile::One(root) => vec![root],
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct JsonDocumentStore {
    inner: InMemoryRepository,
}

impl JsonDocumentStore {
    /// Load and index every tree in the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read and
    /// `StorageError::Serialization` if it is not a valid document export.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&raw)
    }

    /// Parse and index document trees from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed input.
    pub fn from_json_str(raw: &str) -> Result<Self, StorageError> {
        let file: DocumentFile =
            serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let inner = InMemoryRepository::new();
        for root in file.into_roots() {
            inner.insert_document(root)?;
        }
        Ok(Self { inner })
    }
}

#[async_trait]
impl DocumentRepository for JsonDocumentStore {
    async fn resolve_document(&self, id: &DocumentId) -> Result<Arc<DocumentNode>, StorageError> {
        self.inner.resolve_document(id).await
    }
}
