use async_trait::async_trait;
use drill_core::model::{DocumentId, DocumentNode, NodeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by document store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read-only access to the host document trees.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Resolve a document identifier to its root node.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the identifier does not resolve, or
    /// another `StorageError` for any other failure.
    async fn resolve_document(&self, id: &DocumentId) -> Result<Arc<DocumentNode>, StorageError>;
}

/// Simple in-memory document store for testing and prototyping.
///
/// Every node of an inserted tree is addressable, so a sub-tree can be used as a
/// document in its own right.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    nodes: Arc<Mutex<HashMap<NodeId, Arc<DocumentNode>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a document tree. Later inserts replace nodes with the same id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn insert_document(&self, root: DocumentNode) -> Result<(), StorageError> {
        let mut guard = self
            .nodes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for node in DocumentNode::walk(Arc::new(root)) {
            guard.insert(node.id().clone(), node);
        }
        Ok(())
    }

    /// Number of addressable nodes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn node_count(&self) -> Result<usize, StorageError> {
        let guard = self
            .nodes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryRepository {
    async fn resolve_document(&self, id: &DocumentId) -> Result<Arc<DocumentNode>, StorageError> {
        let guard = self
            .nodes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(&NodeId::new(id.as_str()))
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}
