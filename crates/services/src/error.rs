//! Shared error types for the services crate.

use drill_core::model::DocumentId;
use thiserror::Error;

/// A per-document failure recorded while building a deck.
///
/// These never abort a build; the document is skipped and the issue is kept
/// for diagnostics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentIssue {
    #[error("document not found: {document_id}")]
    NotFound { document_id: DocumentId },
    #[error("failed to resolve document {document_id}: {message}")]
    Resolution {
        document_id: DocumentId,
        message: String,
    },
}

impl DocumentIssue {
    #[must_use]
    pub fn document_id(&self) -> &DocumentId {
        match self {
            DocumentIssue::NotFound { document_id }
            | DocumentIssue::Resolution { document_id, .. } => document_id,
        }
    }
}

/// Errors emitted by the practice driver handle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    #[error("practice session is closed")]
    Closed,
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
