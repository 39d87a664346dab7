#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::JsonDocumentStore;
pub use repository::{DocumentRepository, InMemoryRepository, StorageError};
