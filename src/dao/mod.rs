/// Document store abstraction and its backends.
pub mod document_store;
/// Persisted entity definitions.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
/// Typed per-collection access over the document store.
pub mod repository;
