//! File attachment storage

pub mod storage;

pub use storage::{FileKind, FileStorage, FileStorageError, StoredFile};
