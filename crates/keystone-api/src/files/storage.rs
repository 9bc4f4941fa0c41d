//! Filesystem-backed attachment storage
//!
//! Attachments live under the configured upload root, split into
//! per-user directories and a shared organization directory. The store
//! only ever sees sanitized file names; anything resembling a path is
//! rejected before it reaches the filesystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use utoipa::ToSchema;
use uuid::Uuid;

/// Attachment scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    User,
    Organization,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::User => "user",
            FileKind::Organization => "organization",
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("ID is required for user files")]
    MissingOwner,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A stored attachment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredFile {
    pub file_name: String,
    pub url: String,
}

/// Attachment store rooted at the configured upload directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    base_url: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Store new content under a generated name, keeping the original
    /// extension
    pub async fn store(
        &self,
        kind: FileKind,
        owner: Option<Uuid>,
        original_name: &str,
        content: &[u8],
    ) -> Result<StoredFile, FileStorageError> {
        check_file_name(original_name)?;

        let dir = self.scope_dir(kind, owner)?;
        fs::create_dir_all(&dir).await?;

        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let stored_name = format!("{}{}", Uuid::new_v4(), extension);

        fs::write(dir.join(&stored_name), content).await?;

        Ok(StoredFile {
            url: self.public_url(kind, owner, &stored_name),
            file_name: stored_name,
        })
    }

    /// Replace an existing attachment's content, keeping its name
    pub async fn replace(
        &self,
        kind: FileKind,
        owner: Option<Uuid>,
        file_name: &str,
        content: &[u8],
    ) -> Result<StoredFile, FileStorageError> {
        check_file_name(file_name)?;

        let path = self.scope_dir(kind, owner)?.join(file_name);
        if !fs::try_exists(&path).await? {
            return Err(FileStorageError::NotFound(file_name.to_string()));
        }

        fs::write(&path, content).await?;

        Ok(StoredFile {
            url: self.public_url(kind, owner, file_name),
            file_name: file_name.to_string(),
        })
    }

    /// List attachments in a scope; a scope that was never written to is
    /// an empty list, not an error
    pub async fn list(
        &self,
        kind: FileKind,
        owner: Option<Uuid>,
    ) -> Result<Vec<StoredFile>, FileStorageError> {
        let dir = self.scope_dir(kind, owner)?;
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                files.push(StoredFile {
                    url: self.public_url(kind, owner, &name),
                    file_name: name,
                });
            }
        }
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        Ok(files)
    }

    /// Delete an attachment
    pub async fn delete(
        &self,
        kind: FileKind,
        owner: Option<Uuid>,
        file_name: &str,
    ) -> Result<(), FileStorageError> {
        check_file_name(file_name)?;

        let path = self.scope_dir(kind, owner)?.join(file_name);
        if !fs::try_exists(&path).await? {
            return Err(FileStorageError::NotFound(file_name.to_string()));
        }

        fs::remove_file(path).await?;
        Ok(())
    }

    fn scope_dir(&self, kind: FileKind, owner: Option<Uuid>) -> Result<PathBuf, FileStorageError> {
        match kind {
            FileKind::User => {
                let owner = owner.ok_or(FileStorageError::MissingOwner)?;
                Ok(self.root.join("users").join(owner.to_string()))
            }
            FileKind::Organization => Ok(self.root.join("organizations")),
        }
    }

    fn public_url(&self, kind: FileKind, owner: Option<Uuid>, file_name: &str) -> String {
        let scope = match (kind, owner) {
            (FileKind::User, Some(owner)) => format!("users/{owner}"),
            _ => "organizations".to_string(),
        };
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.root.display(),
            scope,
            file_name
        )
    }
}

/// Reject names that could escape the scope directory
fn check_file_name(name: &str) -> Result<(), FileStorageError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(FileStorageError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> FileStorage {
        let root = std::env::temp_dir().join(format!("keystone-files-{}", Uuid::new_v4()));
        FileStorage::new(root, "http://localhost:8080")
    }

    #[tokio::test]
    async fn test_store_and_list_user_files() {
        let storage = temp_storage();
        let owner = Uuid::new_v4();

        let stored = storage
            .store(FileKind::User, Some(owner), "avatar.png", b"png-bytes")
            .await
            .unwrap();

        assert!(stored.file_name.ends_with(".png"));
        assert!(stored.url.contains(&owner.to_string()));

        let files = storage.list(FileKind::User, Some(owner)).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, stored.file_name);
    }

    #[tokio::test]
    async fn test_list_unwritten_scope_is_empty() {
        let storage = temp_storage();
        let files = storage
            .list(FileKind::User, Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn test_user_scope_requires_owner() {
        let storage = temp_storage();
        let result = storage.store(FileKind::User, None, "a.txt", b"x").await;
        assert!(matches!(result, Err(FileStorageError::MissingOwner)));
    }

    #[tokio::test]
    async fn test_replace_requires_existing_file() {
        let storage = temp_storage();

        let missing = storage
            .replace(FileKind::Organization, None, "logo.svg", b"svg")
            .await;
        assert!(matches!(missing, Err(FileStorageError::NotFound(_))));

        let stored = storage
            .store(FileKind::Organization, None, "logo.svg", b"old")
            .await
            .unwrap();
        let replaced = storage
            .replace(FileKind::Organization, None, &stored.file_name, b"new")
            .await
            .unwrap();
        assert_eq!(replaced.file_name, stored.file_name);
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let storage = temp_storage();

        let stored = storage
            .store(FileKind::Organization, None, "doc.pdf", b"pdf")
            .await
            .unwrap();

        storage
            .delete(FileKind::Organization, None, &stored.file_name)
            .await
            .unwrap();

        let again = storage
            .delete(FileKind::Organization, None, &stored.file_name)
            .await;
        assert!(matches!(again, Err(FileStorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_traversal_names_rejected() {
        let storage = temp_storage();

        for name in ["../../etc/passwd", "a/b.txt", "..", ".hidden", ""] {
            let result = storage
                .delete(FileKind::Organization, None, name)
                .await;
            assert!(
                matches!(result, Err(FileStorageError::InvalidFileName(_))),
                "accepted {name:?}"
            );
        }
    }
}
