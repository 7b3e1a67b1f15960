//! Storage for uploaded documents.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use study_core::model::{ModuleId, StoredFile};
use url::Url;

use crate::error::FileStoreError;

const RANDOM_NAME_LEN: usize = 16;

/// Somewhere uploaded documents live and can be fetched from by URL.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` for a module, keeping the extension of `file_name`.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError` if the name is unusable or the write fails.
    async fn store(
        &self,
        module_id: ModuleId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, FileStoreError>;

    /// Remove a previously stored file. Removing a missing file succeeds.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError` if the path is invalid or removal fails.
    async fn delete(&self, path: &str) -> Result<(), FileStoreError>;
}

/// File store backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
    public_base: Url,
}

impl LocalFileStore {
    /// Files are written below `root` and published below `public_base`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, mut public_base: Url) -> Self {
        if !public_base.path().ends_with('/') {
            let path = format!("{}/", public_base.path());
            public_base.set_path(&path);
        }
        Self {
            root: root.into(),
            public_base,
        }
    }

    /// Publishes files as `file://` URLs pointing into `root`.
    ///
    /// # Errors
    ///
    /// Returns `FileStoreError` if `root` cannot be made absolute.
    pub fn with_file_urls(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = std::path::absolute(root.into())?;
        let base = Url::from_directory_path(&root)
            .map_err(|()| FileStoreError::InvalidPath(root.display().to_string()))?;
        Ok(Self::new(root, base))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, FileStoreError> {
        let path = Path::new(relative);
        let clean = path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if relative.is_empty() || !clean {
            return Err(FileStoreError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

fn random_name() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_NAME_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        module_id: ModuleId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, FileStoreError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(FileStoreError::InvalidName(file_name.to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
        let name = match extension {
            Some(ext) => format!("{}.{}", random_name(), ext.to_ascii_lowercase()),
            None => random_name(),
        };
        let relative = format!("modules/{module_id}/{name}");

        let full = self.resolve(&relative)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        let url = self.public_base.join(&relative)?;
        tracing::debug!(%module_id, path = %relative, size = bytes.len(), "stored upload");
        Ok(StoredFile::new(relative, url)?)
    }

    async fn delete(&self, path: &str) -> Result<(), FileStoreError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path, "stored file already gone");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_keeps_extension_under_module_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalFileStore::new(
            dir.path(),
            Url::parse("http://localhost:8080/uploads").unwrap(),
        );
        let module_id = ModuleId::generate();

        let stored = store
            .store(module_id, "Lecture 3.PDF", b"%PDF-1.4")
            .await
            .unwrap();

        let prefix = format!("modules/{module_id}/");
        assert!(stored.path().starts_with(&prefix));
        assert!(stored.path().ends_with(".pdf"));
        assert_eq!(
            stored.url().as_str(),
            format!("http://localhost:8080/uploads/{}", stored.path())
        );
        let written = std::fs::read(dir.path().join(stored.path())).unwrap();
        assert_eq!(written, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_rejects_escapes() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalFileStore::with_file_urls(dir.path()).unwrap();
        let stored = store
            .store(ModuleId::generate(), "notes", b"text")
            .await
            .unwrap();
        assert_eq!(stored.url().scheme(), "file");

        store.delete(stored.path()).await.unwrap();
        store.delete(stored.path()).await.unwrap();
        assert!(!dir.path().join(stored.path()).exists());

        assert!(matches!(
            store.delete("../outside.pdf").await.unwrap_err(),
            FileStoreError::InvalidPath(_)
        ));
    }

    #[tokio::test]
    async fn blank_file_name_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalFileStore::with_file_urls(dir.path()).unwrap();
        let err = store
            .store(ModuleId::generate(), "   ", b"")
            .await
            .unwrap_err();
        assert!(matches!(err, FileStoreError::InvalidName(_)));
    }
}
