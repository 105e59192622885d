// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! File store implementations.
//!
//! `LocalFileStore` writes attachments under
//! `<root>/applications/<application-id>/`, the layout the portal has always
//! used on disk. `InMemoryFileStore` backs tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::application::ApplicationId;
use crate::domain::storage::{FileStore, FileStoreError};

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn application_dir(&self, application_id: ApplicationId) -> PathBuf {
        self.root.join("applications").join(application_id.to_string())
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        application_id: ApplicationId,
        file_name: &str,
        contents: &[u8],
    ) -> Result<String, FileStoreError> {
        let dir = self.application_dir(application_id);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(path.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) -> Result<(), FileStoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// HashMap-backed store for tests and development.
#[derive(Clone, Default)]
pub struct InMemoryFileStore {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_count(&self) -> usize {
        self.files.read().unwrap().len()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn store(
        &self,
        application_id: ApplicationId,
        file_name: &str,
        contents: &[u8],
    ) -> Result<String, FileStoreError> {
        let path = format!("applications/{}/{}", application_id, file_name);
        self.files
            .write()
            .unwrap()
            .insert(path.clone(), contents.to_vec());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), FileStoreError> {
        self.files.write().unwrap().remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_store_writes_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let id = ApplicationId::new();

        let path = store.store(id, "irb_notice_x.pdf", b"%PDF-").await.unwrap();
        assert!(store.exists(&path).await);

        store.remove(&path).await.unwrap();
        assert!(!store.exists(&path).await);

        // Removing again is not an error.
        store.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryFileStore::new();
        let id = ApplicationId::new();
        let path = store.store(id, "plan.pdf", b"plan").await.unwrap();
        assert!(store.exists(&path).await);
        assert_eq!(store.file_count(), 1);
        store.remove(&path).await.unwrap();
        assert_eq!(store.file_count(), 0);
    }
}
