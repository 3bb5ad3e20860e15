//! In-process storage, used by tests and by hosts without a filesystem.

use super::{BoxFuture, LoadedDocument, Storage, StorageError, StorageResult};
use crate::document::{Document, import_document};
use crate::settings::EditorSettings;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Boards kept as serialized JSON, so loading goes through the same import
/// pipeline as a file.
#[derive(Default)]
pub struct MemoryStorage {
    boards: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `json` under `id` as-is.
    pub fn insert_raw(&self, id: &str, json: impl Into<String>) -> StorageResult<()> {
        self.write()?.insert(id.to_string(), json.into());
        Ok(())
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, BTreeMap<String, String>>> {
        self.boards.read().map_err(|_| StorageError::Poisoned)
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, BTreeMap<String, String>>> {
        self.boards.write().map_err(|_| StorageError::Poisoned)
    }
}

impl Storage for MemoryStorage {
    fn save(
        &self,
        id: &str,
        document: &Document,
        settings: &EditorSettings,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document.to_json(settings);
        Box::pin(async move {
            let json = json?;
            self.write()?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LoadedDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let json = self.read()?.get(&id).cloned();
            let json = json.ok_or(StorageError::NotFound(id))?;
            Ok(import_document(&json)?)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write()?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read()?.keys().cloned().collect()) })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&id)) })
    }
}
