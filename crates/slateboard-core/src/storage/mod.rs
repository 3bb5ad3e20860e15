//! Storage abstraction for persistence.
//!
//! Backends store the document file as JSON. Loading always runs the full
//! import pipeline, so a stored document from an older build is migrated
//! and validated the same way as an imported one.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::Document;
use crate::error::DocumentError;
use crate::settings::EditorSettings;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No stored board named {0}")]
    NotFound(String),
    #[error("Stored board is invalid: {0}")]
    Document(#[from] DocumentError),
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A writer panicked while holding the store.
    #[error("Storage is poisoned")]
    Poisoned,
}

impl StorageError {
    pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A loaded document together with the settings saved in its app state.
pub type LoadedDocument = (Document, EditorSettings);

/// Trait for document storage backends.
///
/// Requests are asynchronous; the editor applies a loaded document in a
/// later synchronous step and never mutates anything while one is pending.
pub trait Storage: Send + Sync {
    /// Save a document with the settings to restore alongside it.
    fn save(
        &self,
        id: &str,
        document: &Document,
        settings: &EditorSettings,
    ) -> BoxFuture<'_, StorageResult<()>>;

    /// Load and import a document.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LoadedDocument>>;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
