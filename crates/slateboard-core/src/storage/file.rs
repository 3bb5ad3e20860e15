//! Boards stored as JSON files in one directory.

use super::{BoxFuture, LoadedDocument, Storage, StorageError, StorageResult};
use crate::document::{Document, import_document};
use crate::settings::EditorSettings;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory.
    pub fn new(root: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&root).map_err(StorageError::io("create", &root))?;
        Ok(Self { root })
    }

    /// Storage in the user's data directory, e.g.
    /// `~/.local/share/slateboard/boards/` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("slateboard").join("boards"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids become file names; anything outside `[A-Za-z0-9_-]` is replaced.
    fn path_for(&self, id: &str) -> PathBuf {
        let stem: String = id
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.root.join(stem).with_extension(EXTENSION)
    }
}

impl Storage for FileStorage {
    fn save(
        &self,
        id: &str,
        document: &Document,
        settings: &EditorSettings,
    ) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(id);
        let json = document.to_json(settings);

        Box::pin(async move {
            let json = json?;
            // a half-written file must never replace a good one
            let staging = path.with_extension("json.partial");
            fs::write(&staging, json).map_err(StorageError::io("write", &staging))?;
            fs::rename(&staging, &path).map_err(StorageError::io("replace", &path))?;
            log::info!("Saved board to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<LoadedDocument>> {
        let path = self.path_for(id);
        let id = id.to_string();

        Box::pin(async move {
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound(id)),
                Err(e) => return Err(StorageError::io("read", &path)(e)),
            };
            let loaded = import_document(&json).inspect_err(|e| {
                log::warn!("Rejected stored board {}: {e}", path.display());
            })?;
            log::info!("Loaded board from {}", path.display());
            Ok(loaded)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(id);

        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    Err(StorageError::io("delete", &path)(e))
                }
                _ => Ok(()),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = fs::read_dir(&self.root).map_err(StorageError::io("list", &self.root))?;
            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
                .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.path_for(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}
