//! Documents: the pages being edited and their on-disk JSON form.
//!
//! A [`Document`] is the live, editable value. A [`DocumentFile`] is what is
//! written to and read from storage. Loading always goes through
//! [`import_document`], which migrates, validates and resolves assets before
//! anything is handed to the editor, so a failed load never touches the
//! document being edited.

mod assets;
mod library;
mod migrate;

pub use assets::{AssetRecord, referenced_assets, resolve_assets};
pub use library::{LIBRARY_TYPE, LIBRARY_VERSION, LibraryCollection, LibraryFile, LibraryItem};
pub use migrate::{MIGRATIONS, Migration, migrate};

use crate::camera::Camera;
use crate::elements::{AssetId, Element, SerializableColor};
use crate::error::{DocumentError, DocumentResult};
use crate::history::History;
use crate::page::{ElementList, Page, PageId};
use crate::settings::EditorSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 3;

/// Value of the `type` member of a document file.
pub const DOCUMENT_TYPE: &str = "whiteboard";

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn default_background() -> SerializableColor {
    SerializableColor::white()
}

/// Reject a file whose `type` names something other than `expected`.
///
/// A missing `type` is accepted; very old files did not write one.
pub(crate) fn check_kind(value: &Value, expected: &'static str) -> DocumentResult<()> {
    match value.get("type") {
        None => Ok(()),
        Some(Value::String(kind)) if kind == expected => Ok(()),
        Some(Value::String(kind)) => Err(DocumentError::WrongKind {
            expected,
            found: kind.clone(),
        }),
        Some(other) => Err(DocumentError::WrongKind {
            expected,
            found: other.to_string(),
        }),
    }
}

/// One page as stored on disk. Elements are listed front to back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub id: PageId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub camera: Camera,
}

/// Editor state saved alongside the pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub settings: EditorSettings,
    pub current_page: usize,
}

/// Serialized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
    #[serde(default)]
    pub assets: BTreeMap<AssetId, AssetRecord>,
    #[serde(default = "default_background")]
    pub background: SerializableColor,
    #[serde(default)]
    pub app_state: AppState,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// The document being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    pub created_at: u64,
    pub updated_at: u64,
    /// Never empty.
    pages: Vec<Page>,
    current_page: usize,
    pub assets: BTreeMap<AssetId, AssetRecord>,
    pub background: SerializableColor,
    pub metadata: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            title: title.into(),
            created_at: now,
            updated_at: now,
            pages: vec![Page::new("Page 1")],
            current_page: 0,
            assets: BTreeMap::new(),
            background: default_background(),
            metadata: Map::new(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.pages[self.current_page]
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current_page]
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page
    }

    /// Append a page and make it current. Returns its index.
    pub fn add_page(&mut self, title: impl Into<String>) -> usize {
        self.pages.push(Page::new(title));
        self.current_page = self.pages.len() - 1;
        self.current_page
    }

    /// Switch pages. Out-of-range indices are ignored.
    pub fn set_current_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() || index == self.current_page {
            return false;
        }
        self.current_page = index;
        true
    }

    /// Store an asset and return its id.
    pub fn add_asset(&mut self, asset: AssetRecord) -> AssetId {
        let id = asset.id.clone();
        self.assets.insert(id.clone(), asset);
        id
    }

    /// Mark the document as modified now.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// Build the file form. Only assets referenced by an image are included.
    pub fn to_file(&self, settings: &EditorSettings) -> DocumentFile {
        let used = referenced_assets(self.pages.iter().flat_map(|p| p.elements.iter()));
        let assets = self
            .assets
            .iter()
            .filter(|(id, _)| used.contains(*id))
            .map(|(id, asset)| (id.clone(), asset.clone()))
            .collect();

        DocumentFile {
            kind: DOCUMENT_TYPE.to_string(),
            version: CURRENT_VERSION,
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            pages: self
                .pages
                .iter()
                .map(|page| PageRecord {
                    id: page.id,
                    title: page.title.clone(),
                    elements: page.elements.iter().map(Element::snapshot).collect(),
                    camera: page.camera,
                })
                .collect(),
            assets,
            background: self.background,
            app_state: AppState {
                settings: settings.clone(),
                current_page: self.current_page,
            },
            metadata: self.metadata.clone(),
        }
    }

    pub fn to_json(&self, settings: &EditorSettings) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file(settings))?)
    }

    /// Validate a deserialized file and build the live document from it.
    pub fn from_file(mut file: DocumentFile) -> DocumentResult<(Self, EditorSettings)> {
        validate_pages(&mut file.pages)?;
        resolve_assets(&mut file.pages, &mut file.assets);

        let mut pages: Vec<Page> = file
            .pages
            .into_iter()
            .map(|record| Page {
                id: record.id,
                title: record.title,
                elements: ElementList::from_elements(record.elements),
                camera: record.camera,
                history: History::new(),
                active_group: None,
            })
            .collect();
        if pages.is_empty() {
            pages.push(Page::new("Page 1"));
        }
        let current_page = file.app_state.current_page.min(pages.len() - 1);

        let document = Self {
            title: file.title,
            created_at: file.created_at,
            updated_at: file.updated_at,
            pages,
            current_page,
            assets: file.assets,
            background: file.background,
            metadata: file.metadata,
        };
        Ok((document, file.app_state.settings))
    }

    /// Parse, migrate and validate a document file.
    pub fn from_json(json: &str) -> DocumentResult<(Self, EditorSettings)> {
        import_document(json)
    }
}

/// Full import pipeline: parse, check the type, migrate, deserialize,
/// validate, resolve assets and build pages.
pub fn import_document(json: &str) -> DocumentResult<(Document, EditorSettings)> {
    let value: Value = serde_json::from_str(json)?;
    check_kind(&value, DOCUMENT_TYPE)?;
    let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
    let value = migrate(value, version)?;
    let file: DocumentFile = serde_json::from_value(value)?;
    let (document, settings) = Document::from_file(file)?;
    log::info!(
        "Loaded document '{}' with {} page(s)",
        document.title,
        document.pages.len()
    );
    Ok((document, settings))
}

fn validate_pages(pages: &mut [PageRecord]) -> DocumentResult<()> {
    let mut seen = HashSet::new();
    for element in pages.iter_mut().flat_map(|p| p.elements.iter_mut()) {
        if !seen.insert(element.id()) {
            return Err(DocumentError::DuplicateId(element.id()));
        }
        element.frame.normalize();
        element.opacity = if element.opacity.is_nan() {
            1.0
        } else {
            element.opacity.clamp(0.0, 1.0)
        };
        element.selected = false;
    }
    Ok(())
}
