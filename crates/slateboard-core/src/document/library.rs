//! Reusable element libraries.

use super::check_kind;
use crate::elements::{Element, duplicate_elements, elements_bounds};
use crate::error::{DocumentError, DocumentResult};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

pub const LIBRARY_TYPE: &str = "library";
pub const LIBRARY_VERSION: u32 = 1;

/// A named set of elements that can be dropped onto a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl LibraryItem {
    pub fn new(name: impl Into<String>, elements: &[Element]) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            elements: elements.iter().map(Element::snapshot).collect(),
        }
    }

    /// Fresh copies of the item's elements, centered on `center`.
    pub fn instantiate(&self, center: Point) -> Vec<Element> {
        let Some(bounds) = elements_bounds(&self.elements) else {
            return Vec::new();
        };
        duplicate_elements(&self.elements, center - bounds.center())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryCollection {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
}

/// Serialized library: items grouped into collections instead of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub version: u32,
    #[serde(default)]
    pub items: Vec<LibraryItem>,
    #[serde(default)]
    pub collections: Vec<LibraryCollection>,
}

impl Default for LibraryFile {
    fn default() -> Self {
        Self {
            kind: LIBRARY_TYPE.to_string(),
            version: LIBRARY_VERSION,
            items: Vec::new(),
            collections: Vec::new(),
        }
    }
}

impl LibraryFile {
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        check_kind(&value, LIBRARY_TYPE)?;
        let version = value.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version > u64::from(LIBRARY_VERSION) {
            return Err(DocumentError::UnsupportedVersion {
                found: version,
                supported: LIBRARY_VERSION,
            });
        }
        let mut library: LibraryFile = serde_json::from_value(value)?;
        library.version = LIBRARY_VERSION;

        let known: HashSet<Uuid> = library.items.iter().map(|item| item.id).collect();
        for collection in &mut library.collections {
            let before = collection.item_ids.len();
            collection.item_ids.retain(|id| known.contains(id));
            if collection.item_ids.len() != before {
                log::warn!(
                    "Collection '{}' referenced {} missing item(s)",
                    collection.name,
                    before - collection.item_ids.len()
                );
            }
        }
        for element in library.items.iter_mut().flat_map(|i| i.elements.iter_mut()) {
            element.frame.normalize();
            element.selected = false;
        }
        Ok(library)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add an item built from `elements`, optionally filing it in a collection.
    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        elements: &[Element],
        collection: Option<Uuid>,
    ) -> Uuid {
        let item = LibraryItem::new(name, elements);
        let id = item.id;
        self.items.push(item);
        if let Some(target) = collection {
            if let Some(c) = self.collections.iter_mut().find(|c| c.id == target) {
                c.item_ids.push(id);
            }
        }
        id
    }

    pub fn item(&self, id: Uuid) -> Option<&LibraryItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementDefaults, ElementKind, ElementType, Frame};

    fn rect(x: f64) -> Element {
        Element::new(
            ElementKind::initialize(ElementType::Rectangle, &ElementDefaults::default()),
            Frame::new(x, 0.0, x + 10.0, 10.0),
        )
    }

    #[test]
    fn test_roundtrip_and_dangling_collection_ids() {
        let mut library = LibraryFile::default();
        let collection = Uuid::new_v4();
        library.collections.push(LibraryCollection {
            id: collection,
            name: "shapes".into(),
            item_ids: vec![Uuid::new_v4()],
        });
        let item = library.add_item("pair", &[rect(0.0), rect(20.0)], Some(collection));

        let loaded = LibraryFile::from_json(&library.to_json().unwrap()).unwrap();
        assert_eq!(loaded.collections[0].item_ids, vec![item]);
        assert_eq!(loaded.item(item).unwrap().elements.len(), 2);
    }

    #[test]
    fn test_document_is_not_a_library() {
        let err = LibraryFile::from_json(r#"{"type": "whiteboard", "version": 3}"#).unwrap_err();
        assert!(matches!(err, DocumentError::WrongKind { .. }));
    }

    #[test]
    fn test_instantiate_centers_fresh_copies() {
        let source = [rect(0.0), rect(20.0)];
        let item = LibraryItem::new("pair", &source);
        let placed = item.instantiate(Point::new(100.0, 100.0));
        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|e| source.iter().all(|s| s.id() != e.id())));
        let bounds = elements_bounds(&placed).unwrap();
        assert!((bounds.center().x - 100.0).abs() < 1e-9);
        assert!((bounds.center().y - 100.0).abs() < 1e-9);
    }
}
