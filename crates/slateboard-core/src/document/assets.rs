//! Binary assets (image data) stored alongside a document.

use super::PageRecord;
use crate::elements::{AssetId, ElementKind};
use crate::error::{DocumentError, DocumentResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An embedded file, keyed by id in the document's asset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: AssetId,
    pub mime_type: String,
    pub data_base64: String,
    /// Natural size in pixels, when known.
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl AssetRecord {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8], width: f64, height: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mime_type: mime_type.into(),
            data_base64: STANDARD.encode(bytes),
            width,
            height,
        }
    }

    pub fn decode(&self) -> DocumentResult<Vec<u8>> {
        STANDARD
            .decode(self.data_base64.as_bytes())
            .map_err(|_| DocumentError::AssetDecode(self.id.clone()))
    }
}

/// Asset ids referenced by image elements.
pub fn referenced_assets<'a>(
    elements: impl IntoIterator<Item = &'a crate::elements::Element>,
) -> BTreeSet<AssetId> {
    elements
        .into_iter()
        .filter_map(|e| match &e.kind {
            ElementKind::Image(image) => image.asset_id.clone(),
            _ => None,
        })
        .collect()
}

/// Drop undecodable assets and detach images whose asset is unavailable.
///
/// An unresolved image keeps its frame and loses its `asset_id`.
pub fn resolve_assets(pages: &mut [PageRecord], assets: &mut BTreeMap<AssetId, AssetRecord>) {
    assets.retain(|key, record| {
        if record.id != *key {
            log::warn!("Asset key {key} does not match record id {}, using the key", record.id);
            record.id = key.clone();
        }
        match record.decode() {
            Ok(_) => true,
            Err(err) => {
                log::warn!("Dropping asset: {err}");
                false
            }
        }
    });

    for page in pages {
        for element in &mut page.elements {
            let element_id = element.id();
            if let ElementKind::Image(image) = &mut element.kind {
                if let Some(asset_id) = &image.asset_id {
                    if !assets.contains_key(asset_id) {
                        log::warn!("Image {element_id} references missing asset {asset_id}");
                        image.asset_id = None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, Frame, ImageData};
    use uuid::Uuid;

    fn image_page(asset: Option<&str>) -> PageRecord {
        let data = match asset {
            Some(id) => ImageData::new(id.to_string()),
            None => ImageData::default(),
        };
        PageRecord {
            id: Uuid::new_v4(),
            title: "p".into(),
            elements: vec![Element::new(ElementKind::Image(data), Frame::new(0.0, 0.0, 10.0, 10.0))],
            camera: Default::default(),
        }
    }

    #[test]
    fn test_roundtrip_bytes() {
        let record = AssetRecord::from_bytes("image/png", &[1, 2, 3], 1.0, 1.0);
        assert_eq!(record.decode().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_asset_unresolves_image() {
        let mut pages = vec![image_page(Some("nope"))];
        let mut assets = BTreeMap::new();
        resolve_assets(&mut pages, &mut assets);
        match &pages[0].elements[0].kind {
            ElementKind::Image(image) => assert!(image.asset_id.is_none()),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_undecodable_asset_is_dropped() {
        let mut pages = vec![image_page(Some("bad"))];
        let mut assets = BTreeMap::new();
        assets.insert(
            "bad".to_string(),
            AssetRecord {
                id: "bad".into(),
                mime_type: "image/png".into(),
                data_base64: "***not base64***".into(),
                width: 0.0,
                height: 0.0,
            },
        );
        resolve_assets(&mut pages, &mut assets);
        assert!(assets.is_empty());
        assert_eq!(referenced_assets(&pages[0].elements), BTreeSet::new());
    }

    #[test]
    fn test_valid_asset_is_kept() {
        let record = AssetRecord::from_bytes("image/png", b"png", 4.0, 4.0);
        let mut pages = vec![image_page(Some(&record.id))];
        let mut assets = BTreeMap::from([(record.id.clone(), record.clone())]);
        resolve_assets(&mut pages, &mut assets);
        assert_eq!(assets.len(), 1);
        assert!(referenced_assets(&pages[0].elements).contains(&record.id));
    }
}
