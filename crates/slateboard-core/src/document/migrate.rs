//! Version upgrades for stored documents.
//!
//! Each migration takes the raw JSON of one version and returns the next.
//! They run on `serde_json::Value` so that older layouts never need Rust
//! types of their own.

use super::{CURRENT_VERSION, DOCUMENT_TYPE};
use crate::error::{DocumentError, DocumentResult};
use serde_json::{Map, Value, json};
use uuid::Uuid;

pub type Migration = fn(Value) -> Value;

/// `MIGRATIONS[n]` upgrades version `n` to `n + 1`.
pub const MIGRATIONS: [Migration; CURRENT_VERSION as usize] = [v0_to_v1, v1_to_v2, v2_to_v3];

/// Upgrade `value`, stored at version `from`, to [`CURRENT_VERSION`].
pub fn migrate(value: Value, from: u64) -> DocumentResult<Value> {
    if from > u64::from(CURRENT_VERSION) {
        return Err(DocumentError::UnsupportedVersion {
            found: from,
            supported: CURRENT_VERSION,
        });
    }
    let mut value = MIGRATIONS[from as usize..]
        .iter()
        .enumerate()
        .fold(value, |acc, (step, migration)| {
            log::info!("Migrating document from version {}", from as usize + step);
            migration(acc)
        });
    if let Some(object) = value.as_object_mut() {
        object.insert("version".into(), json!(CURRENT_VERSION));
    }
    Ok(value)
}

fn elements_mut(value: &mut Value) -> Option<&mut Vec<Value>> {
    value.get_mut("elements").and_then(Value::as_array_mut)
}

fn number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object.get(key).and_then(Value::as_f64)
}

/// Position/size boxes become corner frames; opacity goes from percent to a fraction.
fn v0_to_v1(mut value: Value) -> Value {
    if let Some(elements) = elements_mut(&mut value) {
        for element in elements.iter_mut().filter_map(Value::as_object_mut) {
            if let (Some(x), Some(y), Some(w), Some(h)) = (
                number(element, "x"),
                number(element, "y"),
                number(element, "width"),
                number(element, "height"),
            ) {
                for key in ["x", "y", "width", "height"] {
                    element.remove(key);
                }
                element.insert("x1".into(), json!(x));
                element.insert("y1".into(), json!(y));
                element.insert("x2".into(), json!(x + w));
                element.insert("y2".into(), json!(y + h));
            }
            if let Some(opacity) = number(element, "opacity") {
                element.insert("opacity".into(), json!((opacity / 100.0).clamp(0.0, 1.0)));
            }
        }
    }
    value
}

/// Stacking order made explicit; the stored list is front to back.
fn v1_to_v2(mut value: Value) -> Value {
    if let Some(elements) = elements_mut(&mut value) {
        let count = elements.len();
        for (index, element) in elements.iter_mut().enumerate() {
            if let Some(object) = element.as_object_mut() {
                object
                    .entry("order")
                    .or_insert_with(|| json!((count - 1 - index) as i64));
            }
        }
    }
    value
}

/// Elements move into a single page; asset and app-state tables become mandatory.
fn v2_to_v3(mut value: Value) -> Value {
    let Some(object) = value.as_object_mut() else {
        return value;
    };
    let elements = object.remove("elements").unwrap_or_else(|| json!([]));
    if !object.contains_key("pages") {
        object.insert(
            "pages".into(),
            json!([{ "id": Uuid::new_v4(), "title": "Page 1", "elements": elements }]),
        );
    }
    object.entry("type").or_insert_with(|| json!(DOCUMENT_TYPE));
    object.entry("assets").or_insert_with(|| json!({}));
    object.entry("appState").or_insert_with(|| json!({}));
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v0_document_reaches_current() {
        let v0 = json!({
            "title": "old",
            "elements": [
                { "id": Uuid::new_v4(), "type": "shape", "shape": "rectangle",
                  "x": 10.0, "y": 20.0, "width": 30.0, "height": 40.0, "opacity": 50 },
                { "id": Uuid::new_v4(), "type": "sticker", "sticker": "star",
                  "x": 0.0, "y": 0.0, "width": 5.0, "height": 5.0 }
            ]
        });
        let migrated = migrate(v0, 0).unwrap();
        assert_eq!(migrated["version"], json!(CURRENT_VERSION));
        assert_eq!(migrated["type"], json!(DOCUMENT_TYPE));
        assert!(migrated.get("elements").is_none());
        let first = &migrated["pages"][0]["elements"][0];
        assert_eq!(first["x2"], json!(40.0));
        assert_eq!(first["y2"], json!(60.0));
        assert_eq!(first["opacity"], json!(0.5));
        assert_eq!(first["order"], json!(1));
        assert_eq!(migrated["pages"][0]["elements"][1]["order"], json!(0));
        assert!(migrated["assets"].is_object());
        assert!(migrated["appState"].is_object());
    }

    #[test]
    fn test_v2_keeps_existing_order() {
        let v2 = json!({ "elements": [ { "order": 7 } ] });
        let migrated = migrate(v2, 2).unwrap();
        assert_eq!(migrated["pages"][0]["elements"][0]["order"], json!(7));
    }

    #[test]
    fn test_current_version_is_untouched() {
        let v3 = json!({ "type": "whiteboard", "version": 3, "pages": [] });
        assert_eq!(migrate(v3.clone(), 3).unwrap(), v3);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let err = migrate(json!({ "version": 9 }), 9).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedVersion { found: 9, .. }));
    }
}
