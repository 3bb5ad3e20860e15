//! Error types shared across the crate.

use crate::elements::{AssetId, ElementId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while importing or exporting documents and libraries.
///
/// An import that fails with any of these leaves the live document untouched.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a `{expected}` file, found `{found}`")]
    WrongKind { expected: &'static str, found: String },
    #[error("document version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u32 },
    #[error("element id {0} appears more than once")]
    DuplicateId(ElementId),
    #[error("asset `{0}` could not be decoded")]
    AssetDecode(AssetId),
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Reasons a paste was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipboardError {
    #[error("clipboard access was denied")]
    Denied,
    #[error("unsupported clipboard content: {0}")]
    Unsupported(String),
    #[error("clipboard is empty")]
    Empty,
}

/// Errors from editor operations that can fail outright.
///
/// Gestures never fail; input that does not apply is ignored.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("page {index} does not exist (document has {count})")]
    PageOutOfRange { index: usize, count: usize },
}

pub type EditorResult<T> = Result<T, EditorError>;
