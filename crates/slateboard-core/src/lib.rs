//! Slateboard Core Library
//!
//! Platform-agnostic engine for the Slateboard whiteboard: the element model,
//! the pointer/keyboard gesture state machine, undo/redo history with
//! coalescing, alignment snapping, grouping, and document persistence.
//!
//! Rendering is not part of this crate. A host feeds [`editor::InputEvent`]s
//! into an [`Editor`] and reacts to the returned [`editor::Effect`]s.

pub mod camera;
pub mod document;
pub mod editor;
pub mod elements;
pub mod error;
pub mod handles;
pub mod history;
pub mod metrics;
pub mod page;
pub mod selection;
pub mod settings;
pub mod snap;
pub mod storage;

pub use camera::Camera;
pub use document::{Document, DocumentFile, LibraryFile, CURRENT_VERSION};
pub use editor::{ClipboardPayload, Command, Editor, Effect, GestureState, InputEvent, Key, Modifiers, Tool};
pub use elements::{Element, ElementId, ElementKind, ElementType, Frame, GroupId};
pub use error::{ClipboardError, DocumentError, DocumentResult, EditorError, EditorResult};
pub use handles::{Corner, Edge, Handle, HandleKind};
pub use history::{EntryKind, History, HistoryEntry, MAX_HISTORY};
pub use metrics::{ApproximateMetrics, TextMetrics};
pub use page::{ElementList, Page, PageId};
pub use settings::EditorSettings;
pub use snap::{snap_to_grid, SnapAxis, SnapEdge, SnapEngine, GRID_SIZE};
