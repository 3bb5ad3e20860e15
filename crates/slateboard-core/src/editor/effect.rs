//! Effect descriptors returned to the host after each event.

use super::state::Tool;
use crate::elements::{ElementId, Frame};
use crate::error::ClipboardError;
use crate::snap::SnapEdge;
use serde::{Deserialize, Serialize};

/// Something the host should react to.
///
/// Notifications are idempotent; the host may coalesce repeated ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "effect")]
pub enum Effect {
    /// A committed mutation (create, update, remove, undo or redo).
    DocumentChanged,
    SelectionChanged,
    ToolChanged { tool: Tool },
    /// Route further pointer events to the editor until released.
    CapturePointer,
    ReleasePointer,
    /// Alignment guides to draw; empty clears them.
    GuidesChanged { guides: Vec<SnapEdge> },
    /// Marquee rectangle in canvas space, `None` when it goes away.
    MarqueeChanged { area: Option<Frame> },
    /// Camera or page switch; everything must be redrawn.
    ViewChanged,
    TextEditStarted { id: ElementId },
    TextEditEnded { id: ElementId },
    PasteRejected { reason: ClipboardError },
}

/// Ordered effect list that drops duplicates.
#[derive(Debug, Default)]
pub(crate) struct Effects(Vec<Effect>);

impl Effects {
    pub fn push(&mut self, effect: Effect) {
        if !self.0.contains(&effect) {
            self.0.push(effect);
        }
    }

    pub fn document_changed(&mut self) {
        self.push(Effect::DocumentChanged);
    }

    pub fn selection_changed(&mut self) {
        self.push(Effect::SelectionChanged);
    }

    /// Push `SelectionChanged` when `changed` is true.
    pub fn selection_if(&mut self, changed: bool) {
        if changed {
            self.selection_changed();
        }
    }

    pub fn into_vec(self) -> Vec<Effect> {
        self.0
    }
}
