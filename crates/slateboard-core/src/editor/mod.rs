//! The interactive editor: a gesture state machine over a [`Document`].
//!
//! [`Editor`] is a plain, serializable value. Each call to
//! [`Editor::handle_event`] runs one input event to completion and returns
//! the [`Effect`]s the host should act on (repaint, capture the pointer,
//! show guides, open a text box). Nothing is mutated between events, and
//! the text-metrics capability is passed in by the caller rather than held.

mod actions;
mod effect;
mod event;
mod gesture;
mod keyboard;
mod state;
mod text_edit;

pub use effect::Effect;
pub use event::{ClipboardPayload, Command, InputEvent, Key, Modifiers};
pub use state::{GestureState, Tool};

use crate::document::Document;
use crate::elements::ElementDefaults;
use crate::error::{DocumentResult, EditorError, EditorResult};
use crate::history::{EntryKind, HistoryEntry};
use crate::metrics::TextMetrics;
use crate::page::Page;
use crate::settings::EditorSettings;
use effect::Effects;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Editor state: the document plus everything needed to interpret input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editor {
    document: Document,
    pub settings: EditorSettings,
    /// Style given to newly created elements.
    pub defaults: ElementDefaults,
    tool: Tool,
    /// Tool to return to after a one-shot tool such as the eraser.
    previous_tool: Tool,
    gesture: GestureState,
    modifiers: Modifiers,
    /// Last pointer position in client coordinates.
    last_client: Point,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document, settings: EditorSettings) -> Self {
        Self {
            document,
            settings,
            ..Self::default()
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access for hosts that build content programmatically.
    /// Changes made here are not recorded in history.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn page(&self) -> &Page {
        self.document.page()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Replace the document with an imported one.
    ///
    /// The live document is only touched once the import has fully succeeded.
    pub fn load_json(&mut self, json: &str) -> EditorResult<Vec<Effect>> {
        let (document, settings) = Document::from_json(json)?;
        self.document = document;
        self.settings = settings;
        self.gesture = GestureState::Idle;
        Ok(vec![
            Effect::DocumentChanged,
            Effect::SelectionChanged,
            Effect::ViewChanged,
        ])
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        self.document.to_json(&self.settings)
    }

    /// Switch to page `index`, ending any text edit first.
    pub fn set_page(&mut self, index: usize) -> EditorResult<Vec<Effect>> {
        let count = self.document.pages().len();
        if index >= count {
            return Err(EditorError::PageOutOfRange { index, count });
        }
        let mut fx = Effects::default();
        self.switch_page(index, &mut fx);
        Ok(fx.into_vec())
    }

    /// Run one input event to completion.
    pub fn handle_event(&mut self, event: InputEvent, metrics: &dyn TextMetrics) -> Vec<Effect> {
        let mut fx = Effects::default();
        match event {
            InputEvent::PointerDown { client, modifiers } => {
                self.modifiers = modifiers;
                self.pointer_down(client, metrics, &mut fx);
            }
            InputEvent::PointerMove { client, modifiers } => {
                self.modifiers = modifiers;
                self.pointer_move(client, metrics, &mut fx);
            }
            InputEvent::PointerUp { client, modifiers } => {
                self.modifiers = modifiers;
                self.pointer_up(client, metrics, &mut fx);
            }
            InputEvent::PointerLeave => {
                let client = self.last_client;
                self.pointer_up(client, metrics, &mut fx);
            }
            InputEvent::KeyDown { key, modifiers } => {
                self.modifiers = modifiers;
                self.key_down(key, metrics, &mut fx);
            }
            InputEvent::KeyUp { modifiers, .. } => self.modifiers = modifiers,
            InputEvent::DoubleClick { client, modifiers } => {
                self.modifiers = modifiers;
                self.double_click(client, metrics, &mut fx);
            }
            InputEvent::TextInput { content } => self.text_input(&content, metrics),
            InputEvent::Blur => self.commit_text(&mut fx),
            InputEvent::Paste(payload) => self.paste(payload, metrics, &mut fx),
            InputEvent::Wheel {
                client,
                delta,
                modifiers,
            } => {
                self.modifiers = modifiers;
                self.wheel(client, delta, &mut fx);
            }
            InputEvent::SetTool { tool } => self.select_tool(tool, &mut fx),
            InputEvent::SetToolLock { locked } => self.settings.tool_lock = locked,
            InputEvent::Command(command) => self.run_command(command, metrics, &mut fx),
        }
        fx.into_vec()
    }

    fn canvas_point(&self, client: Point) -> Point {
        self.document.page().camera.client_to_canvas(client)
    }

    /// Record an applied change on the current page.
    fn commit(&mut self, mut entry: HistoryEntry, fx: &mut Effects) {
        if entry.is_empty() {
            return;
        }
        if entry.kind == EntryKind::Update {
            let followed = self.document.page_mut().elements.follow_bindings();
            entry = entry.with_knock_on(followed);
        }
        log::info!(
            "Committed {:?} of {} element(s)",
            entry.kind,
            entry.elements.len()
        );
        self.document.page_mut().record(entry);
        self.document.touch();
        fx.document_changed();
    }

    fn set_tool(&mut self, tool: Tool, fx: &mut Effects) {
        if tool == self.tool {
            return;
        }
        log::debug!("Tool {:?} -> {:?}", self.tool, tool);
        self.previous_tool = self.tool;
        self.tool = tool;
        fx.push(Effect::ToolChanged { tool });
    }

    fn select_tool(&mut self, tool: Tool, fx: &mut Effects) {
        self.commit_text(fx);
        if !self.gesture.is_idle() {
            log::debug!("Ignoring tool change during {}", self.gesture.name());
            return;
        }
        self.set_tool(tool, fx);
    }

    fn switch_page(&mut self, index: usize, fx: &mut Effects) {
        self.commit_text(fx);
        self.cancel_gesture(fx);
        if self.document.set_current_page(index) {
            fx.push(Effect::ViewChanged);
            fx.selection_changed();
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::elements::{Element, ElementId, ElementKind, ElementType, Frame};
    use crate::metrics::ApproximateMetrics;

    pub const METRICS: ApproximateMetrics = ApproximateMetrics;

    pub fn down(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
        down_with(editor, x, y, Modifiers::NONE)
    }

    pub fn down_with(editor: &mut Editor, x: f64, y: f64, modifiers: Modifiers) -> Vec<Effect> {
        editor.handle_event(
            InputEvent::PointerDown {
                client: Point::new(x, y),
                modifiers,
            },
            &METRICS,
        )
    }

    pub fn move_to(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
        move_with(editor, x, y, Modifiers::NONE)
    }

    pub fn move_with(editor: &mut Editor, x: f64, y: f64, modifiers: Modifiers) -> Vec<Effect> {
        editor.handle_event(
            InputEvent::PointerMove {
                client: Point::new(x, y),
                modifiers,
            },
            &METRICS,
        )
    }

    pub fn up(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
        up_with(editor, x, y, Modifiers::NONE)
    }

    pub fn up_with(editor: &mut Editor, x: f64, y: f64, modifiers: Modifiers) -> Vec<Effect> {
        editor.handle_event(
            InputEvent::PointerUp {
                client: Point::new(x, y),
                modifiers,
            },
            &METRICS,
        )
    }

    pub fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        down(editor, from.0, from.1);
        move_to(editor, to.0, to.1);
        up(editor, to.0, to.1);
    }

    pub fn key(editor: &mut Editor, key: Key, modifiers: Modifiers) -> Vec<Effect> {
        editor.handle_event(InputEvent::KeyDown { key, modifiers }, &METRICS)
    }

    pub fn command(editor: &mut Editor, command: Command) -> Vec<Effect> {
        editor.handle_event(InputEvent::Command(command), &METRICS)
    }

    pub fn set_tool(editor: &mut Editor, tool: Tool) {
        editor.handle_event(InputEvent::SetTool { tool }, &METRICS);
    }

    /// Put a committed rectangle on the current page without history.
    pub fn add_rect(editor: &mut Editor, x1: f64, y1: f64, x2: f64, y2: f64) -> ElementId {
        let page = editor.document_mut().page_mut();
        let mut element = Element::new(
            ElementKind::initialize(ElementType::Rectangle, &ElementDefaults::default()),
            Frame::new(x1, y1, x2, y2),
        );
        element.order = page.elements.next_order();
        let id = element.id();
        page.elements.insert(element);
        id
    }

    pub fn element(editor: &Editor, id: ElementId) -> &Element {
        editor.page().elements.get(id).expect("element exists")
    }

    pub fn history_len(editor: &Editor) -> usize {
        editor.page().history.len()
    }
}
