//! In-place text editing.
//!
//! Editing text never writes history while it is in progress. A freshly
//! created text element has no entry yet: it gets its CREATE when the edit
//! commits with content, and disappears without a trace otherwise. An
//! existing element gets one UPDATE (or REMOVE, when free text ends up
//! empty) covering the whole edit.

use super::effect::{Effect, Effects};
use super::state::GestureState;
use super::Editor;
use crate::elements::{ElementId, ElementType, HookContext};
use crate::history::HistoryEntry;
use crate::metrics::TextMetrics;
use crate::selection;

impl Editor {
    pub(super) fn begin_text_edit(&mut self, id: ElementId, created: bool, fx: &mut Effects) {
        let page = self.document.page_mut();
        let Some(element) = page.elements.get(id) else {
            return;
        };
        let original = (!created).then(|| element.snapshot());
        fx.selection_if(selection::select_only(page, &[id]));
        log::debug!("Editing text of {id}");
        self.gesture = GestureState::TextEditing {
            id,
            created,
            original,
        };
        fx.push(Effect::TextEditStarted { id });
    }

    /// Apply the editor's full content to the element being edited.
    pub(super) fn text_input(&mut self, content: &str, metrics: &dyn TextMetrics) {
        let GestureState::TextEditing { id, .. } = self.gesture else {
            log::debug!("Text input outside of text editing");
            return;
        };
        let ctx = HookContext::new(metrics, &self.settings);
        if let Some(element) = self.document.page_mut().elements.get_mut(id) {
            element.set_text_content(content, &ctx);
        }
    }

    /// Finish the current text edit, if any.
    pub(super) fn commit_text(&mut self, fx: &mut Effects) {
        if !self.gesture.is_text_editing() {
            return;
        }
        let GestureState::TextEditing {
            id,
            created,
            original,
        } = std::mem::take(&mut self.gesture)
        else {
            return;
        };
        fx.push(Effect::TextEditEnded { id });

        let page = self.document.page_mut();
        let Some(element) = page.elements.get(id).cloned() else {
            log::debug!("Edited element {id} is gone");
            return;
        };
        let empty = element.element_type() == ElementType::Text
            && element.text_content().map_or(true, |t| t.trim().is_empty());

        if created {
            if empty {
                page.elements.remove(id);
                fx.selection_changed();
                log::debug!("Dropped empty text {id}");
            } else {
                self.commit(HistoryEntry::create(&[element]), fx);
            }
            return;
        }

        let Some(original) = original else {
            return;
        };
        if empty {
            page.elements.remove(id);
            fx.selection_changed();
            self.commit(HistoryEntry::remove(&[original]), fx);
        } else if !element.same_content(&original) {
            self.commit(HistoryEntry::update([(original, element)]), fx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{Command, Effect, Editor, InputEvent, Key, Modifiers, Tool};
    use crate::elements::{ElementType, Frame};
    use crate::history::EntryKind;
    use kurbo::Point;

    fn double_click(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
        editor.handle_event(
            InputEvent::DoubleClick {
                client: Point::new(x, y),
                modifiers: Modifiers::NONE,
            },
            &METRICS,
        )
    }

    fn type_text(editor: &mut Editor, content: &str) {
        editor.handle_event(
            InputEvent::TextInput {
                content: content.to_string(),
            },
            &METRICS,
        );
    }

    #[test]
    fn test_abandoned_text_leaves_nothing() {
        let mut editor = Editor::new();
        let effects = double_click(&mut editor, 100.0, 100.0);
        assert!(effects.iter().any(|e| matches!(e, Effect::TextEditStarted { .. })));
        assert_eq!(editor.page().elements.len(), 1);

        let effects = key(&mut editor, Key::Escape, Modifiers::NONE);
        assert!(effects.iter().any(|e| matches!(e, Effect::TextEditEnded { .. })));
        assert!(editor.page().elements.is_empty());
        assert_eq!(history_len(&editor), 0);
    }

    #[test]
    fn test_abandoned_text_keeps_redo_branch() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        down(&mut editor, 10.0, 10.0);
        up(&mut editor, 10.0, 10.0);
        key(&mut editor, Key::Delete, Modifiers::NONE);
        command(&mut editor, Command::Undo);
        assert!(editor.page().elements.contains(id));
        let updated_at = editor.document().updated_at;

        double_click(&mut editor, 300.0, 300.0);
        let effects = key(&mut editor, Key::Escape, Modifiers::NONE);

        assert!(!effects.contains(&Effect::DocumentChanged));
        assert_eq!(editor.document().updated_at, updated_at);
        assert!(!editor.page().history.is_redo_disabled());
        command(&mut editor, Command::Redo);
        assert!(!editor.page().elements.contains(id));
    }

    #[test]
    fn test_typed_text_folds_into_create() {
        let mut editor = Editor::new();
        double_click(&mut editor, 100.0, 100.0);
        type_text(&mut editor, "hello");
        type_text(&mut editor, "hello world");
        editor.handle_event(InputEvent::Blur, &METRICS);

        assert_eq!(history_len(&editor), 1);
        let tip = editor.page().history.tip().unwrap();
        assert_eq!(tip.kind, EntryKind::Create);
        let stored = tip.elements[0].new.as_ref().unwrap();
        assert_eq!(stored.text_content(), Some("hello world"));
        assert!(editor.gesture().is_idle());
    }

    #[test]
    fn test_text_tool_click_starts_editing() {
        let mut editor = Editor::new();
        set_tool(&mut editor, Tool::Text);
        down(&mut editor, 40.0, 40.0);
        up(&mut editor, 40.0, 40.0);

        assert!(editor.gesture().is_text_editing());
        assert_eq!(history_len(&editor), 0);
        let element = editor.page().elements.iter().next().unwrap();
        assert_eq!(element.element_type(), ElementType::Text);
        assert!(element.frame.width() > 0.0);
    }

    #[test]
    fn test_clearing_existing_text_removes_it() {
        let mut editor = Editor::new();
        double_click(&mut editor, 100.0, 100.0);
        type_text(&mut editor, "note");
        editor.handle_event(InputEvent::Blur, &METRICS);
        let id = editor.page().elements.ids()[0];

        double_click(&mut editor, 105.0, 105.0);
        assert!(editor.gesture().is_text_editing());
        type_text(&mut editor, "  ");
        editor.handle_event(InputEvent::Blur, &METRICS);

        assert!(!editor.page().elements.contains(id));
        assert_eq!(history_len(&editor), 2);
        assert_eq!(editor.page().history.tip().unwrap().kind, EntryKind::Remove);
    }

    #[test]
    fn test_shape_label_edit_is_one_update() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 100.0, 60.0);
        double_click(&mut editor, 50.0, 30.0);
        type_text(&mut editor, "L");
        type_text(&mut editor, "Label");
        down(&mut editor, 300.0, 300.0);
        up(&mut editor, 300.0, 300.0);

        assert_eq!(element(&editor, id).text_content(), Some("Label"));
        assert_eq!(element(&editor, id).frame, Frame::new(0.0, 0.0, 100.0, 60.0));
        assert_eq!(history_len(&editor), 1);
        assert_eq!(editor.page().history.tip().unwrap().kind, EntryKind::Update);
    }
}
