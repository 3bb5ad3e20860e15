//! Keyboard shortcuts.

use super::effect::Effects;
use super::event::{Command, Key};
use super::state::Tool;
use super::Editor;
use crate::history::HistoryEntry;
use crate::metrics::TextMetrics;
use crate::selection;
use kurbo::Vec2;

impl Editor {
    pub(super) fn key_down(&mut self, key: Key, metrics: &dyn TextMetrics, fx: &mut Effects) {
        // the text box owns the keyboard while editing
        if self.gesture.is_text_editing() {
            if key == Key::Escape {
                self.commit_text(fx);
            }
            return;
        }
        if key == Key::Escape {
            self.escape(fx);
            return;
        }
        if !self.gesture.is_idle() {
            return;
        }

        match key {
            Key::ArrowUp => self.nudge(Vec2::new(0.0, -1.0), "up", fx),
            Key::ArrowDown => self.nudge(Vec2::new(0.0, 1.0), "down", fx),
            Key::ArrowLeft => self.nudge(Vec2::new(-1.0, 0.0), "left", fx),
            Key::ArrowRight => self.nudge(Vec2::new(1.0, 0.0), "right", fx),
            Key::Delete | Key::Backspace => self.delete_selection(fx),
            Key::Enter => self.edit_selected_text(fx),
            Key::Char(c) if self.modifiers.command() => self.chord(c, metrics, fx),
            Key::Char(']') => self.run_command(Command::BringForward, metrics, fx),
            Key::Char('[') => self.run_command(Command::SendBackward, metrics, fx),
            Key::Char(c) => {
                if let Some(tool) = Tool::from_hotkey(c) {
                    self.set_tool(tool, fx);
                }
            }
            Key::Escape => {}
        }
    }

    fn escape(&mut self, fx: &mut Effects) {
        if !self.gesture.is_idle() {
            self.cancel_gesture(fx);
            return;
        }
        let page = self.document.page_mut();
        let changed = if page.active_group.is_some() {
            selection::exit_group(page)
        } else {
            selection::clear(page)
        };
        fx.selection_if(changed);
    }

    fn chord(&mut self, c: char, metrics: &dyn TextMetrics, fx: &mut Effects) {
        let shift = self.modifiers.shift;
        let command = match c.to_ascii_lowercase() {
            'z' if shift => Command::Redo,
            'z' => Command::Undo,
            'y' => Command::Redo,
            'a' => Command::SelectAll,
            'd' => Command::Duplicate,
            'g' if shift => Command::Ungroup,
            'g' => Command::Group,
            'l' if shift => Command::ToggleLock,
            ']' => Command::BringToFront,
            '[' => Command::SendToBack,
            _ => return,
        };
        self.run_command(command, metrics, fx);
    }

    /// Move the unlocked selection one step. Repeated presses in the same
    /// direction on the same elements fold into one history entry.
    fn nudge(&mut self, direction: Vec2, name: &str, fx: &mut Effects) {
        let delta = direction * self.settings.nudge_step(self.modifiers.shift);
        let page = self.document.page_mut();
        let mut pairs = Vec::new();
        for element in page.elements.iter_mut().filter(|e| e.selected && !e.locked) {
            let before = element.clone();
            element.drag(delta);
            pairs.push((before, element.clone()));
        }
        if pairs.is_empty() {
            return;
        }
        self.commit(
            HistoryEntry::update(pairs).coalescing(format!("nudge-{name}")),
            fx,
        );
    }

    fn edit_selected_text(&mut self, fx: &mut Effects) {
        let editable: Vec<_> = self
            .document
            .page()
            .elements
            .iter()
            .filter(|e| e.selected)
            .map(|e| (e.id(), !e.locked && e.is_text_capable()))
            .collect();
        if let [(id, true)] = editable.as_slice() {
            self.begin_text_edit(*id, false, fx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{Command, Editor, Effect, Key, Modifiers, Tool};
    use crate::elements::Frame;

    fn select(editor: &mut Editor, x: f64, y: f64) {
        down(editor, x, y);
        up(editor, x, y);
    }

    #[test]
    fn test_repeated_nudges_coalesce() {
        let mut editor = Editor::new();
        editor.settings.grid_size = 10.0;
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        select(&mut editor, 10.0, 10.0);

        for _ in 0..5 {
            key(&mut editor, Key::ArrowRight, Modifiers::NONE);
        }
        assert_eq!(element(&editor, id).frame.x1, 50.0);
        assert_eq!(history_len(&editor), 1);

        command(&mut editor, Command::Undo);
        assert_eq!(element(&editor, id).frame.x1, 0.0);
        assert!(editor.page().history.is_undo_disabled());
    }

    #[test]
    fn test_direction_change_starts_new_entry() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        select(&mut editor, 10.0, 10.0);

        key(&mut editor, Key::ArrowRight, Modifiers::SHIFT);
        key(&mut editor, Key::ArrowRight, Modifiers::SHIFT);
        key(&mut editor, Key::ArrowDown, Modifiers::SHIFT);
        assert_eq!(element(&editor, id).frame, Frame::new(2.0, 1.0, 22.0, 21.0));
        assert_eq!(history_len(&editor), 2);
    }

    #[test]
    fn test_delete_removes_selection() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        select(&mut editor, 10.0, 10.0);
        key(&mut editor, Key::Delete, Modifiers::NONE);
        assert!(!editor.page().elements.contains(id));

        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        key(&mut editor, Key::Char('z'), ctrl);
        assert!(editor.page().elements.contains(id));
        key(&mut editor, Key::Char('z'), Modifiers { shift: true, ..ctrl });
        assert!(!editor.page().elements.contains(id));
    }

    #[test]
    fn test_hotkeys_switch_tools() {
        let mut editor = Editor::new();
        key(&mut editor, Key::Char('r'), Modifiers::NONE);
        assert_eq!(editor.tool(), Tool::Rectangle);
        key(&mut editor, Key::Char('v'), Modifiers::NONE);
        assert_eq!(editor.tool(), Tool::Select);
    }

    #[test]
    fn test_enter_edits_single_selected_label() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        let other = add_rect(&mut editor, 40.0, 0.0, 60.0, 20.0);
        select(&mut editor, 10.0, 10.0);

        let effects = key(&mut editor, Key::Enter, Modifiers::NONE);
        assert!(effects.contains(&Effect::TextEditStarted { id }));
        assert!(editor.gesture().is_text_editing());
        key(&mut editor, Key::Escape, Modifiers::NONE);

        command(&mut editor, Command::SelectAll);
        assert!(element(&editor, other).selected);
        key(&mut editor, Key::Enter, Modifiers::NONE);
        assert!(editor.gesture().is_idle());
    }

    #[test]
    fn test_escape_clears_selection() {
        let mut editor = Editor::new();
        let id = add_rect(&mut editor, 0.0, 0.0, 20.0, 20.0);
        select(&mut editor, 10.0, 10.0);
        assert!(element(&editor, id).selected);
        key(&mut editor, Key::Escape, Modifiers::NONE);
        assert!(!element(&editor, id).selected);
    }
}
