//! Sticky notes and stickers, both dropped at a fixed size with one click.

use super::{
    ElementBehavior, ElementDefaults, FontFamily, Frame, HookContext, Property, PropertyValue,
    SerializableColor,
};
use super::text::{MAX_FONT_SIZE, MIN_FONT_SIZE};
use crate::handles::{Corner, Handle, HandleKind, corner_and_rotate_handles, resize_frame};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Side length of a new note.
pub const NOTE_SIZE: f64 = 200.0;

/// Side length of a new sticker.
pub const STICKER_SIZE: f64 = 120.0;

/// A colored sticky note with text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_note_font")]
    pub font_size: f64,
    #[serde(default)]
    pub font_family: FontFamily,
    #[serde(default = "SerializableColor::note_yellow")]
    pub color: SerializableColor,
}

fn default_note_font() -> f64 {
    super::TextData::DEFAULT_FONT_SIZE
}

impl NoteData {
    pub fn new(defaults: &ElementDefaults) -> Self {
        Self {
            content: String::new(),
            font_size: defaults.font_size,
            font_family: defaults.font_family,
            color: defaults.note_color,
        }
    }
}

impl ElementBehavior for NoteData {
    fn on_create_start(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        *frame = Frame::centered(point, NOTE_SIZE, NOTE_SIZE);
    }

    fn on_create_move(&mut self, _frame: &mut Frame, _point: Point, _ctx: &HookContext<'_>) {}

    fn is_degenerate(&self, _frame: &Frame) -> bool {
        false
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FillColor, PropertyValue::OptionalColor(Some(_))) => true,
            (Property::FontSize, PropertyValue::Number(size)) => {
                (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(size)
            }
            (Property::FontFamily, PropertyValue::Font(_)) => true,
            (Property::Content, PropertyValue::Text(_)) => true,
            _ => false,
        }
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::FillColor, PropertyValue::OptionalColor(Some(c))) => self.color = *c,
            (Property::FontSize, PropertyValue::Number(size)) => self.font_size = *size,
            (Property::FontFamily, PropertyValue::Font(f)) => self.font_family = *f,
            (Property::Content, PropertyValue::Text(t)) => self.content = t.clone(),
            _ => return false,
        }
        true
    }

    fn text(&self) -> Option<&str> {
        Some(&self.content)
    }

    fn set_text(&mut self, content: &str) -> bool {
        self.content = content.to_string();
        true
    }
}

/// A decorative sticker, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerData {
    pub sticker: String,
}

impl StickerData {
    pub fn new(defaults: &ElementDefaults) -> Self {
        Self {
            sticker: defaults.sticker.clone(),
        }
    }
}

impl ElementBehavior for StickerData {
    fn on_create_start(&mut self, frame: &mut Frame, point: Point, _ctx: &HookContext<'_>) {
        *frame = Frame::centered(point, STICKER_SIZE, STICKER_SIZE);
    }

    fn on_create_move(&mut self, _frame: &mut Frame, _point: Point, _ctx: &HookContext<'_>) {}

    fn is_degenerate(&self, _frame: &Frame) -> bool {
        false
    }

    /// Stickers stay square; the larger dragged side wins.
    fn on_resize(&mut self, frame: &mut Frame, handle: HandleKind, point: Point, _ctx: &HookContext<'_>) {
        *frame = resize_frame(frame, handle, point);
        let side = frame.width().abs().max(frame.height().abs());
        let w = side.copysign(frame.width());
        let h = side.copysign(frame.height());
        match handle {
            HandleKind::Corner(Corner::TopLeft) => {
                frame.x1 = frame.x2 - w;
                frame.y1 = frame.y2 - h;
            }
            HandleKind::Corner(Corner::TopRight) => {
                frame.x2 = frame.x1 + w;
                frame.y1 = frame.y2 - h;
            }
            HandleKind::Corner(Corner::BottomLeft) => {
                frame.x1 = frame.x2 - w;
                frame.y2 = frame.y1 + h;
            }
            HandleKind::Corner(Corner::BottomRight) => {
                frame.x2 = frame.x1 + w;
                frame.y2 = frame.y1 + h;
            }
            _ => {}
        }
    }

    fn handles(&self, frame: &Frame, rotation: f64) -> Vec<Handle> {
        corner_and_rotate_handles(frame, rotation)
    }

    fn is_value_allowed(&self, property: Property, value: &PropertyValue) -> bool {
        matches!((property, value), (Property::Sticker, PropertyValue::Text(name)) if !name.is_empty())
    }

    fn apply_property(&mut self, property: Property, value: &PropertyValue) -> bool {
        match (property, value) {
            (Property::Sticker, PropertyValue::Text(name)) => {
                self.sticker = name.clone();
                true
            }
            _ => false,
        }
    }
}
