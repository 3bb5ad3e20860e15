//! Input events consumed by the editor.

use super::state::Tool;
use crate::document::AssetRecord;
use crate::elements::{Element, Property, PropertyValue};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl, or Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Delete,
    Backspace,
    Enter,
    Char(char),
}

/// Result of a clipboard read, delivered once the host has it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ClipboardPayload {
    /// The platform refused access.
    Denied,
    /// Content of a type the editor cannot paste, by MIME type.
    Unsupported { mime: String },
    Text { text: String },
    Image { asset: AssetRecord },
    /// Elements copied from a board.
    Elements { elements: Vec<Element> },
}

/// Programmatic editor actions, usually bound to menus and toolbars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "command")]
pub enum Command {
    Undo,
    Redo,
    SelectAll,
    Duplicate,
    Group,
    Ungroup,
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
    SetProperty {
        property: Property,
        value: PropertyValue,
    },
    ToggleLock,
    DeleteSelection,
    SetGridEnabled { enabled: bool },
    AddPage { title: String },
    SetPage { index: usize },
    ZoomToFit { viewport: Size },
}

/// One input event. Pointer positions are client (screen) coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum InputEvent {
    PointerDown {
        client: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        client: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        client: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The pointer left the surface or capture was lost.
    PointerLeave,
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    DoubleClick {
        client: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Full content of the text editor while editing.
    TextInput { content: String },
    /// The text editor lost focus.
    Blur,
    Paste(ClipboardPayload),
    Wheel {
        client: Point,
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
    SetTool { tool: Tool },
    SetToolLock { locked: bool },
    Command(Command),
}
