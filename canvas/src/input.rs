//! Input model: modifier keys, mouse buttons, keyboard shortcuts and the
//! pointer gesture state machine.
//!
//! `InputState` is the gesture tracked between pointer-down and pointer-up.
//! It carries the context the editor needs to turn pointer moves into
//! preview edits and to commit one history step on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::doc::ElementId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    /// Meta / Command key.
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Middle,
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key name as reported by the browser (`"Delete"`, `"z"`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Editor commands bound to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Copy,
    Paste,
    Delete,
    Deselect,
    ZoomIn,
    ZoomOut,
    Save,
}

impl Shortcut {
    /// Resolve a key press to a command, if it is bound to one.
    ///
    /// Undo is Ctrl/Cmd+Z; redo is Ctrl/Cmd+Y or Ctrl/Cmd+Shift+Z.
    #[must_use]
    pub fn from_key(key: &Key, mods: Modifiers) -> Option<Self> {
        let name = key.0.as_str();
        match name {
            "Delete" | "Backspace" => return Some(Self::Delete),
            "Escape" => return Some(Self::Deselect),
            _ => {}
        }
        if !mods.command() {
            return None;
        }
        match name.to_ascii_lowercase().as_str() {
            "z" if mods.shift => Some(Self::Redo),
            "z" => Some(Self::Undo),
            "y" => Some(Self::Redo),
            "c" => Some(Self::Copy),
            "v" => Some(Self::Paste),
            "s" => Some(Self::Save),
            "=" | "+" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            _ => None,
        }
    }
}

/// Active pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging on empty canvas with the middle button pans the view.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// Moving an element.
    DraggingElement {
        id: ElementId,
        /// Pointer position minus element origin at grab time, in canvas units.
        grab_dx: f64,
        grab_dy: f64,
        /// Whether the pointer has moved since pointer-down.
        moved: bool,
    },
    /// Rubber-band selection from `start` to `current`, both in canvas units.
    Marquee { start: Point, current: Point },
}
