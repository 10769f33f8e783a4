//! Message types for the capture session
//!
//! This module contains:
//! - Pointer events fed to the selection state machine
//! - Declarative effects it emits for the presentation layer
//! - Toolbar actions and keyboard keys

use serde::{Deserialize, Serialize};

use crate::domain::{Cursor, CursorTarget, Point, Rect, ShapeKind};

// ============================================================================
// Selection events
// ============================================================================

/// Input to the selection state machine, positions in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Pointer left the tracked container at the given position
    PointerLeave(Point),
    /// Freeze the selection and start annotating (toolbar tool pick)
    EnterEdit,
    /// Abort the session
    Cancel,
}

// ============================================================================
// Effects
// ============================================================================

/// Side effect requested by a state transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Selection rectangle changed and must be redrawn
    Redraw(Rect),
    /// Change the pointer cursor of an element
    SetCursor { target: CursorTarget, cursor: Cursor },
    /// Show or hide the edit toolbar
    ToolbarVisible(bool),
    /// Hand the frozen selection to the annotation canvas
    BeginAnnotation(Rect),
    /// End the session through the host
    Exit,
}

// ============================================================================
// Toolbar and keyboard
// ============================================================================

/// Edit toolbar items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "tool")]
pub enum ToolbarAction {
    /// Pick an annotation tool; the first pick enters edit mode
    SelectTool(ShapeKind),
    /// Remove the last committed shape
    Undo,
    /// Save the composited image to the configured folder
    Save,
    /// Copy the composited image to the clipboard
    Copy,
    /// Abort the session
    Cancel,
}

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    Enter,
    /// A printable character, e.g. `z` for undo with a modifier
    Char(char),
    Other,
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    /// Command key on macOS, treated like ctrl
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        logo: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        logo: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.logo
    }
}

/// What a key press asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Exit,
    Toolbar(ToolbarAction),
}
