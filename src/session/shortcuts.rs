use crate::domain::Mode;
use crate::session::messages::{Key, KeyAction, Modifiers, ToolbarAction};

/// Map a key press to a session action
///
/// Escape always exits. Export shortcuts need a non-empty selection, the same
/// condition that shows the toolbar. Undo only applies while annotating.
pub fn handle_key_event(
    key: Key,
    modifiers: Modifiers,
    mode: Mode,
    has_selection: bool,
) -> Option<KeyAction> {
    match key {
        Key::Escape => Some(KeyAction::Exit),
        // Undo last annotation
        Key::Char(c) if c.eq_ignore_ascii_case(&'z') && modifiers.command() && !modifiers.shift => {
            (mode == Mode::Edit).then_some(KeyAction::Toolbar(ToolbarAction::Undo))
        }
        // Save to the configured folder
        Key::Char(c) if c.eq_ignore_ascii_case(&'s') && modifiers.command() && has_selection => {
            Some(KeyAction::Toolbar(ToolbarAction::Save))
        }
        // Copy to clipboard
        Key::Enter if has_selection => Some(KeyAction::Toolbar(ToolbarAction::Copy)),
        _ => None,
    }
}
