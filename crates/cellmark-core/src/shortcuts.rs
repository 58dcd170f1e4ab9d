//! Keyboard shortcuts: key bindings to editor commands, plus documentation.

use crate::input::{Key, KeyPress};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// Commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    Save,
    Undo,
    Redo,
    DeleteSelection,
    /// Cancel an in-progress polygon, or clear the selection.
    CancelOrDeselect,
    SelectTool(ToolKind),
    ZoomIn,
    ZoomOut,
    ZoomToFit,
}

/// Map a key press to a command.
pub fn command_for(press: &KeyPress) -> Option<EditorCommand> {
    let command = press.modifiers.command();
    match press.key {
        Key::Char(c) if command => match c.to_ascii_lowercase() {
            's' => Some(EditorCommand::Save),
            'z' if press.modifiers.shift => Some(EditorCommand::Redo),
            'z' => Some(EditorCommand::Undo),
            'y' => Some(EditorCommand::Redo),
            _ => None,
        },
        Key::Char(_) if press.modifiers.alt => None,
        Key::Char('1') => Some(EditorCommand::SelectTool(ToolKind::Move)),
        Key::Char('2') => Some(EditorCommand::SelectTool(ToolKind::Circle)),
        Key::Char('3') => Some(EditorCommand::SelectTool(ToolKind::Polygon)),
        Key::Char('+') | Key::Char('=') => Some(EditorCommand::ZoomIn),
        Key::Char('-') => Some(EditorCommand::ZoomOut),
        Key::Char('0') => Some(EditorCommand::ZoomToFit),
        Key::Delete | Key::Backspace => Some(EditorCommand::DeleteSelection),
        Key::Escape => Some(EditorCommand::CancelOrDeselect),
        _ => None,
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("S", true, false, "Save annotations"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Delete", false, false, "Delete selected annotation"),
            Shortcut::new("Backspace", false, false, "Delete selected annotation"),
            Shortcut::new("Escape", false, false, "Cancel polygon or clear selection"),
            Shortcut::new("1", false, false, "Move tool"),
            Shortcut::new("2", false, false, "Circle tool"),
            Shortcut::new("3", false, false, "Polygon tool"),
            Shortcut::new("+", false, false, "Zoom in"),
            Shortcut::new("-", false, false, "Zoom out"),
            Shortcut::new("0", false, false, "Zoom to fit"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn ctrl(c: char) -> KeyPress {
        KeyPress::with_modifiers(Key::Char(c), Modifiers::CTRL)
    }

    #[test]
    fn test_command_bindings() {
        assert_eq!(command_for(&ctrl('s')), Some(EditorCommand::Save));
        assert_eq!(command_for(&ctrl('z')), Some(EditorCommand::Undo));
        assert_eq!(command_for(&ctrl('Y')), Some(EditorCommand::Redo));
        assert_eq!(command_for(&KeyPress::new(Key::Backspace)), Some(EditorCommand::DeleteSelection));
        assert_eq!(command_for(&KeyPress::new(Key::Escape)), Some(EditorCommand::CancelOrDeselect));
        assert_eq!(
            command_for(&KeyPress::new(Key::Char('3'))),
            Some(EditorCommand::SelectTool(ToolKind::Polygon))
        );
        assert_eq!(command_for(&KeyPress::new(Key::Char('0'))), Some(EditorCommand::ZoomToFit));
    }

    #[test]
    fn test_plain_letters_are_unbound() {
        assert_eq!(command_for(&KeyPress::new(Key::Char('s'))), None);
        assert_eq!(command_for(&ctrl('1')), None);
    }

    #[test]
    fn test_shortcut_format() {
        let all = ShortcutRegistry::all();
        assert_eq!(all[0].format(), "Ctrl+S");
        assert!(all.iter().any(|s| s.format() == "Ctrl+Shift+Z"));
    }
}
