//! Keyboard shortcut table.

use crate::model::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    /// A text field owns the keyboard; shortcuts stay out of its way.
    pub text_focus: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
            text_focus: false,
        }
    }

    pub fn shifted(key: Key) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Open,
    ContextMenu,
    Edit,
    CreateSubtask,
    Delete,
    DrillIn,
    DrillOut,
    SetStatus(TaskStatus),
    ZoomIn,
    ZoomOut,
}

/// Map a key press to a command. Hover-bound commands resolve only when a task is hovered.
pub fn resolve(input: &KeyInput, hovering: bool) -> Option<KeyCommand> {
    if input.text_focus {
        return None;
    }
    let ch = match input.key {
        Key::Enter => return hovering.then_some(KeyCommand::Open),
        Key::Char(c) => c.to_ascii_lowercase(),
    };

    if ch == 's' && input.shift {
        return Some(KeyCommand::DrillOut);
    }
    if matches!(ch, '+' | '=' | '-' | '_') {
        if input.ctrl || input.meta || input.alt {
            return None;
        }
        return Some(if matches!(ch, '+' | '=') {
            KeyCommand::ZoomIn
        } else {
            KeyCommand::ZoomOut
        });
    }

    let command = match ch {
        'r' => KeyCommand::ContextMenu,
        'e' => KeyCommand::Edit,
        'c' => KeyCommand::CreateSubtask,
        'd' => KeyCommand::Delete,
        's' => KeyCommand::DrillIn,
        '1'..='5' => KeyCommand::SetStatus(TaskStatus::from_digit(ch as u8 - b'0')?),
        _ => return None,
    };
    hovering.then_some(command)
}
