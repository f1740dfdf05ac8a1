use serde::{Deserialize, Serialize};

/// Keys the capture surface reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Escape,
    Enter,
    Character(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// What a shortcut asks the capture view to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Cancel,
    Complete,
}

pub fn handle_key_event(key: &Key, has_selection: bool) -> Option<Shortcut> {
    match key {
        Key::Escape => Some(Shortcut::Cancel),
        // Enter copies only once there is something to copy
        Key::Enter if has_selection => Some(Shortcut::Complete),
        _ => None,
    }
}

/// Right click anywhere cancels the capture
pub fn handle_button_press(button: MouseButton) -> Option<Shortcut> {
    match button {
        MouseButton::Right => Some(Shortcut::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_always_cancels() {
        assert_eq!(handle_key_event(&Key::Escape, false), Some(Shortcut::Cancel));
        assert_eq!(handle_key_event(&Key::Escape, true), Some(Shortcut::Cancel));
    }

    #[test]
    fn enter_needs_a_selection() {
        assert_eq!(handle_key_event(&Key::Enter, false), None);
        assert_eq!(handle_key_event(&Key::Enter, true), Some(Shortcut::Complete));
        assert_eq!(handle_key_event(&Key::Character("a".into()), true), None);
    }

    #[test]
    fn only_right_click_is_a_shortcut() {
        assert_eq!(handle_button_press(MouseButton::Right), Some(Shortcut::Cancel));
        assert_eq!(handle_button_press(MouseButton::Left), None);
    }
}
