use std::ops::Deref;

use crossterm::event::{KeyCode, KeyEvent as CrosstermKeyEvent, KeyModifiers};

/// Human readable form of a key, e.g. `ctrl-n`, `enter`, `G`.
pub fn key_event_to_string(key_event: &CrosstermKeyEvent) -> String {
    let char;
    let key_code = match key_event.code {
        KeyCode::Backspace => "backspace",
        KeyCode::Enter => "enter",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Tab => "tab",
        KeyCode::BackTab => "backtab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::F(c) => {
            char = format!("f({c})");
            &char
        }
        KeyCode::Char(' ') => "space",
        KeyCode::Char(c) => {
            char = c.to_string();
            &char
        }
        KeyCode::Esc => "esc",
        _ => "",
    };

    let mut modifiers = Vec::with_capacity(3);
    if key_event.modifiers.intersects(KeyModifiers::CONTROL) {
        modifiers.push("ctrl");
    }
    if key_event.modifiers.intersects(KeyModifiers::SHIFT) {
        modifiers.push("shift");
    }
    if key_event.modifiers.intersects(KeyModifiers::ALT) {
        modifiers.push("alt");
    }

    let mut key = modifiers.join("-");
    if !key.is_empty() {
        key.push('-');
    }
    key.push_str(key_code);
    key
}

/// A key binding. Compares code and modifiers only, so it can be matched against
/// incoming key events regardless of their kind or state.
#[derive(Clone, Debug)]
pub struct KeyEvent(pub CrosstermKeyEvent);

impl KeyEvent {
    pub fn ctrl(c: char) -> Self {
        Self(CrosstermKeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    pub fn matches(&self, key: &CrosstermKeyEvent) -> bool {
        self.0.code == key.code && self.0.modifiers == key.modifiers
    }
}

impl PartialEq for KeyEvent {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl From<CrosstermKeyEvent> for KeyEvent {
    fn from(key_event: CrosstermKeyEvent) -> Self {
        Self(key_event)
    }
}
impl From<KeyCode> for KeyEvent {
    fn from(key_code: KeyCode) -> Self {
        Self(CrosstermKeyEvent::new(key_code, KeyModifiers::NONE))
    }
}
impl From<char> for KeyEvent {
    fn from(c: char) -> Self {
        Self(CrosstermKeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }
}
impl From<KeyEvent> for CrosstermKeyEvent {
    fn from(val: KeyEvent) -> Self {
        val.0
    }
}
impl Deref for KeyEvent {
    type Target = CrosstermKeyEvent;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", key_event_to_string(self))
    }
}


#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventKind, KeyEventState};

    use super::*;

    #[test]
    fn test_key_to_string() {
        assert_eq!(KeyEvent::from(KeyCode::Enter).to_string(), "enter");
        assert_eq!(KeyEvent::from(' ').to_string(), "space");
        assert_eq!(KeyEvent::from('G').to_string(), "G");
        assert_eq!(KeyEvent::ctrl('n').to_string(), "ctrl-n");
        assert_eq!(KeyEvent::from(KeyCode::F(2)).to_string(), "f(2)");
    }

    #[test]
    fn test_matches_ignores_kind() {
        let binding = KeyEvent::from(KeyCode::Enter);
        let release = CrosstermKeyEvent::new_with_kind_and_state(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert!(binding.matches(&release));
        assert!(!binding.matches(&CrosstermKeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::SHIFT
        )));
        assert_eq!(KeyEvent::ctrl('p'), KeyEvent::ctrl('p'));
        assert_ne!(KeyEvent::ctrl('p'), KeyEvent::from('p'));
    }
}
