use std::ops::{Deref, DerefMut};

use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

use super::key_events::KeyEvent;

#[derive(Debug, Clone)]
enum HelpKeyEvent {
    Key(KeyEvent),
    Plain(String),
}

#[derive(Debug, Clone)]
pub(crate) struct HelpEntry {
    key: HelpKeyEvent,
    desc: String,
}

impl HelpEntry {
    pub(crate) fn new<T: Into<String>, K: Into<KeyEvent>>(event: K, desc: T) -> Self {
        Self {
            key: HelpKeyEvent::Key(event.into()),
            desc: desc.into(),
        }
    }

    /// An entry whose key is free text, for groups like `up/down`
    pub(crate) fn new_plain<T: Into<String>>(event: T, desc: T) -> Self {
        Self {
            key: HelpKeyEvent::Plain(event.into()),
            desc: desc.into(),
        }
    }

    pub(crate) fn key(&self) -> String {
        match &self.key {
            HelpKeyEvent::Key(key) => key.to_string(),
            HelpKeyEvent::Plain(key) => key.clone(),
        }
    }

    pub(crate) fn desc(&self) -> &str {
        &self.desc
    }
}

impl std::fmt::Display for HelpEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.desc(), self.key())
    }
}

#[derive(Default, Clone, Debug)]
pub(crate) struct HelpMsg {
    slices: Vec<HelpEntry>,
}

impl From<Vec<HelpEntry>> for HelpMsg {
    fn from(slices: Vec<HelpEntry>) -> Self {
        Self { slices }
    }
}

impl HelpMsg {
    pub(crate) fn extend_ret(mut self, other: &HelpMsg) -> Self {
        self.slices.extend(other.slices.iter().cloned());
        self
    }

    pub(crate) fn render(&self, frame: &mut ratatui::Frame, area: ratatui::layout::Rect) {
        let paragraph = Paragraph::new(self.to_string()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1)),
        );
        frame.render_widget(paragraph, area);
    }
}

impl Deref for HelpMsg {
    type Target = Vec<HelpEntry>;

    fn deref(&self) -> &Self::Target {
        &self.slices
    }
}

impl DerefMut for HelpMsg {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.slices
    }
}

impl std::fmt::Display for HelpMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .slices
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<String>>()
            .join(" | ");
        f.write_str(&joined)
    }
}

#[cfg(test)]
mod test {
    use crossterm::event::KeyCode;

    use super::*;

    #[test]
    fn test_help_entry_key() {
        let entry = HelpEntry::new('c', "Clear selection");
        assert_eq!(entry.key(), "c");
        assert_eq!(entry.desc(), "Clear selection");
        assert_eq!(entry.to_string(), "Clear selection: c");
    }

    #[test]
    fn test_help_entry_plain() {
        let entry = HelpEntry::new_plain("up/down", "Move highlight");
        assert_eq!(entry.key(), "up/down");
        assert_eq!(entry.to_string(), "Move highlight: up/down");
    }

    #[test]
    fn test_help_msg_join() {
        let msg: HelpMsg = vec![
            HelpEntry::new(KeyCode::Enter, "Open"),
            HelpEntry::new(KeyCode::Esc, "Close"),
        ]
        .into();
        let msg = msg.extend_ret(&vec![HelpEntry::new('q', "Quit")].into());
        assert_eq!(msg.len(), 3);
        assert_eq!(msg.to_string(), "Open: enter | Close: esc | Quit: q");
    }
}
