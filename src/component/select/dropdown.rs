//! The options control a [`SelectInput`](super::SelectInput) delegates to.
//!
//! [`SelectControl`] is the capability the input needs: take the entries to offer and
//! the current one, take style overrides, turn input events into [`ControlMsg`]s and
//! report a [`Selection`] when the user picks or clears. [`Dropdown`] is the shipped
//! implementation: a closed box that opens into a filterable menu.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph,
    },
};
use tui_input::{Input, InputRequest, backend::crossterm::EventHandler};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{
    tui::Event,
    utils::{
        help_msg::{HelpEntry, HelpMsg},
        key_events::KeyEvent,
    },
};

use super::styles::{ControlState, SelectStyles, SubPart};

#[derive(Clone, Debug)]
pub(crate) enum ControlMsg {
    Open,
    Close,
    Next,
    Prev,
    First,
    Last,
    /// Pick the highlighted entry
    Confirm,
    Clear,
    FilterKey(KeyEvent),
    FilterPaste(String),
}

/// What the user did, by index into the entries last given to the control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Selection {
    Picked(usize),
    Cleared,
}

pub(crate) trait SelectControl: Send + Sync {
    /// Replace the offered entries. Resets any filter.
    fn set_entries(&mut self, labels: Vec<String>);

    fn set_current(&mut self, index: Option<usize>);

    fn set_styles(&mut self, styles: SelectStyles);

    fn is_open(&self) -> bool;

    /// Map an input event to a message without touching state.
    fn map_event(&self, event: &Event) -> Option<ControlMsg>;

    fn update(&mut self, msg: ControlMsg) -> Option<Selection>;

    /// Draw the closed box into `area` (borders included).
    fn render_control(&self, frame: &mut Frame, area: Rect, state: &ControlState, border: Style);

    /// Draw the open menu next to `anchor`, the area the box was drawn in.
    fn render_menu(&mut self, frame: &mut Frame, anchor: Rect, state: &ControlState);

    fn help_msg(&self) -> HelpMsg;
}

#[derive(Clone, Debug)]
pub(crate) struct DropdownKeys {
    open_keys: Vec<KeyEvent>,
    confirm_keys: Vec<KeyEvent>,
    close_keys: Vec<KeyEvent>,
    clear_keys: Vec<KeyEvent>,
    next_keys: Vec<KeyEvent>,
    prev_keys: Vec<KeyEvent>,
}

impl Default for DropdownKeys {
    fn default() -> Self {
        Self {
            open_keys: vec![KeyCode::Enter.into(), ' '.into(), KeyCode::Down.into()],
            confirm_keys: vec![KeyCode::Enter.into()],
            close_keys: vec![KeyCode::Esc.into()],
            clear_keys: vec![KeyCode::Backspace.into(), KeyCode::Delete.into()],
            next_keys: vec![KeyCode::Down.into(), KeyEvent::ctrl('n')],
            prev_keys: vec![KeyCode::Up.into(), KeyEvent::ctrl('p')],
        }
    }
}

impl DropdownKeys {
    fn hit(keys: &[KeyEvent], key: &crossterm::event::KeyEvent) -> bool {
        keys.iter().any(|k| k.matches(key))
    }
}

pub(crate) struct Dropdown {
    entries: Vec<String>,
    current: Option<usize>,
    open: bool,

    filter: Input,
    /// Indices into `entries` that pass the filter
    visible: Vec<usize>,
    /// Position in `visible`
    highlight: Option<usize>,
    list_state: ListState,

    styles: SelectStyles,
    keys: DropdownKeys,
    clearable: bool,
    placeholder: String,
    max_visible_items: u16,
}

impl Default for Dropdown {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            open: false,
            filter: Input::default(),
            visible: Vec::new(),
            highlight: None,
            list_state: ListState::default(),
            styles: SelectStyles::default(),
            keys: DropdownKeys::default(),
            clearable: true,
            placeholder: "Select...".into(),
            max_visible_items: 6,
        }
    }
}

impl Dropdown {
    pub fn clearable(self, clearable: bool) -> Self {
        Self { clearable, ..self }
    }

    pub fn placeholder<T: Into<String>>(self, placeholder: T) -> Self {
        Self {
            placeholder: placeholder.into(),
            ..self
        }
    }

    fn refilter(&mut self) {
        let needle = self.filter.value().to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, label)| label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.highlight = if self.visible.is_empty() { None } else { Some(0) };
    }

    fn close(&mut self) {
        self.open = false;
        self.filter.reset();
        self.refilter();
    }

    fn label_of(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    #[cfg(test)]
    pub fn visible_labels(&self) -> Vec<&str> {
        self.visible
            .iter()
            .filter_map(|&i| self.label_of(i))
            .collect()
    }

    #[cfg(test)]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlight.and_then(|h| self.visible.get(h).copied())
    }
}

impl SelectControl for Dropdown {
    fn set_entries(&mut self, labels: Vec<String>) {
        self.entries = labels;
        self.current = self.current.filter(|&c| c < self.entries.len());
        self.filter.reset();
        self.refilter();
    }

    fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&c| c < self.entries.len());
    }

    fn set_styles(&mut self, styles: SelectStyles) {
        self.styles = styles;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn map_event(&self, event: &Event) -> Option<ControlMsg> {
        match event {
            Event::Key(key) if !self.open => {
                if DropdownKeys::hit(&self.keys.open_keys, key) {
                    Some(ControlMsg::Open)
                } else if self.clearable
                    && self.current.is_some()
                    && DropdownKeys::hit(&self.keys.clear_keys, key)
                {
                    Some(ControlMsg::Clear)
                } else {
                    None
                }
            }
            Event::Key(key) => {
                if DropdownKeys::hit(&self.keys.close_keys, key) {
                    Some(ControlMsg::Close)
                } else if DropdownKeys::hit(&self.keys.confirm_keys, key) {
                    Some(ControlMsg::Confirm)
                } else if DropdownKeys::hit(&self.keys.next_keys, key) {
                    Some(ControlMsg::Next)
                } else if DropdownKeys::hit(&self.keys.prev_keys, key) {
                    Some(ControlMsg::Prev)
                } else {
                    match key.code {
                        KeyCode::Home => Some(ControlMsg::First),
                        KeyCode::End => Some(ControlMsg::Last),
                        KeyCode::Char(_)
                        | KeyCode::Backspace
                        | KeyCode::Delete
                        | KeyCode::Left
                        | KeyCode::Right => Some(ControlMsg::FilterKey((*key).into())),
                        _ => None,
                    }
                }
            }
            Event::Paste(s) if self.open => Some(ControlMsg::FilterPaste(s.clone())),
            _ => None,
        }
    }

    fn update(&mut self, msg: ControlMsg) -> Option<Selection> {
        match msg {
            ControlMsg::Open => {
                self.open = true;
                self.filter.reset();
                self.refilter();
                if let Some(pos) = self
                    .current
                    .and_then(|c| self.visible.iter().position(|&i| i == c))
                {
                    self.highlight = Some(pos);
                }
                None
            }
            ControlMsg::Close => {
                self.close();
                None
            }
            ControlMsg::Next => {
                let last = self.visible.len().checked_sub(1)?;
                self.highlight = Some(self.highlight.map_or(0, |h| (h + 1).min(last)));
                None
            }
            ControlMsg::Prev => {
                if !self.visible.is_empty() {
                    self.highlight = Some(self.highlight.map_or(0, |h| h.saturating_sub(1)));
                }
                None
            }
            ControlMsg::First => {
                if !self.visible.is_empty() {
                    self.highlight = Some(0);
                }
                None
            }
            ControlMsg::Last => {
                self.highlight = self.visible.len().checked_sub(1);
                None
            }
            ControlMsg::Confirm => {
                let index = self.highlight.and_then(|h| self.visible.get(h).copied())?;
                self.current = Some(index);
                self.close();
                Some(Selection::Picked(index))
            }
            ControlMsg::Clear => {
                self.current = None;
                Some(Selection::Cleared)
            }
            ControlMsg::FilterKey(key) => {
                self.filter
                    .handle_event(&crossterm::event::Event::Key(key.into()));
                self.refilter();
                None
            }
            ControlMsg::FilterPaste(s) => {
                s.chars().for_each(|c| {
                    self.filter.handle(InputRequest::InsertChar(c));
                });
                self.refilter();
                None
            }
        }
    }

    fn render_control(&self, frame: &mut Frame, area: Rect, state: &ControlState, border: Style) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.styles.resolve(SubPart::Control, border, state));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [text_area, indicator_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(4)]).areas(inner);

        let filtering = self.open && !self.filter.value().is_empty();
        let text = if filtering {
            let width = text_area.width.max(1) as usize;
            let scroll = self.filter.visual_scroll(width);
            let x = self.filter.visual_cursor().max(scroll) - scroll;
            frame.set_cursor_position((text_area.x + x as u16, text_area.y));
            Paragraph::new(self.filter.value()).scroll((0, scroll as u16))
        } else {
            match self.current.and_then(|c| self.label_of(c)) {
                Some(label) => Paragraph::new(truncate(label, text_area.width)),
                None => Paragraph::new(truncate(&self.placeholder, text_area.width))
                    .style(Style::default().add_modifier(Modifier::DIM)),
            }
        };
        frame.render_widget(text, text_area);

        let indicator = Line::from(vec![
            Span::raw(" "),
            Span::styled(
                "│",
                self.styles
                    .resolve(SubPart::IndicatorSeparator, Style::default(), state),
            ),
            Span::raw(" "),
            Span::styled(
                if self.open { "▲" } else { "▼" },
                self.styles
                    .resolve(SubPart::DropdownIndicator, Style::default(), state),
            ),
        ]);
        frame.render_widget(Paragraph::new(indicator), indicator_area);
    }

    fn render_menu(&mut self, frame: &mut Frame, anchor: Rect, state: &ControlState) {
        if !self.open {
            return;
        }
        let screen = frame.area();
        let rows = u16::try_from(self.visible.len())
            .unwrap_or(u16::MAX)
            .clamp(1, self.max_visible_items);
        let wanted = rows + 2;
        let below = screen.bottom().saturating_sub(anchor.bottom());
        let above = anchor.y.saturating_sub(screen.y);
        let menu_area = if below >= wanted || below >= above {
            Rect {
                x: anchor.x,
                y: anchor.bottom(),
                width: anchor.width,
                height: wanted.min(below),
            }
        } else {
            let height = wanted.min(above);
            Rect {
                x: anchor.x,
                y: anchor.y - height,
                width: anchor.width,
                height,
            }
        };
        if menu_area.height == 0 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .style(self.styles.resolve(SubPart::Menu, Style::default(), state));
        let item_style = self.styles.resolve(SubPart::Option, Style::default(), state);
        let items: Vec<ListItem> = if self.visible.is_empty() {
            vec![ListItem::new("No options").style(Style::default().add_modifier(Modifier::DIM))]
        } else {
            self.visible
                .iter()
                .filter_map(|&i| {
                    let label = self.label_of(i)?;
                    let style = if Some(i) == self.current {
                        item_style.add_modifier(Modifier::BOLD)
                    } else {
                        item_style
                    };
                    Some(ListItem::new(label.to_string()).style(style))
                })
                .collect()
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol("> ");

        self.list_state.select(self.highlight);
        frame.render_widget(Clear, menu_area);
        frame.render_stateful_widget(list, menu_area, &mut self.list_state);
    }

    /// Lists the first key of each binding; a binding without keys is left out.
    fn help_msg(&self) -> HelpMsg {
        let entries = if self.open {
            vec![
                help_entry(&self.keys.confirm_keys, "Pick"),
                Some(HelpEntry::new_plain("up/down", "Move")),
                Some(HelpEntry::new_plain("type", "Filter")),
                help_entry(&self.keys.close_keys, "Close"),
            ]
        } else {
            vec![
                help_entry(&self.keys.open_keys, "Open"),
                help_entry(&self.keys.clear_keys, "Clear")
                    .filter(|_| self.clearable && self.current.is_some()),
            ]
        };
        entries.into_iter().flatten().collect::<Vec<_>>().into()
    }
}

fn help_entry(keys: &[KeyEvent], desc: &str) -> Option<HelpEntry> {
    keys.first().map(|key| HelpEntry::new(key.clone(), desc))
}

/// Cut `s` to `width` columns, marking the cut with `…`.
fn truncate(s: &str, width: u16) -> String {
    let width = width as usize;
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}
