//! A form made of select inputs.
//!
//! The page owns every field's value. Inputs report picks through `on_change`, which
//! sends a [`FormAction::FieldChanged`]; applying it stores the value and feeds it back
//! into the input. Required fields are checked on submit, and on every change after
//! the first submit.

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tracing::{info, warn};

use crate::{
    actions::{Action, ActionSender},
    component::{
        Component,
        select::{
            SelectInput, SelectInputProps, SelectMode,
            dropdown::Dropdown,
            styles::{ClassStyles, ERROR_COLOR, SelectStyles, SubPart},
        },
    },
    config::FieldConfig,
    tui::Event,
    utils::help_msg::{HelpEntry, HelpMsg},
};

use super::{EventLoopParticipant, Layer, WidgetExt};

pub(crate) const REQUIRED_MESSAGE: &str = "Required";

#[derive(Clone, Debug)]
pub(crate) enum FormAction {
    Focus(usize),
    FieldChanged(usize, Option<String>),
    Submit,
}

impl From<FormAction> for Action {
    fn from(value: FormAction) -> Self {
        Action::Form(value)
    }
}

struct Field {
    input: SelectInput<String>,
    value: Option<String>,
    required: bool,
}

pub(crate) struct FormPage {
    fields: Vec<Field>,
    focus: usize,
    /// Set once the user tried to submit; from then on errors follow every change
    validating: bool,
    submitted: Option<Vec<(String, Option<String>)>>,
    input_mode: bool,

    tx: ActionSender,
}

impl FormPage {
    pub fn new(tx: ActionSender, fields: &[FieldConfig], classes: &ClassStyles) -> Self {
        let mut ids: Vec<u64> = Vec::with_capacity(fields.len());
        while ids.len() < fields.len() {
            let id = rand::random::<u64>();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let fields = fields
            .iter()
            .zip(ids)
            .enumerate()
            .map(|(index, (field, id))| {
                let sink = tx.clone();
                let props = SelectInputProps::default()
                    .options(field.options.clone())
                    .value(field.value.clone())
                    .label_text(field.label.as_str())
                    .style_class(field.class.as_str())
                    .width(field.width.as_str());
                let mut dropdown = Dropdown::default().clearable(field.clearable);
                if let Some(placeholder) = &field.placeholder {
                    dropdown = dropdown.placeholder(placeholder.as_str());
                }
                let input = SelectInput::new(id, tx.clone(), props)
                    .styles(field_styles())
                    .control(dropdown)
                    .classes(classes.clone())
                    .on_change(move |value| sink.send(FormAction::FieldChanged(index, value)));
                Field {
                    input,
                    value: field.value.clone(),
                    required: field.required,
                }
            })
            .collect();

        Self {
            fields,
            focus: 0,
            validating: false,
            submitted: None,
            input_mode: false,
            tx,
        }
    }

    fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in self.fields.iter_mut() {
            if field.required && field.value.is_none() {
                field.input.set_error_message(REQUIRED_MESSAGE);
                valid = false;
            } else {
                field.input.set_error_message("");
            }
        }
        valid
    }

    fn focus_actions(&self, focus: usize) -> Vec<Action> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                field.input.get_switch_mode_action(if i == focus {
                    SelectMode::Focused
                } else {
                    SelectMode::Idle
                })
            })
            .collect()
    }

    pub fn get_help_msg(&self) -> HelpMsg {
        let own: HelpMsg = if self.input_mode {
            HelpMsg::default()
        } else {
            vec![
                HelpEntry::new_plain("tab/j/k", "Next field"),
                HelpEntry::new('s', "Submit"),
                HelpEntry::new('q', "Quit"),
            ]
            .into()
        };
        match self.fields.get(self.focus) {
            Some(field) => field.input.get_help_msg().extend_ret(&own),
            None => own,
        }
    }

    fn summary(&self) -> Line<'static> {
        match &self.submitted {
            None => Line::from("Not submitted yet").style(Style::default().fg(Color::DarkGray)),
            Some(values) => {
                let text = values
                    .iter()
                    .map(|(label, value)| {
                        format!("{}={}", label, value.as_deref().unwrap_or("-"))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                Line::from(format!("Submitted: {}", text)).style(Style::default().fg(Color::Green))
            }
        }
    }
}

/// The default look, plus a red label on fields with an error.
fn field_styles() -> SelectStyles {
    SelectStyles::default().with(SubPart::Label, |provided, state| {
        if state.error {
            provided.fg(ERROR_COLOR)
        } else {
            provided
        }
    })
}

impl EventLoopParticipant for FormPage {
    fn handle_events(&self, event: &Event) -> color_eyre::eyre::Result<()> {
        if !self.input_mode {
            if let Event::Key(key) = event {
                let count = self.fields.len();
                match key.code {
                    KeyCode::Tab | KeyCode::Char('j') if count > 0 => {
                        self.tx.send(FormAction::Focus((self.focus + 1) % count));
                    }
                    KeyCode::BackTab | KeyCode::Char('k') if count > 0 => {
                        self.tx
                            .send(FormAction::Focus((self.focus + count - 1) % count));
                    }
                    KeyCode::Char('s') => self.tx.send(FormAction::Submit),
                    _ => {}
                }
            }
        }
        for field in self.fields.iter() {
            field.input.handle_events(event)?;
        }
        Ok(())
    }

    fn update(&mut self, action: Action) {
        match &action {
            Action::SwitchInputMode(mode) => self.input_mode = *mode,
            Action::Form(FormAction::Focus(focus)) => {
                self.focus = *focus;
                self.focus_actions(*focus)
                    .into_iter()
                    .for_each(|a| self.tx.send(a));
            }
            Action::Form(FormAction::FieldChanged(index, value)) => {
                let validating = self.validating;
                let Some(field) = self.fields.get_mut(*index) else {
                    warn!("Change reported for unknown field {}", index);
                    return;
                };
                field.value = value.clone();
                field.input.set_value(value.clone());
                if validating {
                    self.validate();
                }
            }
            Action::Form(FormAction::Submit) => {
                self.validating = true;
                if self.validate() {
                    let values = self
                        .fields
                        .iter()
                        .map(|f| (f.input.props().label_text.clone(), f.value.clone()))
                        .collect::<Vec<_>>();
                    info!("Form submitted: {:?}", values);
                    self.submitted = Some(values);
                } else {
                    info!("Form submit rejected, required fields missing");
                    self.submitted = None;
                }
            }
            _ => {}
        }
        for field in self.fields.iter_mut() {
            if let Err(e) = field.input.update(&action) {
                warn!("Select input failed to apply {:?}: {:?}", action, e);
            }
        }
    }
}

impl WidgetExt for FormPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [body, status, help] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(area);

        let block = Block::default()
            .title("Form")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);
        let inner = block.inner(body);
        frame.render_widget(block, body);

        let rows = Layout::vertical(
            self.fields
                .iter()
                .map(|f| Constraint::Length(f.input.height()))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .spacing(1)
        .split(Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        });
        for (field, row) in self.fields.iter_mut().zip(rows.iter()) {
            field.input.render(frame, *row);
        }

        frame.render_widget(Paragraph::new(self.summary()), status);
        self.get_help_msg().render(frame, help);

        if let Some(field) = self.fields.get_mut(self.focus) {
            field.input.render_overlay(frame);
        }
    }
}

impl Layer for FormPage {
    fn init(&mut self) {
        if !self.fields.is_empty() {
            self.tx.send(FormAction::Focus(0));
        }
    }

    fn get_name(&self) -> String {
        "Form".into()
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    use crate::{
        component::select::SelectOption,
        utils::key_events::test_utils::{get_char_evt, get_key_evt},
    };

    use super::*;

    fn field(label: &str, required: bool, value: Option<&str>) -> FieldConfig {
        FieldConfig {
            label: label.into(),
            options: vec![
                SelectOption::new("One", "1".to_string()),
                SelectOption::new("Two", "2".to_string()),
            ],
            value: value.map(String::from),
            required,
            width: "30".into(),
            class: String::new(),
            placeholder: None,
            clearable: true,
        }
    }

    fn get_test_page(fields: &[FieldConfig]) -> (FormPage, UnboundedReceiver<Action>) {
        let (tx, mut rx) = unbounded_channel();
        let mut page = FormPage::new(tx.into(), fields, &ClassStyles::default());
        page.init();
        while let Ok(action) = rx.try_recv() {
            page.update(action);
        }
        (page, rx)
    }

    fn value(page: &FormPage, index: usize) -> Option<&str> {
        page.fields[index].value.as_deref()
    }

    fn error(page: &FormPage, index: usize) -> &str {
        &page.fields[index].input.props().error_message
    }

    #[test]
    fn test_focus_moves_between_fields() {
        let (mut page, mut rx) = get_test_page(&[field("A", false, None), field("B", false, None)]);
        assert_eq!(page.focus, 0);
        assert_eq!(page.fields[0].input.get_mode(), SelectMode::Focused);
        assert_eq!(page.fields[1].input.get_mode(), SelectMode::Idle);

        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Tab));
        assert_eq!(page.focus, 1);
        assert_eq!(page.fields[0].input.get_mode(), SelectMode::Idle);
        assert_eq!(page.fields[1].input.get_mode(), SelectMode::Focused);

        page.event_loop_once(&mut rx, get_char_evt('j'));
        assert_eq!(page.focus, 0);
        page.event_loop_once(&mut rx, get_char_evt('k'));
        assert_eq!(page.focus, 1);
    }

    #[test]
    fn test_pick_is_echoed_into_value() {
        let (mut page, mut rx) = get_test_page(&[field("A", false, None), field("B", false, None)]);
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        assert!(page.input_mode);
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Down));
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        assert!(!page.input_mode);

        assert_eq!(value(&page, 0), Some("2"));
        assert_eq!(page.fields[0].input.props().value.as_deref(), Some("2"));
        assert_eq!(
            page.fields[0].input.selected().map(|o| o.label.as_str()),
            Some("Two")
        );
        // only the focused field reacted
        assert_eq!(value(&page, 1), None);
    }

    #[test]
    fn test_keys_go_to_the_filter_while_menu_is_open() {
        let (mut page, mut rx) = get_test_page(&[field("A", false, None), field("B", false, None)]);
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        // 'j' and 's' are filter text now, not focus or submit
        page.event_loop_once(&mut rx, get_char_evt('j'));
        page.event_loop_once(&mut rx, get_char_evt('s'));
        assert_eq!(page.focus, 0);
        assert!(page.submitted.is_none());
        assert!(page.fields[0].input.is_open());
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Esc));
        assert!(!page.input_mode);
    }

    #[test]
    fn test_submit_requires_values() {
        let (mut page, mut rx) =
            get_test_page(&[field("A", true, None), field("B", true, Some("1"))]);
        page.event_loop_once(&mut rx, get_char_evt('s'));
        assert!(page.submitted.is_none());
        assert_eq!(error(&page, 0), REQUIRED_MESSAGE);
        assert_eq!(error(&page, 1), "");

        // picking a value clears the error right away
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        assert_eq!(value(&page, 0), Some("1"));
        assert_eq!(error(&page, 0), "");

        page.event_loop_once(&mut rx, get_char_evt('s'));
        assert_eq!(
            page.submitted,
            Some(vec![
                ("A".to_string(), Some("1".to_string())),
                ("B".to_string(), Some("1".to_string())),
            ])
        );
    }

    #[test]
    fn test_clearing_required_field_after_submit_shows_error() {
        let (mut page, mut rx) = get_test_page(&[field("A", true, Some("2"))]);
        page.event_loop_once(&mut rx, get_char_evt('s'));
        assert!(page.submitted.is_some());
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Backspace));
        assert_eq!(value(&page, 0), None);
        assert_eq!(error(&page, 0), REQUIRED_MESSAGE);
    }

    #[test]
    fn test_field_settings_reach_the_dropdown() {
        let mut fixed = field("Fixed", false, Some("1"));
        fixed.clearable = false;
        fixed.placeholder = Some("Pick one".into());
        let mut hinted = field("Hinted", false, None);
        hinted.placeholder = Some("Pick one".into());
        let (mut page, mut rx) = get_test_page(&[fixed, hinted]);

        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Backspace));
        assert_eq!(value(&page, 0), Some("1"));

        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        terminal.draw(|f| page.render(f, f.area())).unwrap();
        let text = screen_rows(terminal.backend().buffer());
        assert!(text.iter().any(|l| l.contains("Pick one")));
        assert!(!text.iter().any(|l| l.contains("Select...")));
    }

    #[test]
    fn test_label_turns_red_with_error() {
        let (mut page, mut rx) = get_test_page(&[field("Fruit", true, None)]);
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal.draw(|f| page.render(f, f.area())).unwrap();
        let label = label_cell(&terminal, "Fruit");
        assert_ne!(terminal.backend().buffer()[label].fg, ERROR_COLOR);

        page.event_loop_once(&mut rx, get_char_evt('s'));
        terminal.draw(|f| page.render(f, f.area())).unwrap();
        assert_eq!(terminal.backend().buffer()[label].fg, ERROR_COLOR);
    }

    fn screen_rows(buffer: &ratatui::buffer::Buffer) -> Vec<String> {
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    fn label_cell(terminal: &Terminal<TestBackend>, label: &str) -> (u16, u16) {
        let rows = screen_rows(terminal.backend().buffer());
        let y = rows.iter().position(|l| l.contains(label)).unwrap();
        let byte = rows[y].find(label).unwrap();
        let x = rows[y][..byte].chars().count();
        (x as u16, y as u16)
    }

    #[test]
    fn test_help_msg() {
        let (mut page, mut rx) = get_test_page(&[field("A", false, Some("1"))]);
        insta::assert_snapshot!(
            page.get_help_msg().to_string(),
            @"Open: enter | Clear: backspace | Next field: tab/j/k | Submit: s | Quit: q"
        );
        page.event_loop_once(&mut rx, get_key_evt(KeyCode::Enter));
        insta::assert_snapshot!(
            page.get_help_msg().to_string(),
            @"Pick: enter | Move: up/down | Filter: type | Close: esc"
        );
    }

    #[test]
    fn test_render_shows_error_under_field() {
        let (mut page, mut rx) = get_test_page(&[field("Fruit", true, None)]);
        page.event_loop_once(&mut rx, get_char_evt('s'));
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal.draw(|f| page.render(f, f.area())).unwrap();
        let text = screen_rows(terminal.backend().buffer());

        let label_row = text.iter().position(|l| l.contains("Fruit")).unwrap();
        assert!(text[label_row + 2].contains("Select..."));
        assert!(text[label_row + 4].contains(REQUIRED_MESSAGE));
        assert!(text.iter().any(|l| l.contains("Not submitted yet")));
    }
}
