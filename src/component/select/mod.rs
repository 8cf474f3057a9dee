//! A labeled select input whose selection follows an externally owned value.
//!
//! The caller owns `value`. The input keeps a cached lookup of the option matching it
//! (the displayed selection) and recomputes that cache whenever `value` or `options`
//! change. A pick made by the user is shown immediately and reported through
//! `on_change`; the caller is expected to feed it back with [`SelectInput::set_value`].
//! A pick that is never fed back is overwritten by the next recomputation.

pub(crate) mod dropdown;
pub(crate) mod styles;

use std::fmt::Debug;

use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph},
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    actions::{Action, ActionSender, CompAction},
    page::WidgetExt,
    tui::Event,
    utils::help_msg::HelpMsg,
};

use dropdown::{ControlMsg, Dropdown, SelectControl, Selection};
use styles::{ClassStyles, ControlState, ERROR_COLOR, SelectStyles, SubPart, Width};

/// Bounds for the value carried by an option.
pub(crate) trait OptionValue: Clone + PartialEq + Debug + Send + Sync + 'static {}
impl<T> OptionValue for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// One choice: what to show, and what it stands for.
///
/// A missing field in deserialized input becomes the type's default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub(crate) struct SelectOption<T> {
    pub label: String,
    pub value: T,
}

impl<T> SelectOption<T> {
    pub fn new<L: Into<String>>(label: L, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SelectInputProps<T> {
    pub options: Vec<SelectOption<T>>,
    /// The caller's source of truth for what is selected
    pub value: Option<T>,
    pub style_class: String,
    pub width: Width,
    /// Shown under the control when non-empty
    pub error_message: String,
    pub label_text: String,
}

impl<T> Default for SelectInputProps<T> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            value: None,
            style_class: String::new(),
            width: Width::default(),
            error_message: String::new(),
            label_text: String::new(),
        }
    }
}

impl<T> SelectInputProps<T> {
    pub fn options(self, options: Vec<SelectOption<T>>) -> Self {
        Self { options, ..self }
    }
    pub fn value(self, value: Option<T>) -> Self {
        Self { value, ..self }
    }
    pub fn style_class<S: Into<String>>(self, style_class: S) -> Self {
        Self {
            style_class: style_class.into(),
            ..self
        }
    }
    pub fn width<W: Into<Width>>(self, width: W) -> Self {
        Self {
            width: width.into(),
            ..self
        }
    }
    #[allow(dead_code)]
    pub fn error_message<S: Into<String>>(self, error_message: S) -> Self {
        Self {
            error_message: error_message.into(),
            ..self
        }
    }
    pub fn label_text<S: Into<String>>(self, label_text: S) -> Self {
        Self {
            label_text: label_text.into(),
            ..self
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SelectMode {
    #[default]
    Idle,
    Focused,
}

#[derive(Clone, Debug)]
pub(crate) enum SelectAction {
    SwitchMode(SelectMode),
    Control(ControlMsg),
}

pub(crate) type OnChange<T> = Box<dyn Fn(Option<T>) + Send + Sync>;

pub(crate) struct SelectInput<T> {
    id: u64,
    tx: ActionSender,
    props: SelectInputProps<T>,
    /// Cached lookup of `props.value` in `props.options`
    selected: Option<SelectOption<T>>,
    mode: SelectMode,
    on_change: OnChange<T>,

    control: Box<dyn SelectControl>,
    styles: SelectStyles,
    classes: ClassStyles,
    /// Where the control box was last drawn, to anchor the menu
    control_area: Option<Rect>,
}

impl<T: OptionValue> SelectInput<T> {
    pub fn new(id: u64, tx: ActionSender, props: SelectInputProps<T>) -> Self {
        let mut input = Self {
            id,
            tx,
            props,
            selected: None,
            mode: SelectMode::default(),
            on_change: Box::new(|_| {}),
            control: Box::new(Dropdown::default()),
            styles: SelectStyles::default(),
            classes: ClassStyles::default(),
            control_area: None,
        };
        input.control.set_entries(input.labels());
        input.synchronize();
        input
    }

    pub fn on_change<F>(self, f: F) -> Self
    where
        F: Fn(Option<T>) + Send + Sync + 'static,
    {
        Self {
            on_change: Box::new(f),
            ..self
        }
    }

    /// Swap the options control for another implementation.
    pub fn control<C: SelectControl + 'static>(mut self, control: C) -> Self {
        self.control = Box::new(control);
        self.control.set_styles(self.styles.clone());
        self.control.set_entries(self.labels());
        self.synchronize();
        self
    }

    pub fn styles(mut self, styles: SelectStyles) -> Self {
        self.control.set_styles(styles.clone());
        self.styles = styles;
        self
    }

    pub fn classes(self, classes: ClassStyles) -> Self {
        Self { classes, ..self }
    }

    /// Apply a new set of props. The selection is recomputed only if `value` or
    /// `options` differ from the current ones.
    #[allow(dead_code)]
    pub fn set_props(&mut self, props: SelectInputProps<T>) {
        let options_changed = props.options != self.props.options;
        let value_changed = props.value != self.props.value;
        self.props = props;
        if options_changed {
            self.control.set_entries(self.labels());
        }
        if options_changed || value_changed {
            self.synchronize();
        }
    }

    pub fn set_value(&mut self, value: Option<T>) {
        if value != self.props.value {
            self.props.value = value;
            self.synchronize();
        }
    }

    #[allow(dead_code)]
    pub fn set_options(&mut self, options: Vec<SelectOption<T>>) {
        if options != self.props.options {
            self.props.options = options;
            self.control.set_entries(self.labels());
            self.synchronize();
        }
    }

    pub fn set_error_message<S: Into<String>>(&mut self, error_message: S) {
        self.props.error_message = error_message.into();
    }

    pub fn props(&self) -> &SelectInputProps<T> {
        &self.props
    }

    /// The option currently shown as chosen.
    #[allow(dead_code)]
    pub fn selected(&self) -> Option<&SelectOption<T>> {
        self.selected.as_ref()
    }

    pub fn has_error(&self) -> bool {
        !self.props.error_message.is_empty()
    }

    /// Rows needed to draw the input, excluding the open menu.
    pub fn height(&self) -> u16 {
        if self.has_error() { 5 } else { 4 }
    }

    pub fn get_switch_mode_action(&self, mode: SelectMode) -> Action {
        self.get_action(SelectAction::SwitchMode(mode))
    }

    pub fn get_help_msg(&self) -> HelpMsg {
        match self.mode {
            SelectMode::Focused => self.control.help_msg(),
            SelectMode::Idle => HelpMsg::default(),
        }
    }

    /// Draw the open menu, if any, over whatever is below the control.
    ///
    /// Kept apart from [`WidgetExt::render`] so that a page can draw every input
    /// first and the menu last.
    pub fn render_overlay(&mut self, frame: &mut Frame) {
        let state = self.control_state();
        if let Some(anchor) = self.control_area {
            self.control.render_menu(frame, anchor, &state);
        }
    }

    fn labels(&self) -> Vec<String> {
        self.props.options.iter().map(|o| o.label.clone()).collect()
    }

    fn synchronize(&mut self) {
        let position = self
            .props
            .value
            .as_ref()
            .and_then(|value| self.props.options.iter().position(|o| &o.value == value));
        self.selected = position.and_then(|i| self.props.options.get(i)).cloned();
        self.control.set_current(position);
        debug!(
            "Select input {} synchronized to {:?} from value {:?}",
            self.id, self.selected, self.props.value
        );
    }

    fn apply_selection(&mut self, selection: Selection) {
        match selection {
            Selection::Picked(index) => {
                let Some(option) = self.props.options.get(index).cloned() else {
                    warn!(
                        "Select input {} ignored pick of stale index {}",
                        self.id, index
                    );
                    return;
                };
                info!("Select input {} picked {:?}", self.id, option);
                let value = option.value.clone();
                self.selected = Some(option);
                (self.on_change)(Some(value));
            }
            Selection::Cleared => {
                info!("Select input {} cleared", self.id);
                self.selected = None;
                (self.on_change)(None);
            }
        }
    }

    fn control_state(&self) -> ControlState {
        ControlState {
            focused: matches!(self.mode, SelectMode::Focused),
            open: self.control.is_open(),
            error: self.has_error(),
            has_value: self.selected.is_some(),
        }
    }

    fn get_action(&self, action: SelectAction) -> Action {
        Action::Comp((CompAction::Select(action), self.id))
    }

    fn unwrap_action(&self, action: &Action) -> Option<SelectAction> {
        let Action::Comp((CompAction::Select(action), id)) = action else {
            return None;
        };
        if *id != self.id {
            return None;
        }
        Some(action.clone())
    }
}

impl<T: OptionValue> super::Component for SelectInput<T> {
    fn get_id(&self) -> u64 {
        self.id
    }

    fn handle_events(&self, event: &Event) -> Result<()> {
        if matches!(self.mode, SelectMode::Focused) {
            if let Some(msg) = self.control.map_event(event) {
                self.tx.send(self.get_action(SelectAction::Control(msg)));
            }
        }
        Ok(())
    }

    fn update(&mut self, action: &Action) -> Result<()> {
        let Some(action) = self.unwrap_action(action) else {
            return Ok(());
        };
        let was_open = self.control.is_open();
        match action {
            SelectAction::SwitchMode(mode) => {
                self.mode = mode;
                if matches!(mode, SelectMode::Idle) && was_open {
                    self.control.update(ControlMsg::Close);
                }
            }
            SelectAction::Control(msg) => {
                if let Some(selection) = self.control.update(msg) {
                    self.apply_selection(selection);
                }
            }
        }
        let open = self.control.is_open();
        if open != was_open {
            self.tx.send(Action::SwitchInputMode(open));
        }
        Ok(())
    }
}

impl<T: OptionValue> WidgetExt for SelectInput<T> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = Rect {
            width: self.props.width.resolve(area.width),
            ..area
        };
        let state = self.control_state();

        let container = match self.classes.get(&self.props.style_class) {
            Some(class) => class.patch(Style::default()),
            None => Style::default(),
        };
        frame.render_widget(
            Block::default().style(self.styles.resolve(SubPart::Container, container, &state)),
            area,
        );

        let [label_area, control_area, error_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(self.props.label_text.as_str()).style(self.styles.resolve(
                SubPart::Label,
                Style::default().add_modifier(Modifier::BOLD),
                &state,
            )),
            label_area,
        );

        let border = if state.error {
            Style::default().fg(ERROR_COLOR)
        } else if state.open {
            Color::Yellow.into()
        } else if state.focused {
            Color::Cyan.into()
        } else {
            Style::default()
        };
        self.control.render_control(frame, control_area, &state, border);
        self.control_area = Some(control_area);

        if state.error {
            frame.render_widget(
                Paragraph::new(self.props.error_message.as_str()).style(self.styles.resolve(
                    SubPart::ErrorMessage,
                    Style::default().fg(ERROR_COLOR),
                    &state,
                )),
                error_area,
            );
        }
    }
}

#[cfg(test)]
impl<T: OptionValue> SelectInput<T> {
    pub fn get_mode(&self) -> SelectMode {
        self.mode
    }
    pub fn is_open(&self) -> bool {
        self.control.is_open()
    }
}
