//! Style overrides for the parts of a select input, kept as plain data.
//!
//! Every visible part of the widget is named by a [`SubPart`]. [`SelectStyles`] maps a
//! part to a function that receives the style the widget would use ("provided") and
//! the current [`ControlState`], and returns the style to draw with.

use std::{collections::HashMap, fmt, sync::Arc};

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use strum::{Display, EnumIter};

pub(crate) const ERROR_COLOR: Color = Color::Rgb(0xbf, 0x03, 0x03);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub(crate) enum SubPart {
    Container,
    Label,
    Control,
    IndicatorSeparator,
    DropdownIndicator,
    Menu,
    Option,
    ErrorMessage,
}

/// What a style function may depend on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlState {
    pub focused: bool,
    pub open: bool,
    pub error: bool,
    pub has_value: bool,
}

pub(crate) type StyleFn = Arc<dyn Fn(Style, &ControlState) -> Style + Send + Sync>;

#[derive(Clone)]
pub(crate) struct SelectStyles {
    overrides: HashMap<SubPart, StyleFn>,
}

impl fmt::Debug for SelectStyles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.overrides.keys()).finish()
    }
}

impl Default for SelectStyles {
    /// A compact control with a dimmed separator and indicator.
    fn default() -> Self {
        Self::empty()
            .with(SubPart::Control, |provided, _| {
                provided.remove_modifier(Modifier::BOLD)
            })
            .with(SubPart::IndicatorSeparator, |provided, _| {
                provided.add_modifier(Modifier::DIM)
            })
            .with(SubPart::DropdownIndicator, |provided, state| {
                if state.open {
                    provided
                } else {
                    provided.add_modifier(Modifier::DIM)
                }
            })
    }
}

impl SelectStyles {
    /// No overrides: every part is drawn with its provided style.
    pub(crate) fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    pub(crate) fn with<F>(mut self, part: SubPart, f: F) -> Self
    where
        F: Fn(Style, &ControlState) -> Style + Send + Sync + 'static,
    {
        self.overrides.insert(part, Arc::new(f));
        self
    }

    pub(crate) fn resolve(&self, part: SubPart, provided: Style, state: &ControlState) -> Style {
        match self.overrides.get(&part) {
            Some(f) => f(provided, state),
            None => provided,
        }
    }
}

/// Rendered width of the whole input.
///
/// Parsed leniently from CSS-like strings; see [`Width::parse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Width {
    Columns(u16),
    Percent(u16),
    Full,
}

impl Default for Width {
    fn default() -> Self {
        Width::parse("200")
    }
}

impl Width {
    /// `"30"` and `"30px"` are 30 columns, `"50%"` is half of the available width.
    /// Anything else takes the full width.
    pub(crate) fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(pct) = s.strip_suffix('%') {
            return pct
                .trim()
                .parse::<u16>()
                .map(|p| Width::Percent(p.min(100)))
                .unwrap_or(Width::Full);
        }
        let cols = s.strip_suffix("px").unwrap_or(s).trim();
        cols.parse::<u16>().map(Width::Columns).unwrap_or(Width::Full)
    }

    /// Columns to use out of `available`, never more than `available`.
    pub(crate) fn resolve(&self, available: u16) -> u16 {
        match *self {
            Width::Columns(c) => c.min(available),
            Width::Percent(p) => (u32::from(available) * u32::from(p) / 100) as u16,
            Width::Full => available,
        }
    }
}

impl From<&str> for Width {
    fn from(value: &str) -> Self {
        Width::parse(value)
    }
}

impl From<String> for Width {
    fn from(value: String) -> Self {
        Width::parse(&value)
    }
}

/// Colors a style class applies to the container of an input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct ClassStyle {
    #[serde(default)]
    pub fg: Option<Color>,
    #[serde(default)]
    pub bg: Option<Color>,
}

impl ClassStyle {
    pub(crate) fn patch(&self, style: Style) -> Style {
        let style = match self.fg {
            Some(fg) => style.fg(fg),
            None => style,
        };
        match self.bg {
            Some(bg) => style.bg(bg),
            None => style,
        }
    }
}

/// Style classes by name. Unknown names resolve to nothing.
pub(crate) type ClassStyles = HashMap<String, ClassStyle>;

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_width_parse() {
        assert_eq!(Width::parse("200"), Width::Columns(200));
        assert_eq!(Width::parse("30px"), Width::Columns(30));
        assert_eq!(Width::parse(" 12 px "), Width::Columns(12));
        assert_eq!(Width::parse("50%"), Width::Percent(50));
        assert_eq!(Width::parse("150%"), Width::Percent(100));
        assert_eq!(Width::parse("abc"), Width::Full);
        assert_eq!(Width::parse(""), Width::Full);
        assert_eq!(Width::parse("-3"), Width::Full);
        assert_eq!(Width::default(), Width::Columns(200));
    }

    #[test]
    fn test_width_resolve() {
        assert_eq!(Width::Columns(200).resolve(80), 80);
        assert_eq!(Width::Columns(30).resolve(80), 30);
        assert_eq!(Width::Percent(50).resolve(81), 40);
        assert_eq!(Width::Full.resolve(17), 17);
    }

    #[test]
    fn test_resolve_without_override_returns_provided() {
        let styles = SelectStyles::empty();
        let provided = Style::default().fg(Color::Cyan);
        for part in SubPart::iter() {
            assert_eq!(
                styles.resolve(part, provided, &ControlState::default()),
                provided
            );
        }
    }

    #[test]
    fn test_override_sees_state() {
        let styles = SelectStyles::empty().with(SubPart::Control, |provided, state| {
            if state.error {
                provided.fg(ERROR_COLOR)
            } else {
                provided
            }
        });
        let state = ControlState {
            error: true,
            ..Default::default()
        };
        assert_eq!(
            styles.resolve(SubPart::Control, Style::default(), &state).fg,
            Some(ERROR_COLOR)
        );
        assert_eq!(
            styles
                .resolve(SubPart::Control, Style::default(), &ControlState::default())
                .fg,
            None
        );
    }

    #[test]
    fn test_default_dims_closed_indicator() {
        let styles = SelectStyles::default();
        let closed = styles.resolve(
            SubPart::DropdownIndicator,
            Style::default(),
            &ControlState::default(),
        );
        assert!(closed.add_modifier.contains(Modifier::DIM));
        let open = styles.resolve(
            SubPart::DropdownIndicator,
            Style::default(),
            &ControlState {
                open: true,
                ..Default::default()
            },
        );
        assert!(!open.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_class_style_patch() {
        let class = ClassStyle {
            fg: Some(Color::Green),
            bg: None,
        };
        let style = class.patch(Style::default().bg(Color::Black));
        assert_eq!(style.fg, Some(Color::Green));
        assert_eq!(style.bg, Some(Color::Black));
    }
}
