pub(crate) mod select;

use color_eyre::eyre::Result;

use crate::{actions::Action, page::WidgetExt, tui::Event};

/// A widget embedded in a page.
///
/// Components never change themselves while handling events: `handle_events` only sends
/// actions, addressed with the component id, and `update` applies them.
pub(crate) trait Component: WidgetExt {
    #[allow(dead_code)]
    fn get_id(&self) -> u64;

    fn handle_events(&self, event: &Event) -> Result<()>;

    fn update(&mut self, action: &Action) -> Result<()>;
}
