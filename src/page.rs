//! Pages: full-screen layers that take part in the event loop.

use color_eyre::eyre::Result;
use downcast_rs::{DowncastSync, impl_downcast};
use ratatui::{Frame, layout::Rect};

use crate::{actions::Action, tui::Event};

pub(crate) mod form;

/// A UI layer/page in the application.
pub(crate) trait Layer: WidgetExt + EventLoopParticipant + DowncastSync {
    fn init(&mut self) {}

    #[allow(dead_code)]
    fn get_name(&self) -> String;
}
impl_downcast!(sync Layer);

/// Anything that can draw itself into an area of the frame.
pub(crate) trait WidgetExt {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns events into actions, and applies actions.
///
/// Only `update` may change state.
pub(crate) trait EventLoopParticipant {
    fn handle_events(&self, event: &Event) -> Result<()>;

    fn update(&mut self, action: Action);

    /// Handle one event, then apply every action it produced.
    #[cfg(test)]
    fn event_loop_once(
        &mut self,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<Action>,
        event: Event,
    ) {
        self.handle_events(&event).unwrap();
        while let Ok(action) = rx.try_recv() {
            self.update(action);
        }
    }
}
