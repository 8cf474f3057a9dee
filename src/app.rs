use color_eyre::eyre::Result;
use crossterm::event::{KeyCode::Char, KeyModifiers};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::{
    actions::Action,
    config::Config,
    page::{Layer, form::FormPage},
    tui::{self, TuiEnum},
};

pub(crate) struct RootState {
    pub should_quit: bool,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
    pub input_mode: bool,

    pub config: Config,
}

impl RootState {
    pub fn new(config: Config) -> Self {
        let (action_tx, action_rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            should_quit: false,
            action_tx,
            action_rx,
            input_mode: false,
            config,
        }
    }
}

pub(crate) struct App {
    pub page: Box<dyn Layer>,
    pub state: RootState,
    pub tui: TuiEnum,
}

impl App {
    pub fn new(state: RootState, tui: TuiEnum) -> Self {
        let mut page: Box<dyn Layer> = Box::new(FormPage::new(
            state.action_tx.clone().into(),
            &state.config.fields,
            &state.config.classes,
        ));
        page.init();
        Self { page, state, tui }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.tui.enter()?;

        loop {
            let e = self.tui.next().await?;
            self.handle_event(e)?;

            while let Ok(action) = self.state.action_rx.try_recv() {
                self.perform_action(action)?;
            }

            // application exit
            if self.state.should_quit {
                break;
            }
        }

        self.tui.exit()?;
        Ok(())
    }

    /// Turn a [`tui::Event`] into actions.
    ///
    /// Quitting and suspending are handled here; everything else is left to the page.
    /// While in input mode only `ctrl-c` is taken away from the page.
    fn handle_event(&self, event: tui::Event) -> Result<()> {
        let tx = &self.state.action_tx;
        match event {
            tui::Event::Tick => tx.send(Action::Tick)?,
            tui::Event::Render | tui::Event::Resize(_, _) => tx.send(Action::Render)?,
            tui::Event::Error => {
                error!("Failed to read terminal events, quitting");
                tx.send(Action::Quit)?
            }
            tui::Event::Key(key) if key.modifiers == KeyModifiers::CONTROL => match key.code {
                Char('c') => tx.send(Action::Quit)?,
                Char('z') => tx.send(Action::Suspend)?,
                _ => self.page.handle_events(&event)?,
            },
            tui::Event::Key(key) if !self.state.input_mode && key.code == Char('q') => {
                tx.send(Action::Quit)?
            }
            _ => self.page.handle_events(&event)?,
        }
        Ok(())
    }

    /// Apply an action.
    ///
    /// This SHOULD be the only place where the state of the application is changed.
    /// App-wide actions are handled here, the rest goes to the page.
    fn perform_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Tick => {}
            Action::Quit => {
                self.state.should_quit = true;
            }
            Action::Render => {
                self.tui.draw(|f| self.page.render(f, f.area()))?;
            }
            Action::Suspend => {
                debug!("Suspending");
                self.tui.suspend()?;
                self.state.action_tx.send(Action::Resume)?;
            }
            Action::Resume => {
                self.tui.resume()?;
                self.state.action_tx.send(Action::Render)?;
            }
            Action::SwitchInputMode(mode) => {
                self.state.input_mode = mode;
                self.page.update(action);
            }
            _ => {
                self.page.update(action);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn event_loop_once(&mut self, event: tui::Event) {
        self.handle_event(event).unwrap();
        while let Ok(action) = self.state.action_rx.try_recv() {
            self.perform_action(action).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use crate::{
        component::select::SelectOption,
        config::{AppConfig, FieldConfig},
        tui::TestTui,
        utils::key_events::test_utils::{get_char_evt, get_ctrl_evt, get_key_evt},
    };

    use super::*;

    fn get_test_app() -> App {
        let config = Config {
            config: AppConfig::default(),
            fields: vec![FieldConfig {
                label: "Fruit".into(),
                options: vec![
                    SelectOption::new("Apple", "apple".to_string()),
                    SelectOption::new("Banana", "banana".to_string()),
                    SelectOption::new("Cherry", "cherry".to_string()),
                ],
                value: None,
                required: true,
                width: "30".into(),
                class: String::new(),
                placeholder: None,
                clearable: true,
            }],
            classes: Default::default(),
        };
        let mut app = App::new(RootState::new(config), TestTui::new(60, 20).into());
        while let Ok(action) = app.state.action_rx.try_recv() {
            app.perform_action(action).unwrap();
        }
        app
    }

    fn screen(app: &App) -> String {
        let buffer = app.tui.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_quit() {
        let mut app = get_test_app();
        app.event_loop_once(get_char_evt('q'));
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_q_is_filter_text_in_input_mode() {
        let mut app = get_test_app();
        app.event_loop_once(get_key_evt(KeyCode::Enter));
        assert!(app.state.input_mode);
        app.event_loop_once(get_char_evt('q'));
        assert!(!app.state.should_quit);

        // ctrl-c always quits
        app.event_loop_once(get_ctrl_evt('c'));
        assert!(app.state.should_quit);
    }

    #[test]
    fn test_pick_and_render() {
        let mut app = get_test_app();
        app.event_loop_once(get_key_evt(KeyCode::Enter));
        app.event_loop_once(tui::Event::Render);
        let open = screen(&app);
        assert!(open.contains("Apple"));
        assert!(open.contains("Cherry"));

        app.event_loop_once(get_char_evt('b'));
        app.event_loop_once(get_key_evt(KeyCode::Enter));
        assert!(!app.state.input_mode);
        app.event_loop_once(tui::Event::Render);
        let closed = screen(&app);
        assert!(closed.contains("Banana"));
        assert!(!closed.contains("Cherry"));

        let page = app.page.downcast_ref::<FormPage>().unwrap();
        assert_eq!(page.get_name(), "Form");
    }

    #[tokio::test]
    async fn test_run_exits_on_quit() {
        let mut app = get_test_app();
        app.state.action_tx.send(Action::Quit).unwrap();
        app.run().await.unwrap();
        assert!(app.state.should_quit);
    }
}
