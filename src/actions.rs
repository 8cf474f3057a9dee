use color_eyre::eyre::Context;

use crate::{component::select::SelectAction, page::form::FormAction};

#[derive(Clone, Debug)]
pub(crate) enum Action {
    Tick,
    Render,
    Quit,
    Suspend,
    Resume,

    /// While `true`, every key goes to the active layer (a menu filter is being typed)
    SwitchInputMode(bool),

    Form(FormAction),

    /// Actions addressed to a single component, identified by its id
    Comp((CompAction, u64)),
}

#[derive(Clone, Debug)]
pub(crate) enum CompAction {
    Select(SelectAction),
}

#[derive(Clone, Debug)]
pub(crate) struct ActionSender(pub tokio::sync::mpsc::UnboundedSender<Action>);

impl ActionSender {
    pub fn send<T: Into<Action>>(&self, action: T) {
        self.0
            .send(action.into())
            .with_context(|| {
                "Action Receiver is dropped or closed, which should not happen if app is still running."
            })
            .unwrap();
    }
}

impl From<tokio::sync::mpsc::UnboundedSender<Action>> for ActionSender {
    fn from(value: tokio::sync::mpsc::UnboundedSender<Action>) -> Self {
        ActionSender(value)
    }
}
