use lgit_core::app::{Click, Command};

use super::model::{ChangeContext, ClientModel};

/// What the front end should do after an input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Send a command to the session
    Command(Command),

    /// No action needed
    None,
}

impl From<Option<Command>> for ClientMessage {
    fn from(command: Option<Command>) -> Self {
        command.map_or(ClientMessage::None, ClientMessage::Command)
    }
}

/// The Update function: turns user input into model changes and commands
pub struct ClientUpdate;

impl ClientUpdate {
    /// Click on a commit in the log
    pub fn click_commit(model: &mut ClientModel, sha: &str, click: Click) -> ClientMessage {
        model.selection.click_commit(sha, click).into()
    }

    /// Click on a file in the current change list. Which transition applies
    /// depends on whether the list shows working tree status or commit changes.
    pub fn click_file(model: &mut ClientModel, path: &str, click: Click) -> ClientMessage {
        match model.change_context {
            ChangeContext::Status => model.selection.click_status_file(path, click).into(),
            ChangeContext::Commit => model.selection.click_commit_file(path, &model.log).into(),
        }
    }

    /// Focus left the log area: drop every selection and the comparison
    pub fn click_outside(model: &mut ClientModel) -> ClientMessage {
        model.selection.reset();
        model.comparison = None;
        ClientMessage::None
    }

    pub fn open(_model: &mut ClientModel, path: &str) -> ClientMessage {
        ClientMessage::Command(Command::open(path))
    }

    pub fn refresh_status(_model: &mut ClientModel) -> ClientMessage {
        ClientMessage::Command(Command::status())
    }

    pub fn load_log(_model: &mut ClientModel) -> ClientMessage {
        ClientMessage::Command(Command::log())
    }

    /// Stage the selected status files, if any
    pub fn stage_selected(model: &mut ClientModel) -> ClientMessage {
        if model.change_context != ChangeContext::Status || model.selection.selected_files.is_empty() {
            return ClientMessage::None;
        }
        ClientMessage::Command(Command::stage(model.selection.selected_files.iter().cloned()))
    }

    pub fn commit(_model: &mut ClientModel, message: &str) -> ClientMessage {
        ClientMessage::Command(Command::commit(message))
    }
}
