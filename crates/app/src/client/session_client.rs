use anyhow::Result;
use lgit_core::app::{Command, CommandKind};
use tracing::debug;

use super::model::ClientModel;
use super::update::ClientMessage;
use crate::services::SessionHandle;

/// A [`ClientModel`] wired to a running session
pub struct SessionClient {
    pub model: ClientModel,
    handle: SessionHandle,
}

impl SessionClient {
    pub fn new(handle: SessionHandle) -> Self {
        Self {
            model: ClientModel::new(),
            handle,
        }
    }

    /// Act on an update result
    pub async fn dispatch(&mut self, message: ClientMessage) -> Result<Option<CommandKind>> {
        match message {
            ClientMessage::Command(command) => self.send(command).await,
            ClientMessage::None => Ok(None),
        }
    }

    /// Send one command and fold its reply into the model. Writes are always
    /// followed by a fresh status, whether they succeeded or not.
    pub async fn send(&mut self, command: Command) -> Result<Option<CommandKind>> {
        self.model.clear_messages();
        let applied = self.exchange(command).await?;

        if matches!(applied, Some(CommandKind::Stage | CommandKind::Commit)) {
            debug!("Refreshing status after write");
            self.exchange(Command::status()).await?;
        }

        Ok(applied)
    }

    async fn exchange(&mut self, command: Command) -> Result<Option<CommandKind>> {
        let request = self.model.prepare(command);
        let response = self.handle.send(request).await?;
        Ok(self.model.apply_response(response))
    }
}
