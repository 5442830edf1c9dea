//! Wire envelopes exchanged over the command channel.
//!
//! Requests carry an explicit id that the session echoes back, so a client can
//! keep several requests in flight and still attribute every reply.

use serde::{Deserialize, Serialize};

use crate::app::commands::{Command, CommandKind};
use crate::domain::Outcome;
use crate::error::Result;

pub type RequestId = u64;

/// `{ "id", "cmd", "args", "cwd" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: RequestId,
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub cwd: String,
}

impl Request {
    pub fn new(id: RequestId, command: Command) -> Self {
        Self {
            id,
            cmd: command.kind.token().to_string(),
            args: command.args,
            cwd: command.cwd,
        }
    }

    /// Interpret the envelope as a command, rejecting unknown kinds.
    pub fn command(&self) -> Result<Command> {
        let kind: CommandKind = self.cmd.parse()?;
        Ok(Command::new(kind, self.args.clone(), self.cwd.clone()))
    }
}

/// `{ "id", "cmd", "repository", "result": { "state", "data" } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: RequestId,
    pub cmd: String,
    #[serde(default)]
    pub repository: String,
    pub result: Outcome,
}

impl Response {
    pub fn new(request: &Request, repository: impl Into<String>, result: Outcome) -> Self {
        Self {
            id: request.id,
            cmd: request.cmd.clone(),
            repository: repository.into(),
            result,
        }
    }
}
