use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Result payload of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireOutcome", from = "WireOutcome")]
pub enum Outcome {
    Success(Vec<String>),
    Failure { code: String, message: String },
}

impl Outcome {
    pub fn success(data: Vec<String>) -> Self {
        Outcome::Success(data)
    }

    pub fn empty() -> Self {
        Outcome::Success(Vec::new())
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Outcome::Failure {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Success payload, or `None` on failure
    pub fn data(&self) -> Option<&[String]> {
        match self {
            Outcome::Success(data) => Some(data),
            Outcome::Failure { .. } => None,
        }
    }
}

impl From<&CoreError> for Outcome {
    fn from(err: &CoreError) -> Self {
        Outcome::failure(err.code(), err.to_string())
    }
}

impl From<CoreError> for Outcome {
    fn from(err: CoreError) -> Self {
        Outcome::from(&err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum CommandState {
    Success,
    Fail,
}

/// `{ "state": "success" | "fail", "data": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireOutcome {
    state: CommandState,
    #[serde(default)]
    data: Vec<String>,
}

impl From<Outcome> for WireOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success(data) => WireOutcome {
                state: CommandState::Success,
                data,
            },
            Outcome::Failure { code, message } => WireOutcome {
                state: CommandState::Fail,
                data: vec![code, message],
            },
        }
    }
}

impl From<WireOutcome> for Outcome {
    fn from(wire: WireOutcome) -> Self {
        match wire.state {
            CommandState::Success => Outcome::Success(wire.data),
            CommandState::Fail => {
                let mut data = wire.data.into_iter();
                let code = data.next().unwrap_or_default();
                let message = data.next().unwrap_or_default();
                Outcome::Failure { code, message }
            }
        }
    }
}
