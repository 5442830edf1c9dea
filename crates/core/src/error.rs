use thiserror::Error;

/// Wire code for commands sent before any repository was opened.
pub const E001: &str = "E001";

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Please open a git repository first.")]
    NoRepository,

    #[error("Unknown command: {token}")]
    UnknownCommand { token: String },

    #[error("Command '{command}' requires argument #{position} ({name})")]
    MissingArgument {
        command: String,
        position: usize,
        name: &'static str,
    },

    #[error("Malformed record: {source}")]
    MalformedRecord {
        #[from]
        source: serde_json::Error,
    },

    #[error("{source:#}")]
    Port { source: anyhow::Error },

    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl CoreError {
    /// Error code carried as element 0 of a failed result's data.
    ///
    /// Provider failures report the git error code name when one is found in
    /// the error chain, so clients can tell "not found" from I/O trouble.
    pub fn code(&self) -> String {
        match self {
            CoreError::NoRepository => E001.to_string(),
            CoreError::UnknownCommand { .. } => "ECMD".to_string(),
            CoreError::MissingArgument { .. } => "EARGS".to_string(),
            CoreError::MalformedRecord { .. } => "ERECORD".to_string(),
            CoreError::Port { source } => source
                .downcast_ref::<ProviderError>()
                .map(|provider| provider.code.clone())
                .unwrap_or_else(|| "EPROVIDER".to_string()),
            CoreError::Internal { .. } => "EINTERNAL".to_string(),
        }
    }

    /// Wrap a provider error.
    pub fn port(source: anyhow::Error) -> Self {
        CoreError::Port { source }
    }
}

/// Provider-native failure. Adapters use it as the root of an `anyhow` chain
/// so the code survives without the core knowing the provider's types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, CoreError>;
