//! CLI error type and process exit codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] govly_core::CoreError),

    #[error(transparent)]
    Config(#[from] govly_config::ConfigError),

    #[error("{resource_type} not found: {identifier} (try `govly {list_command}`)")]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code: 2 for auth problems, 3 for lookups, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(govly_core::CoreError::AuthenticationRequired) => 2,
            Self::Core(govly_core::CoreError::DeviceNotFound { .. }) | Self::NotFound { .. } => 3,
            _ => 1,
        }
    }
}
