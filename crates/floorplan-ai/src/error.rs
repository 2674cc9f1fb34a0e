use std::fmt;

use crate::provider::GatewayError;

/// Everything that can go wrong between a user action and a usable scene.
/// Raw model text is preserved wherever it informed the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    Input(String),
    Transport(String),
    Provider { status: u16, body: String },
    EmptyResponse,
    Parse { detail: String, raw: String },
    Validation { violations: Vec<String>, raw: String },
}

impl LayoutError {
    /// Stable machine-readable code, part of the HTTP error contract.
    pub fn code(&self) -> &'static str {
        match self {
            LayoutError::Input(_) => "input",
            LayoutError::Transport(_) => "transport",
            LayoutError::Provider { .. } => "provider",
            LayoutError::EmptyResponse => "empty_response",
            LayoutError::Parse { .. } => "parse",
            LayoutError::Validation { .. } => "validation",
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Input(message) => write!(f, "invalid input: {message}"),
            LayoutError::Transport(message) => {
                write!(f, "provider request failed: {message}")
            }
            LayoutError::Provider { status, body } => {
                write!(f, "provider returned status {status}: {body}")
            }
            LayoutError::EmptyResponse => f.write_str("provider returned no completion text"),
            LayoutError::Parse { detail, .. } => {
                write!(f, "model reply is not a scene array: {detail}")
            }
            LayoutError::Validation { violations, .. } => {
                write!(
                    f,
                    "model scene violates layout constraints: {}",
                    violations.join("; ")
                )
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<GatewayError> for LayoutError {
    fn from(value: GatewayError) -> Self {
        match value {
            GatewayError::Transport(message) => LayoutError::Transport(message),
            GatewayError::Provider { status, body } => LayoutError::Provider { status, body },
            GatewayError::EmptyResponse => LayoutError::EmptyResponse,
        }
    }
}
