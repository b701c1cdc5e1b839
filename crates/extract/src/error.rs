//! Error types for incident extraction.
//!
//! `ConfigError` is raised while building the workflow and aborts startup.
//! `LlmError` and `WorkflowError` are raised per request and end up in the
//! error envelope.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("model port {0} does not fit in 16 bits")]
    PortOutOfRange(u32),

    #[error("temperature {0} must lie in [0.0, 1.0]")]
    TemperatureOutOfRange(f64),

    #[error("model host must not be empty")]
    EmptyHost,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("failed to reach model host: {0}")]
    Transport(String),

    #[error("model host returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode model host response: {0}")]
    Decode(String),

    #[error("model host did not answer in time")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

impl WorkflowError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkflowError::Model(LlmError::Timeout))
    }
}
