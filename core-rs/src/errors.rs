//! Error types for Saurus Core

use thiserror::Error;

/// Exit status used for every fatal boot path
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum BootError {
    #[error("Access credential unavailable: system locked")]
    MissingCredential,

    #[error("Access denied after {attempts} failed attempt(s)")]
    AccessDenied { attempts: u32 },

    #[error("Operator input closed before verification completed")]
    InputClosed,

    #[error("Token database descriptor not found")]
    MissingTokenDatabase,

    #[error("No active tokens in database")]
    NoActiveTokens,

    #[error("Local token is not registered: {masked}")]
    UnauthorizedToken { masked: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Bot runtime error: {0}")]
    Runtime(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Role error: {0}")]
    Role(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl BootError {
    /// Process exit status for this failure. Every named failure is terminal.
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }

    /// True for failures caused by the operator or token allow-list rather than
    /// transport or configuration problems
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            BootError::AccessDenied { .. }
                | BootError::InputClosed
                | BootError::UnauthorizedToken { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BootError>;
