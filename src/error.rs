//! Error types and handling for the `SkySense` service

use thiserror::Error;

/// Failure of a single remote call (geocoding, weather or completion).
///
/// The dispatcher treats every variant as "absent", the distinction only
/// matters for diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Connection error, timeout or any other failure before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status code
    #[error("remote returned status {status}")]
    Status { status: u16 },

    /// The response body did not have the expected shape
    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// The lookup succeeded but produced no result
    #[error("no result for '{0}'")]
    NotFound(String),

    /// No credential is configured for the provider
    #[error("missing credential for {0}")]
    MissingCredential(&'static str),
}

impl ClientError {
    /// Short label used as a structured logging field
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "transport",
            ClientError::Status { .. } => "status",
            ClientError::Shape(_) => "shape",
            ClientError::NotFound(_) => "not_found",
            ClientError::MissingCredential(_) => "missing_credential",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Shape(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Status {
                status: status.as_u16(),
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result of a remote call
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Main error type for the `SkySense` application
#[derive(Error, Debug)]
pub enum SkySenseError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl SkySenseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Recover a configuration error that travelled through `anyhow`.
    /// Anything else becomes a `Config` error carrying the whole context chain.
    pub fn config_from(err: anyhow::Error) -> Self {
        match err.downcast::<SkySenseError>() {
            Ok(err) => err,
            Err(err) => Self::config(format!("{err:#}")),
        }
    }

    /// Message printed to the terminal by the binary
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkySenseError::Config { message } => {
                format!("SkySense is misconfigured: {message}")
            }
            SkySenseError::Io { source } => format!("I/O failure: {source}"),
            SkySenseError::General { message } => message.clone(),
        }
    }
}
