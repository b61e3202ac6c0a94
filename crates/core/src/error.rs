//! Error types for stk-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for stk-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stk-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Profile not found
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Profile already exists
    #[error("Profile already exists: {0}")]
    ProfileExists(String),

    /// A required identifier (container or object name) was not supplied
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Header name or value cannot be sent over HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// An entity outlived the client that produced it
    #[error("Client for {0} has been dropped")]
    ClientDropped(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Build an error from a non-success HTTP status
    ///
    /// `context` names the resource the request was addressed to.
    pub fn from_status(status: StatusCode, context: impl Into<String>) -> Self {
        let context = context.into();
        match status {
            StatusCode::NOT_FOUND => Error::NotFound(context),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Error::Auth(format!("{context} ({status})"))
            }
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Error::Conflict(format!("{context} ({status})"))
            }
            _ => Error::Network(format!("{context} ({status})")),
        }
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidPath(_) | Error::MissingParameter(_) => 2, // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,            // UsageError
            Error::Network(_) => 3,                                  // NetworkError
            Error::Auth(_) => 4,                                     // AuthError
            Error::NotFound(_) | Error::ProfileNotFound(_) => 5,     // NotFound
            Error::Conflict(_) | Error::ProfileExists(_) => 6,       // Conflict
            _ => 1,                                                  // GeneralError
        }
    }
}
