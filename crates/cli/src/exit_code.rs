//! Exit code definitions for the stk CLI
//!
//! Scripts depend on these values. Changing one is a breaking change.

use http::StatusCode;
use stk_core::Error;

/// Exit codes for the stk CLI application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error
    GeneralError = 1,

    /// User input error: invalid arguments, malformed path, etc.
    UsageError = 2,

    /// Retryable network error: timeout, connection reset, 503, etc.
    NetworkError = 3,

    /// Authentication failure, including an expired token
    AuthError = 4,

    /// Container or object does not exist
    NotFound = 5,

    /// Conflict or precondition failure
    Conflict = 6,
}

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns None if the value doesn't correspond to a known exit code
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            _ => None,
        }
    }

    /// Exit code for a core error
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Exit code for a failed (non-2xx) response
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::AuthError,
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Self::Conflict,
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => Self::NetworkError,
            s if s.is_client_error() => Self::UsageError,
            _ => Self::GeneralError,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or path format",
            Self::NetworkError => "Network error (retryable)",
            Self::AuthError => "Authentication failure",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflict or precondition failure",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::NetworkError.as_i32(), 3);
        assert_eq!(ExitCode::AuthError.as_i32(), 4);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
        assert_eq!(ExitCode::Conflict.as_i32(), 6);
    }

    #[test]
    fn test_exit_code_round_trips_through_i32() {
        for code in 0..=6 {
            assert_eq!(ExitCode::from_i32(code).unwrap().as_i32(), code);
        }
        assert_eq!(ExitCode::from_i32(7), None);
    }

    #[test]
    fn test_from_status() {
        assert_eq!(ExitCode::from_status(StatusCode::NOT_FOUND), ExitCode::NotFound);
        assert_eq!(ExitCode::from_status(StatusCode::UNAUTHORIZED), ExitCode::AuthError);
        assert_eq!(ExitCode::from_status(StatusCode::FORBIDDEN), ExitCode::AuthError);
        assert_eq!(
            ExitCode::from_status(StatusCode::PRECONDITION_FAILED),
            ExitCode::Conflict
        );
        assert_eq!(
            ExitCode::from_status(StatusCode::SERVICE_UNAVAILABLE),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from_status(StatusCode::LENGTH_REQUIRED),
            ExitCode::UsageError
        );
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::Auth("expired".into())),
            ExitCode::AuthError
        );
        assert_eq!(
            ExitCode::from_error(&Error::MissingParameter("object_name")),
            ExitCode::UsageError
        );
        assert_eq!(
            ExitCode::from_error(&Error::General("boom".into())),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn test_exit_code_display() {
        let display = ExitCode::NotFound.to_string();
        assert!(display.contains('5'));
        assert!(display.contains("not found"));
    }
}
