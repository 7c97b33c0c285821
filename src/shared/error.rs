use std::fmt;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - no findings at or above the configured threshold
    Success = 0,
    /// Findings were detected at or above the configured threshold
    VulnerabilitiesDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (API error, cache error, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::VulnerabilitiesDetected => write!(f, "Vulnerabilities Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Boxed error used to carry the cause of an upstream failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the resolution pipeline.
///
/// Each variant is a distinct kind so callers can map them to user-facing
/// behavior (hints, exit codes) without string matching.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Bulletin not found: {id}")]
    NotFound { id: String },

    #[error("Offline data not synced\n\n💡 Hint: Run 'vulngate offline sync' first")]
    DataMissing,

    #[error("Cache unavailable\n\n💡 Hint: Check that the cache directory is writable")]
    Unavailable,

    #[error("Operation canceled")]
    Canceled,

    #[error("Upstream request failed: {operation}")]
    Upstream {
        operation: String,
        #[source]
        source: BoxError,
    },

    #[error("All {attempted} component lookup(s) failed; results would be empty")]
    AllLookupsFailed { attempted: usize },

    #[error("Cache storage error: {operation}")]
    Storage {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ResolveError {
    pub fn upstream(operation: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ResolveError::Upstream {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        ResolveError::Storage {
            operation: operation.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ResolveError::Validation {
            message: message.into(),
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, ResolveError::Canceled)
    }

    /// True for both a single cache miss and a never-synced cache.
    pub fn is_data_missing(&self) -> bool {
        matches!(
            self,
            ResolveError::DataMissing | ResolveError::NotFound { .. }
        )
    }
}
