//! Error types for simulator operations
//!
//! One error enum covers every layer. Each variant maps to the error code the
//! simulated provider would return, see [`Error::code`].
//!
//! ## Error Codes
//!
//! | Variant | Code |
//! |---------|------|
//! | IncorrectInstanceState | `IncorrectInstanceState` |
//! | NoInstanceFound | `InvalidInstanceID.NotFound` |
//! | ExceededWaitAttempts | `ResourceNotReady` |
//! | Cancelled | `RequestCanceled` |
//! | QueryFailed | `InternalError` |
//! | InvalidParameter | `InvalidParameterValue` |
//! | Config | `InvalidConfiguration` |
//! | Runtime | `InternalError` |

use crate::state::{InstanceState, Operation};
use crate::types::InstanceId;
use thiserror::Error;

/// All simulator errors.
///
/// Errors are scoped to the request that raised them; none is retried
/// internally except by the waiter's bounded polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Operation attempted from a state with no defined edge
    #[error("cannot {operation} instance {instance_id} while it is {state}")]
    IncorrectInstanceState {
        /// Instance the operation targeted
        instance_id: InstanceId,
        /// State observed when the request was validated
        state: InstanceState,
        /// Requested operation
        operation: Operation,
    },

    /// Referenced instance id is not in the registry
    #[error("no instance found with id {0}")]
    NoInstanceFound(InstanceId),

    /// Waiter attempt budget exhausted before the condition held
    #[error("exceeded wait attempts ({attempts})")]
    ExceededWaitAttempts {
        /// Number of polls issued
        attempts: u32,
    },

    /// Caller cancelled the wait
    #[error("waiter cancelled")]
    Cancelled,

    /// Query engine failure
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Invalid request parameter (launch count, filter, config value)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),

    /// Async runtime problem (no runtime, task panicked)
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Provider error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::IncorrectInstanceState { .. } => "IncorrectInstanceState",
            Error::NoInstanceFound(_) => "InvalidInstanceID.NotFound",
            Error::ExceededWaitAttempts { .. } => "ResourceNotReady",
            Error::Cancelled => "RequestCanceled",
            Error::QueryFailed(_) | Error::Runtime(_) => "InternalError",
            Error::InvalidParameter(_) => "InvalidParameterValue",
            Error::Config(_) => "InvalidConfiguration",
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NoInstanceFound(_))
    }

    /// Check if this error is retryable.
    ///
    /// State errors may clear once an in-flight transition lands; query
    /// failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::IncorrectInstanceState { .. } | Error::QueryFailed(_)
        )
    }

    /// Check if the error came from a waiter giving up or being cancelled.
    pub fn is_wait_error(&self) -> bool {
        matches!(self, Error::ExceededWaitAttempts { .. } | Error::Cancelled)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
