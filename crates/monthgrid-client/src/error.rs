//! Client error types.

use thiserror::Error;

use monthgrid_core::{TimeError, TracingError};
use monthgrid_providers::ProviderError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider error.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid month, date or timezone input.
    #[error("invalid input: {0}")]
    Time(#[from] TimeError),

    /// Output serialization failed.
    #[error("failed to serialize layout: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Logging could not be set up.
    #[error("failed to initialize logging: {0}")]
    Tracing(#[from] TracingError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
