//! Error types for feed sources.
//!
//! A [`ProviderError`] whose code is [`ProviderErrorCode::DataUnavailable`]
//! means no snapshot could be obtained at all. Callers treat it as an empty
//! month rather than a failure.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The feed could not be fetched (missing file, auth or network failure
    /// upstream).
    DataUnavailable,
    /// The feed was fetched but is not a valid events listing.
    InvalidResponse,
    /// Configuration error - missing or invalid source settings.
    ConfigurationError,
    /// Internal provider error - unexpected state, bug.
    InternalError,
}

impl ProviderErrorCode {
    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataUnavailable => "data_unavailable",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while obtaining a feed snapshot.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The source that generated this error (e.g. "file", "static").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates a data unavailable error.
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::DataUnavailable, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if the caller should fall back to an empty snapshot.
    pub fn is_data_unavailable(&self) -> bool {
        self.code == ProviderErrorCode::DataUnavailable
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(ProviderErrorCode::DataUnavailable.as_str(), "data_unavailable");
        assert_eq!(ProviderErrorCode::InvalidResponse.to_string(), "invalid_response");
    }

    #[test]
    fn provider_error_creation() {
        let err = ProviderError::data_unavailable("feed missing");
        assert_eq!(err.code(), ProviderErrorCode::DataUnavailable);
        assert_eq!(err.message(), "feed missing");
        assert!(err.provider().is_none());
        assert!(err.is_data_unavailable());
        assert!(!ProviderError::invalid_response("bad json").is_data_unavailable());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::invalid_response("expected object").with_provider("file");
        assert_eq!(err.to_string(), "[file] invalid_response: expected object");
    }

    #[test]
    fn provider_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("disk full");
        let err = ProviderError::internal("failed to read").with_source(io_err);
        assert!(err.source().is_some());
    }
}
