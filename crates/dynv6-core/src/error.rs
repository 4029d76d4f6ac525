//! Error types for the dynv6 update agent
//!
//! This module defines all error types used throughout the workspace.

use thiserror::Error;

/// Result type alias for dynv6 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dynv6 update agent
#[derive(Error, Debug)]
pub enum Error {
    /// A required setting is absent
    #[error("Missing required setting: {0}")]
    ConfigMissing(String),

    /// A setting is present but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Address fetch or update call exceeded its timeout
    #[error("Timed out: {0}")]
    ProviderTimeout(String),

    /// Non-timeout failure while talking to a provider
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The update endpoint answered with a non-success response
    #[error("Update rejected (code: {status}): {body}")]
    UpdateRejected {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Cache file could not be read or written
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing-setting error
    pub fn config_missing(key: impl Into<String>) -> Self {
        Self::ConfigMissing(key.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::ProviderTimeout(msg.into())
    }

    /// Create a provider-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    /// Whether the error must terminate the process.
    ///
    /// A rejection cannot succeed on retry with the same parameters, and a
    /// storage failure leaves the cache state unknown.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing(_)
                | Self::Config(_)
                | Self::UpdateRejected { .. }
                | Self::StorageFailure(_)
        )
    }

    /// Whether the error means "no definitive answer" from the remote side
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ProviderTimeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_and_storage_are_fatal() {
        let rejected = Error::UpdateRejected {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert!(rejected.is_fatal());
        assert!(Error::storage("disk full").is_fatal());
        assert!(Error::config_missing("hostname").is_fatal());
    }

    #[test]
    fn provider_errors_are_not_fatal() {
        assert!(!Error::timeout("api4.my-ip.io").is_fatal());
        assert!(!Error::unavailable("eth0 has no address").is_fatal());
        assert!(Error::timeout("dynv6.com").is_timeout());
        assert!(!Error::unavailable("connection refused").is_timeout());
    }

    #[test]
    fn rejection_message_carries_code_and_body() {
        let rejected = Error::UpdateRejected {
            status: 401,
            body: "invalid token".to_string(),
        };
        assert_eq!(
            rejected.to_string(),
            "Update rejected (code: 401): invalid token"
        );
    }
}
