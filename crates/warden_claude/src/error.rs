//! Error types for completion service operations.

use thiserror::Error;

/// Errors that can occur while talking to the completion service.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is missing. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// API request failed with a non-success status.
    #[error("API request failed: {0}")]
    ApiError(String),

    /// Rate limited.
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Number of seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// Invalid API key.
    #[error("invalid API key")]
    InvalidApiKey,

    /// Response parsing failed.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// Response parsed but does not fit the declared output schema.
    #[error("response does not match schema: {0}")]
    SchemaViolation(String),

    /// Network error.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// True for failures to reach the service or non-success responses.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ApiError(_) | Self::RateLimited { .. } | Self::InvalidApiKey | Self::Network(_)
        )
    }

    /// True when the service answered but the payload was unusable.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::ParseError(_) | Self::SchemaViolation(_))
    }
}

/// Extraction from a requirements document failed.
///
/// Covers both transport and malformed-payload failures; the classified
/// cause is kept.
#[derive(Debug, Error)]
#[error("failed to analyze requirements document: {source}")]
pub struct ExtractionFailed {
    #[from]
    source: Error,
}

impl ExtractionFailed {
    /// The underlying service error.
    #[must_use]
    pub const fn cause(&self) -> &Error {
        &self.source
    }

    /// True when the service could not be reached or refused the request.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        self.source.is_transport()
    }

    /// True when the service answered with an unusable payload.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        self.source.is_malformed()
    }
}

/// Result type alias for completion service operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_malformed_are_disjoint() {
        let transport = [
            Error::ApiError("500".to_string()),
            Error::RateLimited {
                retry_after_seconds: 1,
            },
            Error::InvalidApiKey,
        ];
        for e in &transport {
            assert!(e.is_transport());
            assert!(!e.is_malformed());
        }

        let malformed = [
            Error::ParseError("eof".to_string()),
            Error::SchemaViolation("empty".to_string()),
        ];
        for e in &malformed {
            assert!(e.is_malformed());
            assert!(!e.is_transport());
        }

        assert!(!Error::Configuration("missing".to_string()).is_transport());
    }

    #[test]
    fn extraction_failed_keeps_cause() {
        let failed = ExtractionFailed::from(Error::ParseError("not json".to_string()));
        assert!(failed.is_malformed());
        assert!(failed.to_string().contains("not json"));
    }
}
