//! Error types for console operations.

use crate::view::InvalidTransition;
use thiserror::Error;

/// Errors that can occur while driving the console.
#[derive(Debug, Error)]
pub enum Error {
    /// The registration form is missing its name or requirements text.
    #[error("product name and requirements document are both required")]
    IncompleteForm,

    /// Requirements extraction failed; nothing was committed.
    #[error(transparent)]
    ExtractionFailed(#[from] warden_claude::ExtractionFailed),

    /// The catalog rejected the operation.
    #[error(transparent)]
    Catalog(#[from] warden_policy::Error),

    /// The requested view change is not valid from the current view.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// A chat turn was refused without changing the session.
    #[error("turn rejected: {0}")]
    Rejected(#[from] crate::session::Rejection),

    /// A simulator operation was requested outside the simulator view.
    #[error("no policy is being simulated")]
    NotSimulating,
}

/// Result type for console operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failure_keeps_cause() {
        let failed = warden_claude::ExtractionFailed::from(warden_claude::Error::ParseError(
            "expected value".to_string(),
        ));
        let err = Error::from(failed);

        assert!(matches!(&err, Error::ExtractionFailed(e) if e.is_malformed()));
        assert!(err.to_string().contains("expected value"));
    }
}
