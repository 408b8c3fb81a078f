//! Error types for the file-manager core.
//!
//! - [`RequestFailure`] - a mutating WebDAV request that did not succeed
//! - [`FetchError`] - loading a directory fragment for in-place navigation

use thiserror::Error;

/// Terminal outcome of a single PUT/PATCH/MKCOL attempt that did not succeed.
///
/// The `Display` form is what ends up in the user-visible error log, so it is
/// kept to the bare reason: the status code, or `connection`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestFailure {
    /// No response was received (network down, CORS, aborted).
    #[error("connection")]
    NoConnection,
    /// The server answered outside 200-299.
    #[error("{0}")]
    Status(u16),
    /// The local file could not be sliced into a request body.
    #[error("unreadable")]
    UnreadableFile,
}

impl RequestFailure {
    /// Classify a finished request by its HTTP status.
    ///
    /// Status `0` is what browsers report when no response arrived.
    pub fn check_status(status: u16) -> Result<(), Self> {
        match status {
            0 => Err(Self::NoConnection),
            200..=299 => Ok(()),
            other => Err(Self::Status(other)),
        }
    }
}

/// Errors raised while fetching a directory fragment.
///
/// None of these reach the user: the navigator answers every one of them
/// with a full page load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Browser window not available
    #[error("browser window not available")]
    NoWindow,
    /// Network request failed (timeout, CORS, etc.)
    #[error("network error: {0}")]
    Network(String),
    /// HTTP error response (non-2xx status)
    #[error("HTTP error: {0}")]
    Http(u16),
    /// Failed to read response body
    #[error("failed to read response")]
    ResponseReadFailed,
    /// The response is not a listing document
    #[error("invalid listing document: {0}")]
    InvalidDocument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status() {
        assert_eq!(RequestFailure::check_status(200), Ok(()));
        assert_eq!(RequestFailure::check_status(201), Ok(()));
        assert_eq!(RequestFailure::check_status(299), Ok(()));
        assert_eq!(
            RequestFailure::check_status(0),
            Err(RequestFailure::NoConnection)
        );
        assert_eq!(
            RequestFailure::check_status(199),
            Err(RequestFailure::Status(199))
        );
        assert_eq!(
            RequestFailure::check_status(507),
            Err(RequestFailure::Status(507))
        );
    }

    #[test]
    fn test_failure_display() {
        assert_eq!(RequestFailure::NoConnection.to_string(), "connection");
        assert_eq!(RequestFailure::Status(403).to_string(), "403");
    }
}
