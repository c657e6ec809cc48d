//! Error type definitions for the playlist sieve service.

use thiserror::Error;

/// Top-level application error type
///
/// The scheduled publish path logs these and continues on the next cycle;
/// the on-demand path maps them onto HTTP responses at the web boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream fetch failures (network error or non-success HTTP status)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Local filesystem errors persisting the output file
    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Errors reaching the upstream playlist source
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failures from the HTTP client
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a non-success status
    #[error("HTTP status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_status_error_names_the_upstream() {
        let err = AppError::Fetch(FetchError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
            url: "http://upstream/playlist.m3u".to_string(),
        });
        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(text.contains("http://upstream/playlist.m3u"));
    }

    #[test]
    fn write_error_wraps_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = AppError::from(io);
        assert!(matches!(err, AppError::Write(_)));
        assert!(err.to_string().starts_with("Write error:"));
    }
}
