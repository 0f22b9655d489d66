use std::time::Duration;
use thiserror::Error;

/// Failures of a single HTTP fetch.
///
/// Payloads are plain strings so the error stays `Clone`: a client that could
/// not be built is replayed as the same error for every request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("invalid header format: {0}")]
    InvalidHeader(String),

    #[error("invalid proxy URL {proxy}: {reason}")]
    InvalidProxy { proxy: String, reason: String },

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("error building HTTP client: {0}")]
    Client(String),

    #[error("error creating request: {0}")]
    InvalidRequest(String),

    #[error("error making request: timeout after {0:?}")]
    Timeout(Duration),

    #[error("error making request: {0}")]
    Network(String),

    #[error("error reading response body: {0}")]
    BodyRead(String),
}

impl FetchError {
    /// Errors raised before anything was put on the wire.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidHeader(_)
                | FetchError::InvalidProxy { .. }
                | FetchError::InvalidMethod(_)
                | FetchError::Client(_)
                | FetchError::InvalidRequest(_)
        )
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::Timeout(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RewriteError {
    #[error("error parsing URL: {0}")]
    InvalidUrl(String),
}

/// Why a single input URL produced no output line.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("error writing to file: {0}")]
    Write(#[from] std::io::Error),
}

impl ProcessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessError::Fetch(e) if e.is_configuration() => ErrorKind::Configuration,
            ProcessError::Fetch(FetchError::BodyRead(_)) => ErrorKind::BodyRead,
            ProcessError::Fetch(_) => ErrorKind::Network,
            ProcessError::Rewrite(_) => ErrorKind::Rewrite,
            ProcessError::Write(_) => ErrorKind::Write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Network,
    BodyRead,
    Rewrite,
    Write,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Network => "network",
            ErrorKind::BodyRead => "body_read",
            ErrorKind::Rewrite => "rewrite",
            ErrorKind::Write => "write",
        }
    }
}
