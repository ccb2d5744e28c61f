use thiserror::Error;

/// Crate-wide error type.
///
/// `Upstream` carries the provider's HTTP status; status 0 marks failures
/// that never produced one (transport errors, timeouts, undecodable
/// bodies). The enum is `Clone` because a single in-flight upstream call
/// can fail for several waiting callers at once.
#[derive(Error, Debug, Clone)]
pub enum NewsError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for NewsError {
    fn from(e: reqwest::Error) -> Self {
        NewsError::Upstream {
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
