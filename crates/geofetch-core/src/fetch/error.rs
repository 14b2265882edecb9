use thiserror::Error;

use crate::retry::{AttemptError, RetryError, StopReason};

/// Terminal failure of a fetch call. Every variant carries the URL; only the
/// last attempt's failure is kept.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A non-retryable status (e.g. 404) ended the loop early.
    #[error("failed to get remote content -> {url}: {source}")]
    Terminal { url: String, source: AttemptError },
    /// Every permitted attempt failed with a retryable error.
    #[error("failed to get remote content -> {url}: {source}")]
    Exhausted { url: String, source: AttemptError },
    /// The caller's deadline passed before the loop could finish.
    #[error("failed to get remote content -> {url}: deadline exceeded{}", last_suffix(.last))]
    DeadlineExceeded {
        url: String,
        last: Option<AttemptError>,
    },
    /// No attempt produced an outcome.
    #[error("failed to get remote content -> {url}")]
    NoAttempt { url: String },
    /// The 200 response body could not be read to the end.
    #[error("failed to read remote content -> {url}: {source}")]
    Body { url: String, source: std::io::Error },
}

fn last_suffix(last: &Option<AttemptError>) -> String {
    match last {
        Some(e) => format!(" (last error: {})", e),
        None => String::new(),
    }
}

impl FetchError {
    pub(crate) fn from_retry(url: &str, err: RetryError) -> Self {
        let url = url.to_string();
        match (err.stop, err.last) {
            (StopReason::DeadlineExceeded, last) => FetchError::DeadlineExceeded { url, last },
            (StopReason::Terminal, Some(source)) => FetchError::Terminal { url, source },
            (StopReason::Exhausted, Some(source)) => FetchError::Exhausted { url, source },
            (_, None) => FetchError::NoAttempt { url },
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Terminal { url, .. }
            | FetchError::Exhausted { url, .. }
            | FetchError::DeadlineExceeded { url, .. }
            | FetchError::NoAttempt { url }
            | FetchError::Body { url, .. } => url,
        }
    }

    /// The last attempt's failure, if any was recorded.
    pub fn last_attempt(&self) -> Option<&AttemptError> {
        match self {
            FetchError::Terminal { source, .. } | FetchError::Exhausted { source, .. } => {
                Some(source)
            }
            FetchError::DeadlineExceeded { last, .. } => last.as_ref(),
            FetchError::NoAttempt { .. } | FetchError::Body { .. } => None,
        }
    }

    /// HTTP status of the last rejected response, if the last failure was one.
    pub fn status_code(&self) -> Option<u16> {
        self.last_attempt().and_then(AttemptError::status_code)
    }
}
