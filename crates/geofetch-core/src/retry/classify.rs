//! Classify attempt failures into retry kinds.

use super::error::AttemptError;

/// High-level classification of an attempt failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, DNS, timeout or otherwise malformed transfer. Always retried.
    Transport,
    /// Plausibly transient HTTP status (408, 425, 429, 500, 502, 503, 504).
    RetryableStatus(u16),
    /// Any other non-200 status. Stops the loop immediately.
    TerminalStatus(u16),
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::TerminalStatus(_))
    }
}

/// Whether a non-200 status code is worth another attempt.
pub fn is_retryable_status(code: u16) -> bool {
    matches!(code, 408 | 425 | 429 | 500 | 502 | 503 | 504)
}

/// Classify an attempt error into an ErrorKind.
pub fn classify(e: &AttemptError) -> ErrorKind {
    match e {
        AttemptError::Transport(_) | AttemptError::Multi(_) | AttemptError::MissingStatus => {
            ErrorKind::Transport
        }
        AttemptError::Status { code, .. } if is_retryable_status(*code) => {
            ErrorKind::RetryableStatus(*code)
        }
        AttemptError::Status { code, .. } => ErrorKind::TerminalStatus(*code),
    }
}
