//! Failure of a single fetch attempt, before retry classification.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttemptError {
    /// libcurl reported an error (connect refused, DNS, timeout, bad URL, ...).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// The multi handle driving the transfer failed.
    #[error("{0}")]
    Multi(#[from] curl::MultiError),
    /// The transfer ended without any HTTP status line.
    #[error("no HTTP status in response")]
    MissingStatus,
    /// The server answered with something other than 200.
    #[error("{text}")]
    Status { code: u16, text: String },
}

impl AttemptError {
    /// Builds a status error from the code and the reason phrase seen on the
    /// status line, using the canonical reason when the server sent none.
    pub fn status(code: u16, reason: Option<&str>) -> Self {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .or_else(|| {
                http::StatusCode::from_u16(code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(str::to_string)
            });
        let text = match reason {
            Some(r) => format!("{} {}", code, r),
            None => code.to_string(),
        };
        AttemptError::Status { code, text }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            AttemptError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}
