//! Resilient GET: resolve the policy, retry transient failures with bounded
//! exponential backoff, then hand back the buffered body or a live stream.
//!
//! The loop is blocking; it occupies the calling thread for every attempt and
//! every backoff sleep. Run it from `spawn_blocking` if used from async code.

mod error;
mod transport;

use std::io::Read;
use std::time::{Duration, Instant};

use crate::config::{Lookup, ProcessEnv};
use crate::retry::{run_with_retry, RetryPolicy, Sleeper, ThreadSleeper};

pub use error::FetchError;
pub use transport::BodyStream;

/// Smallest per-attempt timeout handed to curl (zero would mean "no timeout").
const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(1);

/// Fetcher bound to a configuration source. The policy is resolved from
/// `lookup` at the start of every call, so changes to the source apply to the
/// next fetch.
#[derive(Debug, Clone)]
pub struct Fetcher<L = ProcessEnv, S = ThreadSleeper> {
    lookup: L,
    sleeper: S,
    deadline: Option<Instant>,
}

impl Default for Fetcher<ProcessEnv, ThreadSleeper> {
    fn default() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<L: Lookup> Fetcher<L, ThreadSleeper> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            sleeper: ThreadSleeper,
            deadline: None,
        }
    }
}

impl<L: Lookup, S: Sleeper> Fetcher<L, S> {
    /// Replace how backoff delays are waited out.
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> Fetcher<L, S2> {
        Fetcher {
            lookup: self.lookup,
            sleeper,
            deadline: self.deadline,
        }
    }

    /// Abort attempts and backoff sleeps that would run past `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Resolve the policy the next call would use.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::resolve(&self.lookup)
    }

    /// GET `url` and buffer the whole 200 body.
    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut stream = self.attempt_loop(url)?;
        let mut body = Vec::new();
        stream
            .read_to_end(&mut body)
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }

    /// GET `url` and return the open 200 body. The caller owns the stream and
    /// releases the connection by dropping it.
    pub fn fetch_stream(&self, url: &str) -> Result<BodyStream, FetchError> {
        self.attempt_loop(url)
    }

    fn attempt_loop(&self, url: &str) -> Result<BodyStream, FetchError> {
        let policy = self.policy();
        tracing::debug!(url, ?policy, "GET");
        run_with_retry(&policy, self.deadline, &self.sleeper, |attempt| {
            let timeout = self.attempt_timeout(&policy);
            tracing::trace!(url, attempt, ?timeout, "attempt");
            transport::open(url, timeout)
        })
        .map_err(|e| FetchError::from_retry(url, e))
    }

    fn attempt_timeout(&self, policy: &RetryPolicy) -> Duration {
        let timeout = match self.deadline {
            Some(d) => policy
                .timeout()
                .min(d.saturating_duration_since(Instant::now())),
            None => policy.timeout(),
        };
        timeout.max(MIN_ATTEMPT_TIMEOUT)
    }
}

/// Buffered fetch configured from the process environment.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    Fetcher::default().fetch_bytes(url)
}

/// Streaming fetch configured from the process environment.
pub fn fetch_stream(url: &str) -> Result<BodyStream, FetchError> {
    Fetcher::default().fetch_stream(url)
}
