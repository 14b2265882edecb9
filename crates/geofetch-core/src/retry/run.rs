//! Retry loop: run an attempt closure until success or the policy says stop.

use std::time::{Duration, Instant};

use super::classify::classify;
use super::error::AttemptError;
use super::policy::RetryPolicy;

/// Waits out a backoff delay between attempts.
pub trait Sleeper {
    fn sleep(&self, delay: Duration);
}

/// Blocks the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

impl<F: Fn(Duration)> Sleeper for F {
    fn sleep(&self, delay: Duration) {
        self(delay)
    }
}

/// Why the loop gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A non-retryable status was observed.
    Terminal,
    /// `max_retries` attempts were consumed.
    Exhausted,
    /// The caller's deadline passed, or the next backoff would cross it.
    DeadlineExceeded,
}

/// Terminal outcome of [`run_with_retry`]: the last recorded failure and why
/// the loop stopped. `last` is only `None` when the deadline had already
/// passed before the first attempt.
#[derive(Debug)]
pub struct RetryError {
    pub last: Option<AttemptError>,
    pub stop: StopReason,
}

/// Runs `op(attempt)` for `attempt = 1..=policy.max_retries()`.
///
/// Success returns immediately. Transport failures and retryable statuses
/// sleep for `policy.delay_for_attempt(attempt)` before the next attempt
/// (never after the last one); a terminal status stops at once. Attempts are
/// strictly sequential.
pub fn run_with_retry<T, S, F>(
    policy: &RetryPolicy,
    deadline: Option<Instant>,
    sleeper: &S,
    mut op: F,
) -> Result<T, RetryError>
where
    S: Sleeper + ?Sized,
    F: FnMut(u32) -> Result<T, AttemptError>,
{
    let max = policy.max_retries();
    let mut last: Option<AttemptError> = None;
    let mut attempt = 1u32;
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(RetryError {
                last,
                stop: StopReason::DeadlineExceeded,
            });
        }

        let err = match op(attempt) {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!("attempt {}/{} succeeded", attempt, max);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        let kind = classify(&err);
        if !kind.is_retryable() {
            tracing::debug!("attempt {}/{} failed with terminal {:?}: {}", attempt, max, kind, err);
            return Err(RetryError {
                last: Some(err),
                stop: StopReason::Terminal,
            });
        }
        if attempt >= max {
            tracing::warn!("all {} attempts exhausted, last error: {}", max, err);
            return Err(RetryError {
                last: Some(err),
                stop: StopReason::Exhausted,
            });
        }

        let delay = policy.delay_for_attempt(attempt);
        if let Some(d) = deadline {
            let wake = Instant::now().checked_add(delay);
            if wake.map_or(true, |w| w >= d) {
                tracing::warn!(
                    "attempt {}/{} failed: {}; backoff of {:?} would pass the deadline",
                    attempt,
                    max,
                    err,
                    delay
                );
                return Err(RetryError {
                    last: Some(err),
                    stop: StopReason::DeadlineExceeded,
                });
            }
        }

        tracing::warn!(
            "attempt {}/{} failed ({:?}): {}. Retrying in {:?}",
            attempt,
            max,
            kind,
            err,
            delay
        );
        last = Some(err);
        sleeper.sleep(delay);
        attempt += 1;
    }
}
