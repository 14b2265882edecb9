//! Retry and backoff policy.
//!
//! This module resolves the tunable policy from a [`Lookup`](crate::config::Lookup),
//! classifies attempt failures (transport errors, retryable and terminal HTTP
//! statuses), and runs the bounded exponential-backoff loop shared by the
//! buffered and streaming fetch paths.

mod classify;
mod error;
pub mod policy;
mod run;

pub use classify::{classify, is_retryable_status, ErrorKind};
pub use error::AttemptError;
pub use policy::RetryPolicy;
pub use run::{run_with_retry, RetryError, Sleeper, StopReason, ThreadSleeper};
