use std::time::Duration;

use crate::config::Lookup;

pub const ENV_TIMEOUT: &str = "GEOIP_HTTP_TIMEOUT";
pub const ENV_MAX_RETRIES: &str = "GEOIP_HTTP_MAX_RETRIES";
pub const ENV_BACKOFF_BASE: &str = "GEOIP_HTTP_BACKOFF_BASE";
pub const ENV_BACKOFF_LIMIT: &str = "GEOIP_HTTP_BACKOFF_LIMIT";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
pub const DEFAULT_BACKOFF_LIMIT: Duration = Duration::from_secs(10);

/// Smallest backoff base a resolved policy will carry.
pub const MIN_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Exponential backoff policy with a ceiling, resolved fresh for every fetch.
///
/// Invariant: `max_retries >= 1` and `backoff_limit >= backoff_base >= 1s`.
/// The only ways to build one are [`RetryPolicy::new`] and
/// [`RetryPolicy::resolve`], both of which clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
    backoff_limit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TIMEOUT,
            DEFAULT_MAX_RETRIES,
            DEFAULT_BACKOFF_BASE,
            DEFAULT_BACKOFF_LIMIT,
        )
    }
}

impl RetryPolicy {
    /// Builds a policy, flooring `max_retries` to 1, `backoff_base` to 1s and
    /// `backoff_limit` to `backoff_base`.
    pub fn new(
        timeout: Duration,
        max_retries: u32,
        backoff_base: Duration,
        backoff_limit: Duration,
    ) -> Self {
        let max_retries = max_retries.max(1);
        let backoff_base = backoff_base.max(MIN_BACKOFF_BASE);
        let backoff_limit = backoff_limit.max(backoff_base);
        Self {
            timeout,
            max_retries,
            backoff_base,
            backoff_limit,
        }
    }

    /// Resolves the policy from `lookup`, falling back to the defaults for any
    /// missing, blank, malformed, zero or negative value. Never fails.
    pub fn resolve<L: Lookup + ?Sized>(lookup: &L) -> Self {
        Self::new(
            lookup_duration(lookup, ENV_TIMEOUT, DEFAULT_TIMEOUT),
            lookup_count(lookup, ENV_MAX_RETRIES, DEFAULT_MAX_RETRIES),
            lookup_duration(lookup, ENV_BACKOFF_BASE, DEFAULT_BACKOFF_BASE),
            lookup_duration(lookup, ENV_BACKOFF_LIMIT, DEFAULT_BACKOFF_LIMIT),
        )
    }

    /// Per-attempt (total request) timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Maximum number of attempts, including the first.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_base(&self) -> Duration {
        self.backoff_base
    }

    pub fn backoff_limit(&self) -> Duration {
        self.backoff_limit
    }

    /// Delay to wait after the given failed attempt (1-based):
    /// `min(backoff_base * 2^(attempt-1), backoff_limit)`. No jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let mut delay = self.backoff_base;
        for _ in 1..attempt {
            delay = delay.saturating_mul(2);
            if delay >= self.backoff_limit {
                return self.backoff_limit;
            }
        }
        delay
    }
}

fn lookup_raw<L: Lookup + ?Sized>(lookup: &L, key: &str) -> Option<String> {
    lookup
        .get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lookup_duration<L: Lookup + ?Sized>(lookup: &L, key: &str, fallback: Duration) -> Duration {
    let Some(raw) = lookup_raw(lookup, key) else {
        return fallback;
    };
    match parse_duration(&raw) {
        Some(d) => d,
        None => {
            tracing::debug!(key, value = %raw, "invalid duration, using default {:?}", fallback);
            fallback
        }
    }
}

fn lookup_count<L: Lookup + ?Sized>(lookup: &L, key: &str, fallback: u32) -> u32 {
    let Some(raw) = lookup_raw(lookup, key) else {
        return fallback;
    };
    match parse_count(&raw) {
        Some(n) => n,
        None => {
            tracing::debug!(key, value = %raw, "invalid count, using default {}", fallback);
            fallback
        }
    }
}

/// Parses a duration expression ("5s", "200ms", "1h 30m"), then a bare
/// integer number of seconds. Zero and negative values are rejected.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    if let Ok(d) = humantime::parse_duration(raw) {
        if !d.is_zero() {
            return Some(d);
        }
    }
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Some(Duration::from_secs(n as u64)),
        _ => None,
    }
}

/// Parses a strictly positive integer count.
pub fn parse_count(raw: &str) -> Option<u32> {
    match raw.parse::<i64>() {
        Ok(n) if n > 0 => Some(u32::try_from(n).unwrap_or(u32::MAX)),
        _ => None,
    }
}
