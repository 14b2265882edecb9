use std::collections::{BTreeMap, HashMap};

/// Key-value lookup used to resolve tunables such as `GEOIP_HTTP_TIMEOUT`.
pub trait Lookup {
    /// Returns the raw value for `key`, or `None` when unset.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Lookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl Lookup for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

impl<T: Lookup + ?Sized> Lookup for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// Consults `first`, then `second` when `first` has nothing (or only
/// whitespace) for the key.
#[derive(Debug, Clone, Default)]
pub struct Layered<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Lookup, B: Lookup> Lookup for Layered<A, B> {
    fn get(&self, key: &str) -> Option<String> {
        match self.first.get(key) {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => self.second.get(key),
        }
    }
}
