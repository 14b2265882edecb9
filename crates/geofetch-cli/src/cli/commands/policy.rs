//! Policy command: show the resolved retry policy.

use anyhow::Result;
use geofetch_core::config::Lookup;
use geofetch_core::RetryPolicy;

pub fn run_policy<L: Lookup>(lookup: &L) -> Result<()> {
    let policy = RetryPolicy::resolve(lookup);
    println!("timeout:       {:?}", policy.timeout());
    println!("max retries:   {}", policy.max_retries());
    println!("backoff base:  {:?}", policy.backoff_base());
    println!("backoff limit: {:?}", policy.backoff_limit());
    Ok(())
}
