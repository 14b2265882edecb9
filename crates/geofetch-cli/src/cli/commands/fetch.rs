//! Fetch and stream commands.

use anyhow::{Context, Result};
use geofetch_core::config::Lookup;
use geofetch_core::Fetcher;
use std::io::{self, Write};
use std::path::Path;

use super::open_output;

/// Buffer the whole body, then write it out.
pub fn run_fetch<L: Lookup>(lookup: L, url: &str, output: Option<&Path>) -> Result<()> {
    let body = Fetcher::new(lookup).fetch_bytes(url)?;
    let mut out = open_output(output)?;
    out.write_all(&body).context("writing body")?;
    out.flush()?;
    tracing::info!("fetched {} bytes from {}", body.len(), url);
    Ok(())
}

/// Copy the body to the output as it arrives.
pub fn run_stream<L: Lookup>(lookup: L, url: &str, output: Option<&Path>) -> Result<()> {
    let mut stream = Fetcher::new(lookup).fetch_stream(url)?;
    let mut out = open_output(output)?;
    let n = io::copy(&mut stream, &mut out).with_context(|| format!("streaming {}", url))?;
    out.flush()?;
    tracing::info!("streamed {} bytes from {}", n, url);
    Ok(())
}
