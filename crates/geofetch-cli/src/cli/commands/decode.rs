//! Decode command: normalize a flexible list document.

use anyhow::{Context, Result};
use geofetch_core::decode_flexible_list;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Decode `path` (or stdin) and print the normalized JSON.
pub fn run_decode(path: Option<&Path>) -> Result<()> {
    let bytes = match path {
        Some(p) => fs::read(p).with_context(|| format!("reading {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let list = decode_flexible_list(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}
