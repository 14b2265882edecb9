//! CLI command handlers.

mod completions;
mod decode;
mod fetch;
mod policy;

pub use completions::run_completions;
pub use decode::run_decode;
pub use fetch::{run_fetch, run_stream};
pub use policy::run_policy;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Open the destination: a file when given, otherwise stdout.
pub(crate) fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let f = fs::File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Ok(Box::new(io::BufWriter::new(f)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
