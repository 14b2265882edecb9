//! Configuration lookup: process environment, optional TOML file, layering.
//!
//! Everything that tunes the fetcher is read through the [`Lookup`] trait so
//! callers (and tests) can inject any key-value source.

mod file;
mod lookup;

pub use file::{config_path, load, load_from, FileConfig, HttpSection, Setting};
pub use lookup::{Layered, Lookup, ProcessEnv};
