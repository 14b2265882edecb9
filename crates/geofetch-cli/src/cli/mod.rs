//! CLI for the geofetch resilient fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use geofetch_core::config::{self, FileConfig, Layered, ProcessEnv};
use std::path::PathBuf;

use commands::{run_completions, run_decode, run_fetch, run_policy, run_stream};

/// Top-level CLI for geofetch.
#[derive(Debug, Parser)]
#[command(name = "geofetch")]
#[command(about = "geofetch: fetch remote content with bounded retry and backoff", long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of ~/.config/geofetch/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL into memory, then write it out.
    Fetch {
        /// HTTP/HTTPS URL to fetch.
        url: String,
        /// Write the body here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Stream a URL straight to the output without buffering it.
    Stream {
        /// HTTP/HTTPS URL to fetch.
        url: String,
        /// Write the body here instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decode a JSON string list or map of string lists and print it normalized.
    Decode {
        /// Input file; reads stdin when omitted.
        path: Option<PathBuf>,
    },

    /// Show the retry policy the next fetch would use.
    Policy,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Environment first, then the config file.
pub type Settings = Layered<ProcessEnv, FileConfig>;

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let file = match path {
        Some(p) => config::load_from(p)?,
        None => config::load()?,
    };
    Ok(Layered::new(ProcessEnv, file))
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Fetch { url, output } => {
                let settings = load_settings(cli.config.as_ref())?;
                run_fetch(settings, &url, output.as_deref())?;
            }
            CliCommand::Stream { url, output } => {
                let settings = load_settings(cli.config.as_ref())?;
                run_stream(settings, &url, output.as_deref())?;
            }
            CliCommand::Decode { path } => run_decode(path.as_deref())?,
            CliCommand::Policy => {
                let settings = load_settings(cli.config.as_ref())?;
                run_policy(&settings)?;
            }
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}
