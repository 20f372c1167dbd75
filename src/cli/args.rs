//! CLI argument definitions using clap
//!
//! Commands:
//! - esaggs decode --response <path> --manifest <path> [--config <path>] [--unwrapped]
//! - esaggs manifest --request <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// esaggs - Decode search aggregation responses into typed results
#[derive(Parser, Debug)]
#[command(name = "esaggs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode an aggregation response against a manifest
    Decode {
        /// Path to the raw response JSON
        #[arg(long)]
        response: PathBuf,

        /// Path to the manifest JSON
        #[arg(long)]
        manifest: PathBuf,

        /// Path to decoder configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Treat the response document as the aggregations mapping itself
        #[arg(long)]
        unwrapped: bool,
    },

    /// Derive a manifest from a search request body or aggregation mapping
    Manifest {
        /// Path to the request JSON
        #[arg(long)]
        request: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
