//! CLI module for esaggs
//!
//! Provides command-line interface for:
//! - decode: Decode a response file against a manifest file
//! - manifest: Derive a manifest from a request body or aggregation mapping

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{decode, decode_files, load_config, manifest, manifest_from_file, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, read_json_file, write_error, write_response};
