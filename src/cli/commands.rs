//! CLI command implementations
//!
//! Each command reads its inputs from files, runs one library operation and
//! writes a single JSON envelope to stdout. Failures are written as an error
//! envelope and returned so the process exits non-zero.

use std::path::Path;

use serde_json::Value;

use crate::aggs::{AggregationDecoder, AggregationManifest};
use crate::config::DecoderConfig;
use crate::observability::Logger;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_error, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let outcome = match cmd {
        Command::Decode {
            response,
            manifest,
            config,
            unwrapped,
        } => decode(&response, &manifest, config.as_deref(), unwrapped),
        Command::Manifest { request } => manifest(&request),
    };

    if let Err(e) = &outcome {
        write_error(e.code_str(), e.message())?;
    }
    outcome
}

/// Decode a response file against a manifest file and print the results
pub fn decode(
    response_path: &Path,
    manifest_path: &Path,
    config_path: Option<&Path>,
    unwrapped: bool,
) -> CliResult<()> {
    let data = decode_files(response_path, manifest_path, config_path, unwrapped)?;
    write_response(data)
}

/// Derive a manifest from a request file and print it
pub fn manifest(request_path: &Path) -> CliResult<()> {
    let data = manifest_from_file(request_path)?;
    write_response(data)
}

/// Loads configuration (or defaults) and applies the log threshold
pub fn load_config(config_path: Option<&Path>) -> CliResult<DecoderConfig> {
    let config = match config_path {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

/// Decode step of `esaggs decode`, returning the `data` payload
pub fn decode_files(
    response_path: &Path,
    manifest_path: &Path,
    config_path: Option<&Path>,
    unwrapped: bool,
) -> CliResult<Value> {
    let config = load_config(config_path)?;
    let raw = read_json_file(response_path)?;
    let manifest = AggregationManifest::from_json(&read_json_file(manifest_path)?)?;

    let decoder = AggregationDecoder::new(config);
    let results = if unwrapped {
        let scope = raw.as_object().ok_or_else(|| {
            CliError::input_error(format!(
                "'{}' must hold a JSON object when --unwrapped is set",
                response_path.display()
            ))
        })?;
        decoder.decode_unwrapped(scope, Some(&manifest))?
    } else {
        decoder.decode(&raw, Some(&manifest))?
    };

    Ok(serde_json::to_value(&results)?)
}

/// Manifest step of `esaggs manifest`, returning the manifest document
pub fn manifest_from_file(request_path: &Path) -> CliResult<Value> {
    let request = read_json_file(request_path)?;
    let manifest = AggregationManifest::from_request(&request)?;
    Ok(manifest.to_json())
}
