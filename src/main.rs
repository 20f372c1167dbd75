//! esaggs CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`. Failures are reported on
//! stdout as a JSON error response by the command layer; the exit code is
//! non-zero.

use esaggs::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
