//! Observability for esaggs
//!
//! Structured JSON-line logging only. Observability is read-only: nothing
//! logged here affects a decode's outcome.
//!
//! ```ignore
//! use esaggs::observability::{Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Trace);
//! Logger::trace("AGGS_DECODE_COMPLETE", &[("aggregations", "3")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
