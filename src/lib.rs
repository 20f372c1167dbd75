//! esaggs - Typed decoding of search aggregation responses
//!
//! Pairs a raw JSON aggregation response with a manifest describing the
//! requested aggregations and yields a typed result tree.

pub mod aggs;
pub mod cli;
pub mod config;
pub mod observability;

pub use aggs::{decode, AggregationDecoder, AggregationManifest, AggregationResultCollection};
pub use config::DecoderConfig;
