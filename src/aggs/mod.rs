//! Aggregation response decoding
//!
//! A search response carries aggregation results as untyped JSON; the kind of
//! each aggregation lives only in the request that produced it. The decoder
//! reads the response alongside an [`AggregationManifest`] (name → kind, plus
//! nested sub-manifests) and produces a typed [`AggregationResultCollection`].
//!
//! # Design Principles
//!
//! - The manifest is authoritative for names, kinds and order
//! - Absent or null numeric fields read as zero; nothing else is defaulted
//! - Keyed vs anonymous buckets follow the runtime shape of `buckets`
//! - Any failure aborts the whole decode with a path-carrying error

mod buckets;
mod decoder;
mod errors;
mod kind;
mod manifest;
mod metrics;
mod result;
mod values;

pub use decoder::{decode, decode_unwrapped, AggregationDecoder};
pub use errors::{DecodeError, DecodeErrorCode, DecodeResult};
pub use kind::{AggregationKind, KindFamily};
pub use manifest::{AggregationManifest, AggregationManifestEntry, ManifestError, ManifestResult};
pub use result::{
    AggregationBody, AggregationResult, AggregationResultCollection, BoundingBox, Bucket,
    BucketKey, Buckets, Cardinality, DateHistogram, DateHistogramBucket, ExtendedStats, Filters,
    FiltersBucket, GeoBounds, GeoHashGrid, GeoHashGridBucket, GeoPoint, Histogram,
    HistogramBucket, Percentile, Percentiles, Range, RangeBucket, ScriptedMetric,
    SignificantTerms, SignificantTermsBucket, SingleBucket, SingleValue, Stats,
    StdDeviationBounds, Terms, TermsBucket, TopHits, ValueCount,
};
pub use values::JsonObject;
