//! Aggregation tree decoder
//!
//! Walks the manifest, not the response: manifest order decides output order
//! and every manifest name must be found in the response scope. Each entry is
//! dispatched through [`DECODE_RULES`] to exactly one per-kind rule; rules for
//! bucket kinds recurse back into the decoder with the entry's sub-manifest.
//!
//! Decoding is pure and synchronous. Any failure aborts the whole decode.

use serde_json::Value;

use crate::config::DecoderConfig;
use crate::observability::{Logger, Severity};

use super::buckets;
use super::errors::{DecodeError, DecodeResult};
use super::kind::AggregationKind;
use super::manifest::AggregationManifest;
use super::metrics;
use super::result::{AggregationBody, AggregationResult, AggregationResultCollection};
use super::values::{expect_object, index_path, make_path, JsonObject};

const AGGREGATIONS_KEY: &str = "aggregations";
const LEGACY_AGGREGATIONS_KEY: &str = "aggs";

/// Per-kind decoding function.
///
/// Receives the decoder (for recursion), the frame locating the aggregation
/// object, the object itself and the entry's sub-manifest.
pub(crate) type DecodeRule = fn(
    &AggregationDecoder,
    &Frame,
    &JsonObject,
    Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody>;

/// Kind → rule. Adding a kind means adding a row here.
static DECODE_RULES: [(AggregationKind, DecodeRule); 29] = [
    (AggregationKind::ValueCount, metrics::value_count),
    (AggregationKind::Avg, metrics::avg),
    (AggregationKind::Min, metrics::min),
    (AggregationKind::Max, metrics::max),
    (AggregationKind::Sum, metrics::sum),
    (AggregationKind::Stats, metrics::stats),
    (AggregationKind::ExtendedStats, metrics::extended_stats),
    (AggregationKind::Percentiles, metrics::percentiles),
    (AggregationKind::PercentileRanks, metrics::percentile_ranks),
    (AggregationKind::Cardinality, metrics::cardinality),
    (AggregationKind::GeoBounds, metrics::geo_bounds),
    (AggregationKind::TopHits, metrics::top_hits),
    (AggregationKind::ScriptedMetric, metrics::scripted_metric),
    (AggregationKind::Global, buckets::global),
    (AggregationKind::Filter, buckets::filter),
    (AggregationKind::Missing, buckets::missing),
    (AggregationKind::Nested, buckets::nested),
    (AggregationKind::ReverseNested, buckets::reverse_nested),
    (AggregationKind::Children, buckets::children),
    (AggregationKind::Terms, buckets::terms),
    (AggregationKind::SignificantTerms, buckets::significant_terms),
    (AggregationKind::Filters, buckets::filters),
    (AggregationKind::Range, buckets::range),
    (AggregationKind::DateRange, buckets::date_range),
    (AggregationKind::IpRange, buckets::ip_range),
    (AggregationKind::Histogram, buckets::histogram),
    (AggregationKind::DateHistogram, buckets::date_histogram),
    (AggregationKind::GeoDistance, buckets::geo_distance),
    (AggregationKind::GeoHashGrid, buckets::geohash_grid),
];

fn rule_for(kind: AggregationKind) -> Option<DecodeRule> {
    DECODE_RULES
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, rule)| *rule)
}

/// Location of the value being decoded: JSON path plus nesting depth.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    path: String,
    depth: usize,
}

impl Frame {
    fn root(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            depth: 0,
        }
    }

    pub(crate) fn path(&self) -> &str {
        &self.path
    }

    /// Path for error messages about the scope itself
    fn scope_path(&self) -> &str {
        if self.path.is_empty() {
            "$root"
        } else {
            &self.path
        }
    }

    /// Frame for a field of this value, at the same depth
    pub(crate) fn field(&self, name: &str) -> Self {
        Self {
            path: make_path(&self.path, name),
            depth: self.depth,
        }
    }

    /// Frame for an array element of this value, at the same depth
    pub(crate) fn element(&self, index: usize) -> Self {
        Self {
            path: index_path(&self.path, index),
            depth: self.depth,
        }
    }

    /// Frame one aggregation level deeper; fails past `limit`
    fn descend(&self, limit: usize) -> DecodeResult<Self> {
        let depth = self.depth + 1;
        if depth > limit {
            return Err(DecodeError::depth_exceeded(self.scope_path(), limit));
        }
        Ok(Self {
            path: self.path.clone(),
            depth,
        })
    }
}

/// Decodes raw aggregation responses using a manifest.
///
/// Holds only configuration; one decoder can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct AggregationDecoder {
    config: DecoderConfig,
}

impl AggregationDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes the aggregations of a search response.
    ///
    /// `raw` is the response object; its `aggregations` (or legacy `aggs`)
    /// key is unwrapped once. A response without either key decodes to an
    /// empty collection when no aggregations were requested.
    ///
    /// # Errors
    ///
    /// - StructuralMismatch: a manifest name is missing from the response, or
    ///   the response has aggregations that no manifest describes
    /// - TypeMismatch: a value has the wrong JSON shape
    /// - UnsupportedKind: the manifest names an unrecognized kind
    /// - DepthExceeded: nesting deeper than `max_depth`
    pub fn decode(
        &self,
        raw: &Value,
        manifest: Option<&AggregationManifest>,
    ) -> DecodeResult<AggregationResultCollection> {
        let outcome = self.decode_response(raw, manifest);
        log_outcome(&outcome);
        outcome
    }

    /// Decodes an already unwrapped aggregations mapping.
    pub fn decode_unwrapped(
        &self,
        aggregations: &JsonObject,
        manifest: Option<&AggregationManifest>,
    ) -> DecodeResult<AggregationResultCollection> {
        let outcome = self.decode_scope(&Frame::root(""), aggregations, manifest);
        log_outcome(&outcome);
        outcome
    }

    fn decode_response(
        &self,
        raw: &Value,
        manifest: Option<&AggregationManifest>,
    ) -> DecodeResult<AggregationResultCollection> {
        let response = expect_object(raw, "$root")?;

        let wrapped = [AGGREGATIONS_KEY, LEGACY_AGGREGATIONS_KEY]
            .into_iter()
            .find_map(|key| response.get(key).map(|value| (key, value)));

        match wrapped {
            Some((key, value)) => {
                let aggregations = expect_object(value, key)?;
                self.decode_scope(&Frame::root(key), aggregations, manifest)
            }
            None => match manifest {
                Some(manifest) if !manifest.is_empty() => Err(DecodeError::StructuralMismatch {
                    path: "$root".to_string(),
                    reason: format!(
                        "manifest declares {} aggregation(s) but response has no aggregations",
                        manifest.len()
                    ),
                }),
                _ => Ok(AggregationResultCollection::empty()),
            },
        }
    }

    /// Decodes one aggregation scope. With no manifest the scope must be empty.
    fn decode_scope(
        &self,
        frame: &Frame,
        aggregations: &JsonObject,
        manifest: Option<&AggregationManifest>,
    ) -> DecodeResult<AggregationResultCollection> {
        match manifest {
            Some(manifest) => self.decode_entries(frame, aggregations, manifest),
            None if aggregations.is_empty() => Ok(AggregationResultCollection::empty()),
            None => Err(DecodeError::unexpected_aggregations(
                frame.scope_path(),
                aggregations.len(),
            )),
        }
    }

    /// Decodes the sub-aggregations of a bucket.
    ///
    /// The bucket object also holds the bucket's own fields (`key`,
    /// `doc_count`, ...), so without a sub-manifest there is nothing to decode.
    pub(crate) fn decode_children(
        &self,
        frame: &Frame,
        bucket: &JsonObject,
        manifest: Option<&AggregationManifest>,
    ) -> DecodeResult<AggregationResultCollection> {
        match manifest {
            Some(manifest) => {
                let nested = frame.descend(self.config.max_depth)?;
                self.decode_entries(&nested, bucket, manifest)
            }
            None => Ok(AggregationResultCollection::empty()),
        }
    }

    fn decode_entries(
        &self,
        frame: &Frame,
        scope: &JsonObject,
        manifest: &AggregationManifest,
    ) -> DecodeResult<AggregationResultCollection> {
        let mut results = Vec::with_capacity(manifest.len());

        for (name, entry) in manifest.entries() {
            let value = scope
                .get(name)
                .ok_or_else(|| DecodeError::missing_aggregation(frame.scope_path(), name))?;
            let entry_frame = frame.field(name);

            let rule = entry
                .parsed_kind()
                .and_then(rule_for)
                .ok_or_else(|| DecodeError::unsupported_kind(entry_frame.path(), entry.kind()))?;

            let aggregation = expect_object(value, entry_frame.path())?;
            let body = rule(self, &entry_frame, aggregation, entry.sub_manifest())?;

            Logger::trace(
                "AGGS_AGGREGATION_DECODED",
                &[("kind", entry.kind()), ("path", entry_frame.path())],
            );
            results.push(AggregationResult::new(name, body));
        }

        Ok(AggregationResultCollection::from_results(results))
    }
}

/// Decodes with the default configuration. See [`AggregationDecoder::decode`].
pub fn decode(
    raw: &Value,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationResultCollection> {
    AggregationDecoder::default().decode(raw, manifest)
}

/// Decodes an unwrapped mapping with the default configuration.
pub fn decode_unwrapped(
    aggregations: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationResultCollection> {
    AggregationDecoder::default().decode_unwrapped(aggregations, manifest)
}

fn log_outcome(outcome: &DecodeResult<AggregationResultCollection>) {
    match outcome {
        Ok(collection) => {
            if Logger::enabled(Severity::Trace) {
                let count = collection.len().to_string();
                Logger::trace("AGGS_DECODE_COMPLETE", &[("aggregations", &count)]);
            }
        }
        Err(e) => {
            Logger::warn(
                "AGGS_DECODE_FAILED",
                &[("code", e.code().code()), ("path", e.path())],
            );
        }
    }
}
