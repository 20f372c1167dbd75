//! Typed aggregation results
//!
//! A decode produces an [`AggregationResultCollection`]: one
//! [`AggregationResult`] per manifest entry, in manifest order. Each result
//! pairs the aggregation name with a kind-specific [`AggregationBody`].
//! Bucket bodies nest further collections, one per bucket.
//!
//! Results serialize to JSON with a `kind` tag; anonymous buckets render as
//! an array and keyed buckets as an object.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::kind::AggregationKind;

/// Ordered, immutable sequence of decoded aggregations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregationResultCollection {
    results: Vec<AggregationResult>,
}

impl AggregationResultCollection {
    pub(crate) fn from_results(results: Vec<AggregationResult>) -> Self {
        Self { results }
    }

    /// Collection with no aggregations
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregationResult> {
        self.results.iter()
    }

    /// Looks up a result by aggregation name
    pub fn get(&self, name: &str) -> Option<&AggregationResult> {
        self.results.iter().find(|result| result.name == name)
    }

    /// Returns the aggregation names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|result| result.name.as_str())
    }
}

impl<'a> IntoIterator for &'a AggregationResultCollection {
    type Item = &'a AggregationResult;
    type IntoIter = std::slice::Iter<'a, AggregationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// A single named aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    name: String,
    #[serde(flatten)]
    body: AggregationBody,
}

impl AggregationResult {
    pub fn new(name: impl Into<String>, body: AggregationBody) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &AggregationBody {
        &self.body
    }

    pub fn kind(&self) -> AggregationKind {
        self.body.kind()
    }
}

/// Kind-specific payload; one variant per recognized kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationBody {
    ValueCount(ValueCount),
    Avg(SingleValue),
    Min(SingleValue),
    Max(SingleValue),
    Sum(SingleValue),
    Stats(Stats),
    ExtendedStats(ExtendedStats),
    Percentiles(Percentiles),
    PercentileRanks(Percentiles),
    Cardinality(Cardinality),
    GeoBounds(GeoBounds),
    TopHits(TopHits),
    ScriptedMetric(ScriptedMetric),
    Global(SingleBucket),
    Filter(SingleBucket),
    Missing(SingleBucket),
    Nested(SingleBucket),
    ReverseNested(SingleBucket),
    Children(SingleBucket),
    Terms(Terms),
    SignificantTerms(SignificantTerms),
    Filters(Filters),
    Range(Range),
    DateRange(Range),
    IpRange(Range),
    Histogram(Histogram),
    DateHistogram(DateHistogram),
    GeoDistance(Range),
    #[serde(rename = "geohash_grid")]
    GeoHashGrid(GeoHashGrid),
}

impl AggregationBody {
    pub fn kind(&self) -> AggregationKind {
        match self {
            AggregationBody::ValueCount(_) => AggregationKind::ValueCount,
            AggregationBody::Avg(_) => AggregationKind::Avg,
            AggregationBody::Min(_) => AggregationKind::Min,
            AggregationBody::Max(_) => AggregationKind::Max,
            AggregationBody::Sum(_) => AggregationKind::Sum,
            AggregationBody::Stats(_) => AggregationKind::Stats,
            AggregationBody::ExtendedStats(_) => AggregationKind::ExtendedStats,
            AggregationBody::Percentiles(_) => AggregationKind::Percentiles,
            AggregationBody::PercentileRanks(_) => AggregationKind::PercentileRanks,
            AggregationBody::Cardinality(_) => AggregationKind::Cardinality,
            AggregationBody::GeoBounds(_) => AggregationKind::GeoBounds,
            AggregationBody::TopHits(_) => AggregationKind::TopHits,
            AggregationBody::ScriptedMetric(_) => AggregationKind::ScriptedMetric,
            AggregationBody::Global(_) => AggregationKind::Global,
            AggregationBody::Filter(_) => AggregationKind::Filter,
            AggregationBody::Missing(_) => AggregationKind::Missing,
            AggregationBody::Nested(_) => AggregationKind::Nested,
            AggregationBody::ReverseNested(_) => AggregationKind::ReverseNested,
            AggregationBody::Children(_) => AggregationKind::Children,
            AggregationBody::Terms(_) => AggregationKind::Terms,
            AggregationBody::SignificantTerms(_) => AggregationKind::SignificantTerms,
            AggregationBody::Filters(_) => AggregationKind::Filters,
            AggregationBody::Range(_) => AggregationKind::Range,
            AggregationBody::DateRange(_) => AggregationKind::DateRange,
            AggregationBody::IpRange(_) => AggregationKind::IpRange,
            AggregationBody::Histogram(_) => AggregationKind::Histogram,
            AggregationBody::DateHistogram(_) => AggregationKind::DateHistogram,
            AggregationBody::GeoDistance(_) => AggregationKind::GeoDistance,
            AggregationBody::GeoHashGrid(_) => AggregationKind::GeoHashGrid,
        }
    }

    /// Returns the single implicit bucket of a single-bucket kind
    pub fn as_single_bucket(&self) -> Option<&SingleBucket> {
        match self {
            AggregationBody::Global(b)
            | AggregationBody::Filter(b)
            | AggregationBody::Missing(b)
            | AggregationBody::Nested(b)
            | AggregationBody::ReverseNested(b)
            | AggregationBody::Children(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the single numeric value of avg/min/max/sum
    pub fn as_single_value(&self) -> Option<&SingleValue> {
        match self {
            AggregationBody::Avg(v)
            | AggregationBody::Min(v)
            | AggregationBody::Max(v)
            | AggregationBody::Sum(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the range body shared by range, date_range, ip_range and geo_distance
    pub fn as_range(&self) -> Option<&Range> {
        match self {
            AggregationBody::Range(r)
            | AggregationBody::DateRange(r)
            | AggregationBody::IpRange(r)
            | AggregationBody::GeoDistance(r) => Some(r),
            _ => None,
        }
    }
}

// =============================================================================
// Metric bodies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: u64,
}

/// avg, min, max and sum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleValue {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_as_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cardinality {
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub sum: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_as_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_as_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_as_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum_as_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedStats {
    #[serde(flatten)]
    pub stats: Stats,
    pub sum_of_squares: f64,
    pub variance: f64,
    pub std_deviation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_deviation_bounds: Option<StdDeviationBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StdDeviationBounds {
    pub upper: f64,
    pub lower: f64,
}

/// percentiles and percentile_ranks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentiles {
    pub values: Vec<Percentile>,
}

impl Percentiles {
    /// Looks up the value recorded for `key` (a percent, or a value for ranks)
    pub fn value(&self, key: f64) -> Option<f64> {
        self.values.iter().find(|p| p.key == key).map(|p| p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentile {
    pub key: f64,
    pub value: f64,
    /// Formatted value, present when the request set a `format`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_as_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoBounds {
    /// Absent when no document had a point
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopHits {
    pub total: u64,
    pub max_score: Option<f64>,
    /// Hit documents as returned by the engine
    pub hits: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptedMetric {
    pub value: Value,
}

// =============================================================================
// Bucket bodies
// =============================================================================

/// Common view over every bucket type.
pub trait Bucket {
    fn doc_count(&self) -> u64;
    fn aggregations(&self) -> &AggregationResultCollection;
}

/// Buckets of a multi-bucket aggregation.
///
/// The wire shape decides the variant: a `buckets` array yields
/// `Anonymous`, a `buckets` object yields `Keyed` in object order.
#[derive(Debug, Clone, PartialEq)]
pub enum Buckets<B> {
    Anonymous(Vec<B>),
    Keyed(Vec<(String, B)>),
}

impl<B> Buckets<B> {
    pub fn is_keyed(&self) -> bool {
        matches!(self, Buckets::Keyed(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Buckets::Anonymous(buckets) => buckets.len(),
            Buckets::Keyed(buckets) => buckets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates buckets in wire order, ignoring keyed-ness
    pub fn iter(&self) -> Box<dyn Iterator<Item = &B> + '_> {
        match self {
            Buckets::Anonymous(buckets) => Box::new(buckets.iter()),
            Buckets::Keyed(buckets) => Box::new(buckets.iter().map(|(_, bucket)| bucket)),
        }
    }

    /// Returns the keys of a keyed container (empty for anonymous buckets)
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Buckets::Anonymous(_) => Vec::new(),
            Buckets::Keyed(buckets) => buckets.iter().map(|(key, _)| key.as_str()).collect(),
        }
    }

    /// Looks up a keyed bucket by its key
    pub fn get(&self, key: &str) -> Option<&B> {
        match self {
            Buckets::Anonymous(_) => None,
            Buckets::Keyed(buckets) => buckets.iter().find(|(k, _)| k == key).map(|(_, bucket)| bucket),
        }
    }
}

impl<B: Bucket> Buckets<B> {
    /// Sum of `doc_count` across all buckets
    pub fn total_doc_count(&self) -> u64 {
        self.iter().map(Bucket::doc_count).sum()
    }
}

impl<B: Serialize> Serialize for Buckets<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Buckets::Anonymous(buckets) => {
                let mut seq = serializer.serialize_seq(Some(buckets.len()))?;
                for bucket in buckets {
                    seq.serialize_element(bucket)?;
                }
                seq.end()
            }
            Buckets::Keyed(buckets) => {
                let mut map = serializer.serialize_map(Some(buckets.len()))?;
                for (key, bucket) in buckets {
                    map.serialize_entry(key, bucket)?;
                }
                map.end()
            }
        }
    }
}

/// Terms-style bucket key: strings, integers or floating point values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BucketKey {
    String(String),
    Long(i64),
    Double(f64),
}

impl BucketKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BucketKey::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Bucket of global, filter, missing, nested, reverse_nested and children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleBucket {
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Terms {
    pub doc_count_error_upper_bound: i64,
    pub sum_other_doc_count: i64,
    pub buckets: Buckets<TermsBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsBucket {
    pub key: BucketKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_count_error_upper_bound: Option<i64>,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificantTerms {
    pub doc_count: u64,
    pub buckets: Buckets<SignificantTermsBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificantTermsBucket {
    pub key: BucketKey,
    pub doc_count: u64,
    pub score: f64,
    pub bg_count: u64,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    pub buckets: Buckets<FiltersBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltersBucket {
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

/// range, date_range, ip_range and geo_distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub buckets: Buckets<RangeBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBucket {
    pub key: Option<String>,
    pub from: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_as_string: Option<String>,
    pub to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_as_string: Option<String>,
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub buckets: Buckets<HistogramBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub key: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateHistogram {
    pub buckets: Buckets<DateHistogramBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateHistogramBucket {
    /// Bucket start, decoded from epoch milliseconds
    pub key: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoHashGrid {
    pub buckets: Buckets<GeoHashGridBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoHashGridBucket {
    pub key: String,
    pub doc_count: u64,
    pub aggregations: AggregationResultCollection,
}

impl Bucket for SingleBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for TermsBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for SignificantTermsBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for FiltersBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for RangeBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for HistogramBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for DateHistogramBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

impl Bucket for GeoHashGridBucket {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }
    fn aggregations(&self) -> &AggregationResultCollection {
        &self.aggregations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters_bucket(doc_count: u64) -> FiltersBucket {
        FiltersBucket {
            doc_count,
            aggregations: AggregationResultCollection::empty(),
        }
    }

    #[test]
    fn test_collection_lookup() {
        let collection = AggregationResultCollection::from_results(vec![
            AggregationResult::new("a", AggregationBody::ValueCount(ValueCount { value: 3 })),
            AggregationResult::new("b", AggregationBody::Cardinality(Cardinality { value: 9 })),
        ]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(collection.get("b").unwrap().kind(), AggregationKind::Cardinality);
        assert!(collection.get("c").is_none());
    }

    #[test]
    fn test_keyed_bucket_access() {
        let buckets = Buckets::Keyed(vec![
            ("errors".to_string(), filters_bucket(4)),
            ("warnings".to_string(), filters_bucket(6)),
        ]);
        assert!(buckets.is_keyed());
        assert_eq!(buckets.keys(), vec!["errors", "warnings"]);
        assert_eq!(buckets.get("warnings").unwrap().doc_count, 6);
        assert_eq!(buckets.total_doc_count(), 10);
    }

    #[test]
    fn test_anonymous_buckets_have_no_keys() {
        let buckets = Buckets::Anonymous(vec![filters_bucket(1), filters_bucket(2)]);
        assert!(!buckets.is_keyed());
        assert!(buckets.keys().is_empty());
        assert!(buckets.get("0").is_none());
        assert_eq!(buckets.iter().count(), 2);
    }

    #[test]
    fn test_result_serializes_with_kind_tag() {
        let result = AggregationResult::new(
            "avg_price",
            AggregationBody::Avg(SingleValue {
                value: 2.5,
                value_as_string: None,
            }),
        );
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "name": "avg_price", "kind": "avg", "value": 2.5 })
        );
    }

    #[test]
    fn test_keyed_buckets_serialize_as_object() {
        let body = AggregationBody::Filters(Filters {
            buckets: Buckets::Keyed(vec![("errors".to_string(), filters_bucket(4))]),
        });
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "kind": "filters", "buckets": { "errors": { "doc_count": 4, "aggregations": [] } } })
        );
    }

    #[test]
    fn test_geohash_grid_kind_tag() {
        let body = AggregationBody::GeoHashGrid(GeoHashGrid {
            buckets: Buckets::Anonymous(Vec::new()),
        });
        assert_eq!(serde_json::to_value(&body).unwrap()["kind"], "geohash_grid");
        assert_eq!(body.kind(), AggregationKind::GeoHashGrid);
    }

    #[test]
    fn test_percentile_lookup() {
        let percentiles = Percentiles {
            values: vec![
                Percentile { key: 50.0, value: 3.0, value_as_string: None },
                Percentile { key: 99.0, value: 8.5, value_as_string: None },
            ],
        };
        assert_eq!(percentiles.value(99.0), Some(8.5));
        assert_eq!(percentiles.value(1.0), None);
    }
}
