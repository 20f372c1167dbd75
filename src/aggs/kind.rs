//! Recognized aggregation kinds
//!
//! Kinds fall into three families:
//! - Metric: fixed numeric/object fields, never nested
//! - SingleBucket: a document count, the aggregation object doubles as the bucket
//! - MultiBucket: a `buckets` array (anonymous) or object (keyed)

use std::fmt;

/// Shape family of an aggregation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFamily {
    Metric,
    SingleBucket,
    MultiBucket,
}

/// Every aggregation kind with a decoding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    // Metrics
    ValueCount,
    Avg,
    Min,
    Max,
    Sum,
    Stats,
    ExtendedStats,
    Percentiles,
    PercentileRanks,
    Cardinality,
    GeoBounds,
    TopHits,
    ScriptedMetric,
    // Single bucket
    Global,
    Filter,
    Missing,
    Nested,
    ReverseNested,
    Children,
    // Multi bucket
    Terms,
    SignificantTerms,
    Filters,
    Range,
    DateRange,
    IpRange,
    Histogram,
    DateHistogram,
    GeoDistance,
    GeoHashGrid,
}

impl AggregationKind {
    /// All kinds, in dispatch-table order.
    pub const ALL: [AggregationKind; 29] = [
        AggregationKind::ValueCount,
        AggregationKind::Avg,
        AggregationKind::Min,
        AggregationKind::Max,
        AggregationKind::Sum,
        AggregationKind::Stats,
        AggregationKind::ExtendedStats,
        AggregationKind::Percentiles,
        AggregationKind::PercentileRanks,
        AggregationKind::Cardinality,
        AggregationKind::GeoBounds,
        AggregationKind::TopHits,
        AggregationKind::ScriptedMetric,
        AggregationKind::Global,
        AggregationKind::Filter,
        AggregationKind::Missing,
        AggregationKind::Nested,
        AggregationKind::ReverseNested,
        AggregationKind::Children,
        AggregationKind::Terms,
        AggregationKind::SignificantTerms,
        AggregationKind::Filters,
        AggregationKind::Range,
        AggregationKind::DateRange,
        AggregationKind::IpRange,
        AggregationKind::Histogram,
        AggregationKind::DateHistogram,
        AggregationKind::GeoDistance,
        AggregationKind::GeoHashGrid,
    ];

    /// Returns the wire tag used in requests and manifests
    pub fn tag(&self) -> &'static str {
        match self {
            AggregationKind::ValueCount => "value_count",
            AggregationKind::Avg => "avg",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
            AggregationKind::Sum => "sum",
            AggregationKind::Stats => "stats",
            AggregationKind::ExtendedStats => "extended_stats",
            AggregationKind::Percentiles => "percentiles",
            AggregationKind::PercentileRanks => "percentile_ranks",
            AggregationKind::Cardinality => "cardinality",
            AggregationKind::GeoBounds => "geo_bounds",
            AggregationKind::TopHits => "top_hits",
            AggregationKind::ScriptedMetric => "scripted_metric",
            AggregationKind::Global => "global",
            AggregationKind::Filter => "filter",
            AggregationKind::Missing => "missing",
            AggregationKind::Nested => "nested",
            AggregationKind::ReverseNested => "reverse_nested",
            AggregationKind::Children => "children",
            AggregationKind::Terms => "terms",
            AggregationKind::SignificantTerms => "significant_terms",
            AggregationKind::Filters => "filters",
            AggregationKind::Range => "range",
            AggregationKind::DateRange => "date_range",
            AggregationKind::IpRange => "ip_range",
            AggregationKind::Histogram => "histogram",
            AggregationKind::DateHistogram => "date_histogram",
            AggregationKind::GeoDistance => "geo_distance",
            AggregationKind::GeoHashGrid => "geohash_grid",
        }
    }

    /// Parses a wire tag. Matching is exact; no aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.tag() == tag)
    }

    pub fn family(&self) -> KindFamily {
        match self {
            AggregationKind::ValueCount
            | AggregationKind::Avg
            | AggregationKind::Min
            | AggregationKind::Max
            | AggregationKind::Sum
            | AggregationKind::Stats
            | AggregationKind::ExtendedStats
            | AggregationKind::Percentiles
            | AggregationKind::PercentileRanks
            | AggregationKind::Cardinality
            | AggregationKind::GeoBounds
            | AggregationKind::TopHits
            | AggregationKind::ScriptedMetric => KindFamily::Metric,
            AggregationKind::Global
            | AggregationKind::Filter
            | AggregationKind::Missing
            | AggregationKind::Nested
            | AggregationKind::ReverseNested
            | AggregationKind::Children => KindFamily::SingleBucket,
            AggregationKind::Terms
            | AggregationKind::SignificantTerms
            | AggregationKind::Filters
            | AggregationKind::Range
            | AggregationKind::DateRange
            | AggregationKind::IpRange
            | AggregationKind::Histogram
            | AggregationKind::DateHistogram
            | AggregationKind::GeoDistance
            | AggregationKind::GeoHashGrid => KindFamily::MultiBucket,
        }
    }

    /// Whether results of this kind may carry sub-aggregations
    pub fn supports_sub_aggregations(&self) -> bool {
        self.family() != KindFamily::Metric
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in AggregationKind::ALL {
            assert_eq!(AggregationKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(AggregationKind::from_tag("bogus_kind"), None);
        assert_eq!(AggregationKind::from_tag("Terms"), None);
        assert_eq!(AggregationKind::from_tag(""), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(AggregationKind::Stats.family(), KindFamily::Metric);
        assert_eq!(AggregationKind::ReverseNested.family(), KindFamily::SingleBucket);
        assert_eq!(AggregationKind::GeoHashGrid.family(), KindFamily::MultiBucket);
        assert!(!AggregationKind::TopHits.supports_sub_aggregations());
        assert!(AggregationKind::Filter.supports_sub_aggregations());
    }

    #[test]
    fn test_geohash_grid_tag() {
        assert_eq!(AggregationKind::GeoHashGrid.tag(), "geohash_grid");
    }
}
