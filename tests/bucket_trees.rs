//! Bucket Tree Tests
//!
//! End-to-end decoding of nested bucket responses:
//! - Keyed buckets keep the response's mapping keys in order
//! - Anonymous buckets keep array order
//! - Sub-aggregations decode inside every bucket
//! - Manifests derived from request bodies drive the decode

use esaggs::aggs::{
    decode, AggregationBody, AggregationKind, AggregationManifest, AggregationManifestEntry,
    Bucket, BucketKey, Buckets, DecodeErrorCode,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn sales_request() -> serde_json::Value {
    json!({
        "size": 0,
        "aggs": {
            "per_month": {
                "date_histogram": { "field": "date", "calendar_interval": "month" },
                "aggs": {
                    "types": {
                        "terms": { "field": "type" },
                        "aggs": { "price": { "stats": { "field": "price" } } }
                    }
                }
            },
            "price_ranges": {
                "range": { "field": "price", "keyed": true, "ranges": [ { "to": 100 }, { "from": 100 } ] }
            }
        }
    })
}

fn sales_response() -> serde_json::Value {
    json!({
        "took": 5,
        "hits": { "total": 7, "hits": [] },
        "aggregations": {
            "per_month": {
                "buckets": [
                    {
                        "key_as_string": "2015/01/01",
                        "key": 1420070400000i64,
                        "doc_count": 3,
                        "types": {
                            "doc_count_error_upper_bound": 0,
                            "sum_other_doc_count": 0,
                            "buckets": [
                                { "key": "hat", "doc_count": 2, "price": { "count": 2, "min": 10.0, "max": 20.0, "avg": 15.0, "sum": 30.0 } },
                                { "key": "t-shirt", "doc_count": 1, "price": { "count": 1, "min": 5.0, "max": 5.0, "avg": 5.0, "sum": 5.0 } }
                            ]
                        }
                    },
                    {
                        "key_as_string": "2015/02/01",
                        "key": 1422748800000i64,
                        "doc_count": 4,
                        "types": { "buckets": [] }
                    }
                ]
            },
            "price_ranges": {
                "buckets": {
                    "*-100.0": { "to": 100.0, "doc_count": 5 },
                    "100.0-*": { "from": 100.0, "doc_count": 2 }
                }
            }
        }
    })
}

// =============================================================================
// Request-Derived Manifest Tests
// =============================================================================

#[test]
fn test_request_manifest_decodes_response() {
    let manifest = AggregationManifest::from_request_body(&sales_request()).unwrap();
    assert_eq!(manifest.len(), 2);

    let results = decode(&sales_response(), Some(&manifest)).unwrap();
    assert_eq!(results.names().collect::<Vec<_>>(), vec!["per_month", "price_ranges"]);

    let months = match results.get("per_month").unwrap().body() {
        AggregationBody::DateHistogram(h) => &h.buckets,
        other => panic!("unexpected body {:?}", other),
    };
    assert!(!months.is_keyed());
    assert_eq!(months.len(), 2);
    assert_eq!(months.total_doc_count(), 7);

    let january = months.iter().next().unwrap();
    let types = match january.aggregations().get("types").unwrap().body() {
        AggregationBody::Terms(t) => t,
        other => panic!("unexpected body {:?}", other),
    };
    let keys: Vec<_> = types.buckets.iter().map(|b| b.key.clone()).collect();
    assert_eq!(keys, vec![BucketKey::String("hat".into()), BucketKey::String("t-shirt".into())]);

    let hat = types.buckets.iter().next().unwrap();
    match hat.aggregations.get("price").unwrap().body() {
        AggregationBody::Stats(stats) => {
            assert_eq!(stats.count, 2);
            assert_eq!(stats.sum, 30.0);
        }
        other => panic!("unexpected body {:?}", other),
    }

    let february = months.iter().nth(1).unwrap();
    match february.aggregations().get("types").unwrap().body() {
        AggregationBody::Terms(t) => assert!(t.buckets.is_empty()),
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_keyed_range_keeps_response_keys() {
    let manifest = AggregationManifest::from_request_body(&sales_request()).unwrap();
    let results = decode(&sales_response(), Some(&manifest)).unwrap();

    let ranges = results.get("price_ranges").unwrap().body().as_range().unwrap();
    assert!(ranges.buckets.is_keyed());
    assert_eq!(ranges.buckets.keys(), vec!["*-100.0", "100.0-*"]);
    assert_eq!(ranges.buckets.get("100.0-*").unwrap().doc_count, 2);
}

#[test]
fn test_missing_sub_aggregation_in_bucket() {
    let manifest = AggregationManifest::from_request_body(&sales_request()).unwrap();
    let mut response = sales_response();
    response["aggregations"]["per_month"]["buckets"][0]["types"]["buckets"][1]
        .as_object_mut()
        .unwrap()
        .remove("price");

    let err = decode(&response, Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::StructuralMismatch);
    assert_eq!(err.path(), "aggregations.per_month.buckets[0].types.buckets[1]");
}

// =============================================================================
// Keyed vs Anonymous Tests
// =============================================================================

#[test]
fn test_same_kind_both_shapes() {
    let manifest = AggregationManifest::new().with("f", AggregationManifestEntry::of(AggregationKind::Filters));

    let keyed = json!({ "aggregations": { "f": { "buckets": {
        "b": { "doc_count": 1 },
        "a": { "doc_count": 2 }
    } } } });
    let anonymous = json!({ "aggregations": { "f": { "buckets": [
        { "doc_count": 1 },
        { "doc_count": 2 }
    ] } } });

    for (raw, expect_keyed) in [(keyed, true), (anonymous, false)] {
        let results = decode(&raw, Some(&manifest)).unwrap();
        match results.get("f").unwrap().body() {
            AggregationBody::Filters(f) => {
                assert_eq!(f.buckets.is_keyed(), expect_keyed);
                let counts: Vec<u64> = f.buckets.iter().map(|b| b.doc_count).collect();
                assert_eq!(counts, vec![1, 2]);
            }
            other => panic!("unexpected body {:?}", other),
        }
    }
}

#[test]
fn test_keyed_bucket_order_is_response_order() {
    let manifest = AggregationManifest::new().with("h", AggregationManifestEntry::of(AggregationKind::Histogram));
    let raw = json!({ "aggregations": { "h": { "buckets": {
        "20.0": { "key": 20.0, "doc_count": 1 },
        "0.0": { "key": 0.0, "doc_count": 4 },
        "10.0": { "key": 10.0, "doc_count": 2 }
    } } } });

    let results = decode(&raw, Some(&manifest)).unwrap();
    match results.get("h").unwrap().body() {
        AggregationBody::Histogram(h) => match &h.buckets {
            Buckets::Keyed(buckets) => {
                let keys: Vec<&str> = buckets.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["20.0", "0.0", "10.0"]);
            }
            Buckets::Anonymous(_) => panic!("expected keyed buckets"),
        },
        other => panic!("unexpected body {:?}", other),
    }
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_results_serialize_with_kind_tags() {
    let manifest = AggregationManifest::new().with(
        "g",
        AggregationManifestEntry::of(AggregationKind::GeoHashGrid),
    );
    let raw = json!({ "aggregations": { "g": { "buckets": [ { "key": "u17", "doc_count": 3 } ] } } });

    let results = decode(&raw, Some(&manifest)).unwrap();
    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(
        value,
        json!([{
            "name": "g",
            "kind": "geohash_grid",
            "buckets": [ { "key": "u17", "doc_count": 3, "aggregations": [] } ]
        }])
    );
}
