//! Decode Property Tests
//!
//! Contract of `decode(response, manifest)`:
//! - Output has exactly one result per manifest entry, in manifest order
//! - Decoding is deterministic
//! - Manifest names missing from the response abort the decode
//! - Unknown kinds abort the decode
//! - Absent numeric fields read as zero

use esaggs::aggs::{
    decode, decode_unwrapped, AggregationBody, AggregationDecoder, AggregationKind,
    AggregationManifest, AggregationManifestEntry, DecodeErrorCode, KindFamily,
};
use esaggs::config::DecoderConfig;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn flat_manifest(entries: &[(&str, AggregationKind)]) -> AggregationManifest {
    entries.iter().fold(AggregationManifest::new(), |manifest, (name, kind)| {
        manifest.with(*name, AggregationManifestEntry::of(*kind))
    })
}

// =============================================================================
// Shape and Order Tests
// =============================================================================

/// One result per manifest entry, following manifest order, not response order.
#[test]
fn test_results_follow_manifest_order() {
    let manifest = flat_manifest(&[
        ("zeta", AggregationKind::Sum),
        ("alpha", AggregationKind::ValueCount),
        ("mid", AggregationKind::Cardinality),
    ]);
    let raw = json!({
        "took": 3,
        "aggregations": {
            "alpha": { "value": 10 },
            "mid": { "value": 4 },
            "unlisted": { "value": 1 },
            "zeta": { "value": 2.5 }
        }
    });

    let results = decode(&raw, Some(&manifest)).unwrap();
    assert_eq!(results.len(), manifest.len());
    assert_eq!(results.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    assert_eq!(results.get("zeta").unwrap().kind(), AggregationKind::Sum);
}

/// Same inputs give structurally equal results.
#[test]
fn test_decode_is_deterministic() {
    let manifest = AggregationManifest::new().with(
        "colors",
        AggregationManifestEntry::of(AggregationKind::Terms).with_sub_manifest(flat_manifest(&[(
            "price",
            AggregationKind::Stats,
        )])),
    );
    let raw = json!({ "aggregations": { "colors": { "buckets": [
        { "key": "red", "doc_count": 2, "price": { "count": 2, "min": 1.0, "max": 3.0, "avg": 2.0, "sum": 4.0 } },
        { "key": "blue", "doc_count": 1, "price": {} }
    ] } } });

    let first = decode(&raw, Some(&manifest)).unwrap();
    for _ in 0..10 {
        assert_eq!(decode(&raw, Some(&manifest)).unwrap(), first);
    }
}

/// Every metric and single-bucket kind decodes from an empty object.
#[test]
fn test_all_kinds_have_rules() {
    for kind in AggregationKind::ALL {
        if kind.family() == KindFamily::MultiBucket {
            continue;
        }
        let manifest = flat_manifest(&[("x", kind)]);
        let raw = json!({ "aggregations": { "x": {} } });
        let results = decode(&raw, Some(&manifest))
            .unwrap_or_else(|e| panic!("{} failed: {}", kind, e));
        assert_eq!(results.get("x").unwrap().kind(), kind);
    }
}

// =============================================================================
// Defaulting Tests
// =============================================================================

#[test]
fn test_empty_stats_read_as_zero() {
    let manifest = flat_manifest(&[("s", AggregationKind::Stats)]);
    let raw = json!({ "aggregations": { "s": {} } });

    let results = decode(&raw, Some(&manifest)).unwrap();
    match results.get("s").unwrap().body() {
        AggregationBody::Stats(stats) => {
            assert_eq!(stats.count, 0);
            assert_eq!(stats.min, 0.0);
            assert_eq!(stats.max, 0.0);
            assert_eq!(stats.avg, 0.0);
            assert_eq!(stats.sum, 0.0);
        }
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_null_values_read_as_zero() {
    let manifest = flat_manifest(&[("avg", AggregationKind::Avg)]);
    let raw = json!({ "aggregations": { "avg": { "value": null } } });

    let results = decode(&raw, Some(&manifest)).unwrap();
    assert_eq!(results.get("avg").unwrap().body().as_single_value().unwrap().value, 0.0);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_missing_aggregation_is_structural_mismatch() {
    let manifest = flat_manifest(&[("a", AggregationKind::Sum)]);
    let raw = json!({ "aggregations": {} });

    let err = decode(&raw, Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::StructuralMismatch);
    assert_eq!(err.code().code(), "AGGS_STRUCTURAL_MISMATCH");
}

#[test]
fn test_unknown_kind_is_unsupported() {
    let manifest = AggregationManifest::new().with("a", AggregationManifestEntry::new("matrix_stats"));
    let raw = json!({ "aggregations": { "a": {} } });

    let err = decode(&raw, Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::UnsupportedKind);
    assert_eq!(err.path(), "aggregations.a");
}

#[test]
fn test_wrong_value_type_is_type_mismatch() {
    let manifest = flat_manifest(&[("c", AggregationKind::ValueCount)]);
    let raw = json!({ "aggregations": { "c": { "value": "many" } } });

    let err = decode(&raw, Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::TypeMismatch);
    assert_eq!(err.path(), "aggregations.c.value");
}

#[test]
fn test_response_without_aggregations_and_nonempty_manifest() {
    let manifest = flat_manifest(&[("a", AggregationKind::Sum)]);
    let err = decode(&json!({ "hits": {} }), Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::StructuralMismatch);
}

// =============================================================================
// Empty Case Tests
// =============================================================================

#[test]
fn test_no_manifest_no_aggregations() {
    let results = decode(&json!({ "hits": { "total": 0 } }), None).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_empty_manifest_no_aggregations() {
    let results = decode(&json!({}), Some(&AggregationManifest::new())).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_aggregations_without_manifest() {
    let raw = json!({ "aggregations": { "a": { "value": 1 } } });
    let err = decode(&raw, None).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::StructuralMismatch);
}

// =============================================================================
// Nesting Tests
// =============================================================================

#[test]
fn test_global_with_nested_value_count() {
    let manifest = AggregationManifest::new().with(
        "g",
        AggregationManifestEntry::of(AggregationKind::Global)
            .with_sub_manifest(flat_manifest(&[("c", AggregationKind::ValueCount)])),
    );
    let raw = json!({ "aggregations": { "g": { "doc_count": 100, "c": { "value": 7 } } } });

    let results = decode(&raw, Some(&manifest)).unwrap();
    let global = results.get("g").unwrap().body().as_single_bucket().unwrap();
    match global.aggregations.get("c").unwrap().body() {
        AggregationBody::ValueCount(count) => assert_eq!(count.value, 7),
        other => panic!("unexpected body {:?}", other),
    }
}

#[test]
fn test_depth_limit_from_config() {
    let manifest = AggregationManifest::new().with(
        "outer",
        AggregationManifestEntry::of(AggregationKind::Nested).with_sub_manifest(
            AggregationManifest::new().with(
                "inner",
                AggregationManifestEntry::of(AggregationKind::Filter)
                    .with_sub_manifest(flat_manifest(&[("n", AggregationKind::ValueCount)])),
            ),
        ),
    );
    let raw = json!({ "aggregations": { "outer": { "inner": { "n": { "value": 1 } } } } });

    let shallow = AggregationDecoder::new(DecoderConfig::with_max_depth(1));
    let err = shallow.decode(&raw, Some(&manifest)).unwrap_err();
    assert_eq!(err.code(), DecodeErrorCode::DepthExceeded);

    assert!(AggregationDecoder::default().decode(&raw, Some(&manifest)).is_ok());
}

#[test]
fn test_unwrapped_matches_wrapped() {
    let manifest = flat_manifest(&[("m", AggregationKind::Max)]);
    let scope = json!({ "m": { "value": 9.0 } });
    let wrapped = json!({ "aggregations": scope.clone() });

    let a = decode(&wrapped, Some(&manifest)).unwrap();
    let b = decode_unwrapped(scope.as_object().unwrap(), Some(&manifest)).unwrap();
    assert_eq!(a, b);
}
