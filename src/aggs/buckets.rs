//! Bucket decoding rules
//!
//! Single-bucket kinds treat the aggregation object as the one implicit
//! bucket. Multi-bucket kinds read `buckets`, whose JSON shape selects the
//! container: an array gives anonymous buckets in array order, an object gives
//! keyed buckets where each object key becomes the bucket key. Every bucket
//! recurses into the decoder with the entry's sub-manifest.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::decoder::{AggregationDecoder, Frame};
use super::errors::{DecodeError, DecodeResult};
use super::manifest::AggregationManifest;
use super::result::{
    AggregationBody, BucketKey, Buckets, DateHistogram, DateHistogramBucket, Filters,
    FiltersBucket, GeoHashGrid, GeoHashGridBucket, Histogram, HistogramBucket, Range, RangeBucket,
    SignificantTerms, SignificantTermsBucket, SingleBucket, Terms, TermsBucket,
};
use super::values::{
    count_value, double_value, expect_object, json_type_name, long_value, make_path,
    optional_double, optional_long, optional_string, JsonObject,
};

const BUCKETS: &str = "buckets";
const KEY: &str = "key";
const DOC_COUNT: &str = "doc_count";

// =============================================================================
// Single bucket
// =============================================================================

fn single_bucket(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<SingleBucket> {
    Ok(SingleBucket {
        doc_count: count_value(map, DOC_COUNT, frame.path())?,
        aggregations: decoder.decode_children(frame, map, manifest)?,
    })
}

pub(crate) fn global(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::Global)
}

pub(crate) fn filter(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::Filter)
}

pub(crate) fn missing(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::Missing)
}

pub(crate) fn nested(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::Nested)
}

pub(crate) fn reverse_nested(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::ReverseNested)
}

pub(crate) fn children(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_bucket(decoder, frame, map, manifest).map(AggregationBody::Children)
}

// =============================================================================
// Multi bucket
// =============================================================================

/// Reads `buckets`, branching on its runtime shape.
///
/// `decode_bucket` receives the bucket frame, the keyed-map key (if any) and
/// the bucket object.
fn read_buckets<B>(
    frame: &Frame,
    map: &JsonObject,
    mut decode_bucket: impl FnMut(&Frame, Option<&str>, &JsonObject) -> DecodeResult<B>,
) -> DecodeResult<Buckets<B>> {
    let buckets_frame = frame.field(BUCKETS);

    match map.get(BUCKETS) {
        Some(Value::Array(items)) => {
            let mut buckets = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let bucket_frame = buckets_frame.element(index);
                let bucket = expect_object(item, bucket_frame.path())?;
                buckets.push(decode_bucket(&bucket_frame, None, bucket)?);
            }
            Ok(Buckets::Anonymous(buckets))
        }
        Some(Value::Object(entries)) => {
            let mut buckets = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                let bucket_frame = buckets_frame.field(key);
                let bucket = expect_object(item, bucket_frame.path())?;
                buckets.push((key.clone(), decode_bucket(&bucket_frame, Some(key.as_str()), bucket)?));
            }
            Ok(Buckets::Keyed(buckets))
        }
        Some(other) => Err(DecodeError::type_mismatch(
            buckets_frame.path(),
            "array or object",
            json_type_name(other),
        )),
        None => Err(DecodeError::missing_field(frame.path(), BUCKETS)),
    }
}

/// Terms-style key: the bucket's own `key`, else the keyed-map key.
fn bucket_key(frame: &Frame, bucket: &JsonObject, keyed: Option<&str>) -> DecodeResult<BucketKey> {
    match bucket.get(KEY) {
        Some(Value::String(s)) => Ok(BucketKey::String(s.clone())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(long) => Ok(BucketKey::Long(long)),
            None => Ok(BucketKey::Double(n.as_f64().unwrap_or(f64::NAN))),
        },
        None | Some(Value::Null) => keyed
            .map(|key| BucketKey::String(key.to_string()))
            .ok_or_else(|| DecodeError::missing_field(frame.path(), KEY)),
        Some(Value::Bool(b)) => Ok(BucketKey::String(b.to_string())),
        Some(other) => Err(DecodeError::type_mismatch(
            make_path(frame.path(), KEY),
            "string or number",
            json_type_name(other),
        )),
    }
}

/// Optional string key: the bucket's own `key`, else the keyed-map key.
fn string_key(frame: &Frame, bucket: &JsonObject, keyed: Option<&str>) -> DecodeResult<Option<String>> {
    Ok(optional_string(bucket, KEY, frame.path())?.or_else(|| keyed.map(str::to_string)))
}

pub(crate) fn terms(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        Ok(TermsBucket {
            key: bucket_key(bucket_frame, bucket, keyed)?,
            key_as_string: optional_string(bucket, "key_as_string", path)?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            doc_count_error_upper_bound: optional_long(bucket, "doc_count_error_upper_bound", path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::Terms(Terms {
        doc_count_error_upper_bound: long_value(map, "doc_count_error_upper_bound", frame.path())?,
        sum_other_doc_count: long_value(map, "sum_other_doc_count", frame.path())?,
        buckets,
    }))
}

pub(crate) fn significant_terms(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        Ok(SignificantTermsBucket {
            key: bucket_key(bucket_frame, bucket, keyed)?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            score: double_value(bucket, "score", path)?,
            bg_count: count_value(bucket, "bg_count", path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::SignificantTerms(SignificantTerms {
        doc_count: count_value(map, DOC_COUNT, frame.path())?,
        buckets,
    }))
}

pub(crate) fn filters(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, _keyed, bucket| {
        Ok(FiltersBucket {
            doc_count: count_value(bucket, DOC_COUNT, bucket_frame.path())?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::Filters(Filters { buckets }))
}

fn read_range(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<Range> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        Ok(RangeBucket {
            key: string_key(bucket_frame, bucket, keyed)?,
            from: optional_double(bucket, "from", path)?,
            from_as_string: optional_string(bucket, "from_as_string", path)?,
            to: optional_double(bucket, "to", path)?,
            to_as_string: optional_string(bucket, "to_as_string", path)?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(Range { buckets })
}

pub(crate) fn range(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_range(decoder, frame, map, manifest).map(AggregationBody::Range)
}

pub(crate) fn date_range(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_range(decoder, frame, map, manifest).map(AggregationBody::DateRange)
}

pub(crate) fn ip_range(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_range(decoder, frame, map, manifest).map(AggregationBody::IpRange)
}

pub(crate) fn geo_distance(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_range(decoder, frame, map, manifest).map(AggregationBody::GeoDistance)
}

pub(crate) fn histogram(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        let key = match optional_double(bucket, KEY, path)? {
            Some(key) => key,
            None => keyed
                .and_then(|key| key.trim().parse::<f64>().ok())
                .ok_or_else(|| DecodeError::missing_field(path, KEY))?,
        };
        Ok(HistogramBucket {
            key,
            key_as_string: optional_string(bucket, "key_as_string", path)?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::Histogram(Histogram { buckets }))
}

pub(crate) fn date_histogram(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        let millis = match optional_long(bucket, KEY, path)? {
            Some(millis) => millis,
            None => keyed
                .and_then(|key| key.trim().parse::<i64>().ok())
                .ok_or_else(|| DecodeError::missing_field(path, KEY))?,
        };
        let key = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            DecodeError::type_mismatch(make_path(path, KEY), "epoch milliseconds", "out-of-range number")
        })?;
        Ok(DateHistogramBucket {
            key,
            key_as_string: optional_string(bucket, "key_as_string", path)?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::DateHistogram(DateHistogram { buckets }))
}

pub(crate) fn geohash_grid(
    decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let buckets = read_buckets(frame, map, |bucket_frame, keyed, bucket| {
        let path = bucket_frame.path();
        Ok(GeoHashGridBucket {
            key: string_key(bucket_frame, bucket, keyed)?
                .ok_or_else(|| DecodeError::missing_field(path, KEY))?,
            doc_count: count_value(bucket, DOC_COUNT, path)?,
            aggregations: decoder.decode_children(bucket_frame, bucket, manifest)?,
        })
    })?;

    Ok(AggregationBody::GeoHashGrid(GeoHashGrid { buckets }))
}
