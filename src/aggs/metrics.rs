//! Metric decoding rules
//!
//! Metric aggregations read a fixed set of fields off the aggregation object
//! and never recurse. Absent or `null` numbers default to zero.

use serde_json::Value;

use super::decoder::{AggregationDecoder, Frame};
use super::errors::{DecodeError, DecodeResult};
use super::manifest::AggregationManifest;
use super::result::{
    AggregationBody, BoundingBox, Cardinality, ExtendedStats, GeoBounds, GeoPoint, Percentile,
    Percentiles, ScriptedMetric, SingleValue, Stats, StdDeviationBounds, TopHits, ValueCount,
};
use super::values::{
    count_value, double_at, double_value, expect_object, json_type_name, make_path, object_field,
    optional_double, optional_string, JsonObject,
};

pub(crate) fn value_count(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    Ok(AggregationBody::ValueCount(ValueCount {
        value: count_value(map, "value", frame.path())?,
    }))
}

pub(crate) fn cardinality(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    Ok(AggregationBody::Cardinality(Cardinality {
        value: count_value(map, "value", frame.path())?,
    }))
}

pub(crate) fn avg(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_value(frame, map).map(AggregationBody::Avg)
}

pub(crate) fn min(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_value(frame, map).map(AggregationBody::Min)
}

pub(crate) fn max(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_value(frame, map).map(AggregationBody::Max)
}

pub(crate) fn sum(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    single_value(frame, map).map(AggregationBody::Sum)
}

fn single_value(frame: &Frame, map: &JsonObject) -> DecodeResult<SingleValue> {
    Ok(SingleValue {
        value: double_value(map, "value", frame.path())?,
        value_as_string: optional_string(map, "value_as_string", frame.path())?,
    })
}

pub(crate) fn stats(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_stats(frame, map).map(AggregationBody::Stats)
}

fn read_stats(frame: &Frame, map: &JsonObject) -> DecodeResult<Stats> {
    let path = frame.path();
    Ok(Stats {
        count: count_value(map, "count", path)?,
        min: double_value(map, "min", path)?,
        max: double_value(map, "max", path)?,
        avg: double_value(map, "avg", path)?,
        sum: double_value(map, "sum", path)?,
        min_as_string: optional_string(map, "min_as_string", path)?,
        max_as_string: optional_string(map, "max_as_string", path)?,
        avg_as_string: optional_string(map, "avg_as_string", path)?,
        sum_as_string: optional_string(map, "sum_as_string", path)?,
    })
}

pub(crate) fn extended_stats(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let path = frame.path();

    let std_deviation_bounds = match object_field(map, "std_deviation_bounds", path)? {
        Some(bounds) => {
            let bounds_path = make_path(path, "std_deviation_bounds");
            Some(StdDeviationBounds {
                upper: double_value(bounds, "upper", &bounds_path)?,
                lower: double_value(bounds, "lower", &bounds_path)?,
            })
        }
        None => None,
    };

    Ok(AggregationBody::ExtendedStats(ExtendedStats {
        stats: read_stats(frame, map)?,
        sum_of_squares: double_value(map, "sum_of_squares", path)?,
        variance: double_value(map, "variance", path)?,
        std_deviation: double_value(map, "std_deviation", path)?,
        std_deviation_bounds,
    }))
}

pub(crate) fn percentiles(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_percentiles(frame, map).map(AggregationBody::Percentiles)
}

pub(crate) fn percentile_ranks(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    read_percentiles(frame, map).map(AggregationBody::PercentileRanks)
}

const AS_STRING_SUFFIX: &str = "_as_string";

/// `values` is `{"50.0": 3.0}` when keyed, `[{"key": 50.0, "value": 3.0}]` otherwise.
fn read_percentiles(frame: &Frame, map: &JsonObject) -> DecodeResult<Percentiles> {
    let values_frame = frame.field("values");

    let values = match map.get("values") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(keyed)) => {
            let mut values = Vec::with_capacity(keyed.len());
            for (key, value) in keyed {
                // Formatted siblings ("50.0_as_string") attach to their numeric key.
                if key.ends_with(AS_STRING_SUFFIX) {
                    continue;
                }
                let entry_path = make_path(values_frame.path(), key);
                let value_as_string =
                    optional_string(keyed, &format!("{}{}", key, AS_STRING_SUFFIX), values_frame.path())?;
                let key = key
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| DecodeError::type_mismatch(entry_path.as_str(), "numeric key", "string"))?;
                values.push(Percentile {
                    key,
                    value: double_at(value, &entry_path)?.unwrap_or(0.0),
                    value_as_string,
                });
            }
            values
        }
        Some(Value::Array(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item_frame = values_frame.element(index);
                let entry = expect_object(item, item_frame.path())?;
                values.push(Percentile {
                    key: double_value(entry, "key", item_frame.path())?,
                    value: double_value(entry, "value", item_frame.path())?,
                    value_as_string: optional_string(entry, "value_as_string", item_frame.path())?,
                });
            }
            values
        }
        Some(other) => {
            return Err(DecodeError::type_mismatch(
                values_frame.path(),
                "object or array",
                json_type_name(other),
            ))
        }
    };

    Ok(Percentiles { values })
}

pub(crate) fn geo_bounds(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let bounds = match object_field(map, "bounds", frame.path())? {
        Some(bounds) => {
            let bounds_frame = frame.field("bounds");
            Some(BoundingBox {
                top_left: geo_point(&bounds_frame, bounds, "top_left")?,
                bottom_right: geo_point(&bounds_frame, bounds, "bottom_right")?,
            })
        }
        None => None,
    };

    Ok(AggregationBody::GeoBounds(GeoBounds { bounds }))
}

fn geo_point(frame: &Frame, bounds: &JsonObject, corner: &str) -> DecodeResult<GeoPoint> {
    let point = object_field(bounds, corner, frame.path())?
        .ok_or_else(|| DecodeError::missing_field(frame.path(), corner))?;
    let point_path = make_path(frame.path(), corner);
    Ok(GeoPoint {
        lat: double_value(point, "lat", &point_path)?,
        lon: double_value(point, "lon", &point_path)?,
    })
}

pub(crate) fn top_hits(
    _decoder: &AggregationDecoder,
    frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    let hits = match object_field(map, "hits", frame.path())? {
        Some(hits) => hits,
        None => {
            return Ok(AggregationBody::TopHits(TopHits {
                total: 0,
                max_score: None,
                hits: Vec::new(),
            }))
        }
    };

    let hits_frame = frame.field("hits");
    let documents = match hits.get("hits") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(documents)) => documents.clone(),
        Some(other) => {
            return Err(DecodeError::type_mismatch(
                make_path(hits_frame.path(), "hits"),
                "array",
                json_type_name(other),
            ))
        }
    };

    Ok(AggregationBody::TopHits(TopHits {
        total: count_value(hits, "total", hits_frame.path())?,
        max_score: optional_double(hits, "max_score", hits_frame.path())?,
        hits: documents,
    }))
}

pub(crate) fn scripted_metric(
    _decoder: &AggregationDecoder,
    _frame: &Frame,
    map: &JsonObject,
    _manifest: Option<&AggregationManifest>,
) -> DecodeResult<AggregationBody> {
    Ok(AggregationBody::ScriptedMetric(ScriptedMetric {
        value: map.get("value").cloned().unwrap_or(Value::Null),
    }))
}
