//! Aggregation manifest: the side-channel type oracle for a response
//!
//! A manifest mirrors the aggregation request. For each named aggregation it
//! records the kind tag and, when the request nested any, the manifest of its
//! sub-aggregations. The decoder consumes it read-only; one manifest can be
//! reused across any number of decode calls.
//!
//! Document form (`to_json` / `from_json`):
//!
//! ```json
//! { "colors": { "type": "terms", "aggregations": { "avg_price": { "type": "avg" } } } }
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use super::kind::AggregationKind;
use super::values::{json_type_name, make_path};

const TYPE_KEY: &str = "type";
const SUB_AGGREGATIONS_KEYS: [&str; 2] = ["aggregations", "aggs"];
const REQUEST_RESERVED_KEYS: [&str; 3] = ["aggregations", "aggs", "meta"];

/// Malformed manifest document or aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("manifest entry '{path}' must be an object, got {actual}")]
    NotAnObject { path: String, actual: &'static str },

    #[error("manifest entry '{path}' has no aggregation kind")]
    MissingKind { path: String },

    #[error("manifest entry '{path}' declares several kinds: {}", .kinds.join(", "))]
    AmbiguousKind { path: String, kinds: Vec<String> },

    #[error("manifest entry '{path}' has a non-string kind ({actual})")]
    InvalidKind { path: String, actual: &'static str },
}

impl ManifestError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        "AGGS_MANIFEST_INVALID"
    }
}

/// Result type for manifest construction
pub type ManifestResult<T> = Result<T, ManifestError>;

/// One named aggregation in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationManifestEntry {
    kind: String,
    sub_manifest: Option<AggregationManifest>,
}

impl AggregationManifestEntry {
    /// Create an entry with no sub-aggregations
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            sub_manifest: None,
        }
    }

    /// Create an entry for a known kind
    pub fn of(kind: AggregationKind) -> Self {
        Self::new(kind.tag())
    }

    /// Attach the manifest describing this aggregation's sub-aggregations
    pub fn with_sub_manifest(mut self, sub_manifest: AggregationManifest) -> Self {
        self.sub_manifest = Some(sub_manifest);
        self
    }

    /// Returns the declared kind tag, recognized or not
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the parsed kind, or `None` for an unrecognized tag
    pub fn parsed_kind(&self) -> Option<AggregationKind> {
        AggregationKind::from_tag(&self.kind)
    }

    pub fn sub_manifest(&self) -> Option<&AggregationManifest> {
        self.sub_manifest.as_ref()
    }
}

/// Ordered mapping from aggregation name to manifest entry.
///
/// Iteration order is insertion order and determines the order of decoded
/// results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationManifest {
    entries: Vec<(String, AggregationManifestEntry)>,
}

impl AggregationManifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, name: impl Into<String>, entry: AggregationManifestEntry) -> Self {
        self.insert(name, entry);
        self
    }

    /// Inserts an entry. Re-inserting a name replaces its entry in place.
    pub fn insert(&mut self, name: impl Into<String>, entry: AggregationManifestEntry) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AggregationManifestEntry> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, entry)| entry)
    }

    /// Returns the (name, entry) pairs in manifest order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &AggregationManifestEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the manifest document form.
    pub fn from_json(value: &Value) -> ManifestResult<Self> {
        Self::parse_document(value, "")
    }

    fn parse_document(value: &Value, path: &str) -> ManifestResult<Self> {
        let map = as_object(value, path)?;
        let mut manifest = Self::new();

        for (name, entry_value) in map {
            let entry_path = make_path(path, name);
            let entry_map = as_object(entry_value, &entry_path)?;

            let kind = match entry_map.get(TYPE_KEY) {
                Some(Value::String(kind)) => kind.clone(),
                Some(other) => {
                    return Err(ManifestError::InvalidKind {
                        path: entry_path,
                        actual: json_type_name(other),
                    })
                }
                None => return Err(ManifestError::MissingKind { path: entry_path }),
            };

            let mut entry = AggregationManifestEntry::new(kind);
            if let Some((key, sub)) = sub_aggregations(entry_map) {
                entry = entry.with_sub_manifest(Self::parse_document(sub, &make_path(&entry_path, key))?);
            }
            manifest.insert(name.clone(), entry);
        }

        Ok(manifest)
    }

    /// Renders the manifest document form.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, entry) in self.entries() {
            let mut entry_map = Map::new();
            entry_map.insert(TYPE_KEY.to_string(), Value::String(entry.kind.clone()));
            if let Some(sub) = entry.sub_manifest() {
                entry_map.insert("aggregations".to_string(), sub.to_json());
            }
            map.insert(name.to_string(), Value::Object(entry_map));
        }
        Value::Object(map)
    }

    /// Derives a manifest from either a full search body or a bare
    /// aggregation mapping.
    ///
    /// A top-level `aggregations` or `aggs` key marks a search body, so a bare
    /// mapping cannot name an aggregation `aggs` here; use
    /// [`from_request_aggregations`](Self::from_request_aggregations) for that.
    pub fn from_request(request: &Value) -> ManifestResult<Self> {
        match request.as_object().and_then(sub_aggregations) {
            Some(_) => Self::from_request_body(request),
            None => Self::from_request_aggregations(request),
        }
    }

    /// Derives a manifest from a search request body.
    ///
    /// The aggregations are read from the body's `aggregations` (or `aggs`)
    /// key; a body without either yields an empty manifest.
    pub fn from_request_body(body: &Value) -> ManifestResult<Self> {
        let map = as_object(body, "")?;
        match sub_aggregations(map) {
            Some((key, aggregations)) => Self::parse_request(aggregations, key),
            None => Ok(Self::new()),
        }
    }

    /// Derives a manifest from a bare aggregation request mapping
    /// (`{name: {kind: {...}, "aggs": {...}}}`).
    ///
    /// Kind tags are taken as written; unrecognized ones surface when the
    /// response is decoded.
    pub fn from_request_aggregations(aggregations: &Value) -> ManifestResult<Self> {
        Self::parse_request(aggregations, "")
    }

    fn parse_request(value: &Value, path: &str) -> ManifestResult<Self> {
        let map = as_object(value, path)?;
        let mut manifest = Self::new();

        for (name, request) in map {
            let entry_path = make_path(path, name);
            let request_map = as_object(request, &entry_path)?;

            let kinds: Vec<&String> = request_map
                .keys()
                .filter(|key| !REQUEST_RESERVED_KEYS.contains(&key.as_str()))
                .collect();

            if kinds.len() > 1 {
                return Err(ManifestError::AmbiguousKind {
                    path: entry_path,
                    kinds: kinds.into_iter().cloned().collect(),
                });
            }
            let kind = match kinds.first() {
                Some(kind) => (*kind).clone(),
                None => return Err(ManifestError::MissingKind { path: entry_path }),
            };

            let mut entry = AggregationManifestEntry::new(kind);
            if let Some((key, sub)) = sub_aggregations(request_map) {
                let sub_manifest = Self::parse_request(sub, &make_path(&entry_path, key))?;
                // An empty `aggs` block declares nothing.
                if !sub_manifest.is_empty() {
                    entry = entry.with_sub_manifest(sub_manifest);
                }
            }
            manifest.insert(name.clone(), entry);
        }

        Ok(manifest)
    }
}

/// Returns the nested aggregation block, preferring `aggregations` over `aggs`.
fn sub_aggregations(map: &Map<String, Value>) -> Option<(&'static str, &Value)> {
    SUB_AGGREGATIONS_KEYS
        .iter()
        .find_map(|key| map.get(*key).map(|value| (*key, value)))
}

fn as_object<'a>(value: &'a Value, path: &str) -> ManifestResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| ManifestError::NotAnObject {
        path: if path.is_empty() { "$root".to_string() } else { path.to_string() },
        actual: json_type_name(value),
    })
}
