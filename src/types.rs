//! Core types for schema validation.

use serde::Deserialize;
use serde_json::Value;

/// Default bound on reference hops along one branch.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Returns the JSON type name for error messages.
///
/// Numbers with no fractional part report as `integer`, matching the
/// `type` keyword's view of them.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if is_integer(n) => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether `value` is of the named JSON Schema type.
///
/// Unknown type names match nothing.
pub fn matches_type(value: &Value, type_name: &str) -> bool {
    match (type_name, value) {
        ("null", Value::Null) => true,
        ("boolean", Value::Bool(_)) => true,
        ("number", Value::Number(_)) => true,
        ("integer", Value::Number(n)) => is_integer(n),
        ("string", Value::String(_)) => true,
        ("array", Value::Array(_)) => true,
        ("object", Value::Object(_)) => true,
        _ => false,
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
}

/// Deep equality with JSON Schema number semantics (`1 == 1.0`).
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).map(|w| json_equal(v, w)).unwrap_or(false))
        }
        _ => a == b,
    }
}

/// JSON Schema dialect, as far as array-item and `$ref` semantics are
/// concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// 2020-12: `prefixItems` tuple, then `items` for the rest.
    #[default]
    Modern,
    /// 2019-09: legacy `items`/`additionalItems`, but `$ref` is an applicator
    /// evaluated alongside its siblings.
    Draft2019,
    /// draft-03 through draft-07: legacy `items`, and `$ref` replaces its
    /// siblings.
    Legacy,
}

impl Dialect {
    /// Detect the dialect from a `$schema` URI.
    ///
    /// Returns `None` for URIs that name neither family, so callers can keep
    /// the dialect inherited from an enclosing schema.
    pub fn from_schema_uri(uri: &str) -> Option<Self> {
        if uri.contains("2020-12") {
            Some(Dialect::Modern)
        } else if uri.contains("2019-09") {
            Some(Dialect::Draft2019)
        } else if ["draft-03", "draft-04", "draft-06", "draft-07"]
            .iter()
            .any(|d| uri.contains(d))
        {
            Some(Dialect::Legacy)
        } else {
            None
        }
    }

    /// Whether `items` may be an array tuple completed by `additionalItems`.
    pub fn has_tuple_items(self) -> bool {
        matches!(self, Dialect::Draft2019 | Dialect::Legacy)
    }

    /// Whether a `$ref` hides the keywords next to it.
    pub fn ref_replaces_siblings(self) -> bool {
        self == Dialect::Legacy
    }

    /// Dialect declared by a schema node's `$schema`, if any.
    pub fn of(schema: &Value) -> Option<Self> {
        schema
            .get("$schema")
            .and_then(Value::as_str)
            .and_then(Self::from_schema_uri)
    }
}

/// Options for a validation run.
///
/// Deserializes from a partial JSON object; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Enforce `format` assertions. When false, `format` is recorded as an
    /// annotation instead.
    pub validate_formats: bool,
    /// Report keywords whose vocabulary a `$vocabulary` declaration leaves out.
    /// Off by default so loosely written third-party schemas still validate.
    pub enforce_vocabularies: bool,
    /// Record metadata keywords (`title`, `default`, ...) per instance path.
    pub collect_annotations: bool,
    /// Maximum number of `$ref`/`$dynamicRef` hops along one branch before
    /// validation gives up on it.
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_formats: true,
            enforce_vocabularies: false,
            collect_annotations: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidationOptions {
    /// Create options with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether `format` is asserted.
    pub fn validate_formats(mut self, validate: bool) -> Self {
        self.validate_formats = validate;
        self
    }

    /// Set whether `$vocabulary` declarations are enforced.
    pub fn enforce_vocabularies(mut self, enforce: bool) -> Self {
        self.enforce_vocabularies = enforce;
        self
    }

    /// Set whether annotations are collected.
    pub fn collect_annotations(mut self, collect: bool) -> Self {
        self.collect_annotations = collect;
        self
    }

    /// Set the maximum number of reference hops along one branch.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
