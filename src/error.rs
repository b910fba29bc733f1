//! Error types for schema loading and instance validation.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors while loading schemas, instances, or option files from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Which numeric bound a value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundKind {
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoundKind::Minimum => "greater than or equal to",
            BoundKind::Maximum => "less than or equal to",
            BoundKind::ExclusiveMinimum => "greater than",
            BoundKind::ExclusiveMaximum => "less than",
        };
        f.write_str(s)
    }
}

/// A single schema violation found in an instance.
///
/// Not an error in the `Result` sense: validation never fails, it returns
/// these inside a [`ValidationResult`](crate::ValidationResult), keyed by the
/// path of the offending value. `Display` renders the message a UI shows next
/// to the field.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValidationError {
    #[error("expected {}, got {actual}", .expected.join(" or "))]
    InvalidType {
        expected: Vec<String>,
        actual: String,
    },

    #[error("value must be {expected}")]
    ConstMismatch { expected: Value },

    #[error("value must be one of {}", display_values(.allowed))]
    EnumMismatch { allowed: Vec<Value> },

    #[error("{value} must be {comparison} {bound}")]
    NumberOutOfRange {
        value: f64,
        bound: f64,
        comparison: BoundKind,
    },

    #[error("{value} is not a multiple of {multiple_of}")]
    NotMultipleOf { value: f64, multiple_of: f64 },

    #[error("string length {length} is outside {}", display_range(.min, .max))]
    StringLengthOutOfRange {
        length: usize,
        min: Option<u64>,
        max: Option<u64>,
    },

    #[error("string does not match pattern \"{pattern}\"")]
    PatternMismatch { pattern: String },

    #[error("string is not a valid \"{format}\"")]
    FormatMismatch { format: String },

    #[error("array has {length} item(s), expected at least {min}")]
    ArrayTooShort { length: usize, min: u64 },

    #[error("array has {length} item(s), expected at most {max}")]
    ArrayTooLong { length: usize, max: u64 },

    #[error("array items {first} and {second} are equal")]
    DuplicateArrayItems { first: usize, second: usize },

    #[error("{matched} item(s) match \"contains\", expected {}", display_contains(.min, .max))]
    ContainsValidationFailed {
        matched: usize,
        min: u64,
        max: Option<u64>,
    },

    #[error("unevaluated item(s) at index {}", display_list(.indices))]
    UnevaluatedItemsFound { indices: Vec<usize> },

    #[error("object has {count} propert(ies), expected at least {min}")]
    ObjectTooFewProperties { count: usize, min: u64 },

    #[error("object has {count} propert(ies), expected at most {max}")]
    ObjectTooManyProperties { count: usize, max: u64 },

    #[error("missing required property \"{property}\"")]
    MissingRequiredProperty { property: String },

    #[error("property \"{dependency}\" is required when \"{property}\" is present")]
    DependentPropertyMissing { property: String, dependency: String },

    #[error("unevaluated propert(ies) not allowed: {}", display_list(.names))]
    UnevaluatedPropertiesFound { names: Vec<String> },

    #[error("keyword \"{keyword}\" is not enabled by the declared vocabularies ({vocabulary})")]
    UnknownKeyword { keyword: String, vocabulary: String },

    #[error("no value is allowed here")]
    SchemaValidationDisabled,

    #[error("cannot resolve reference \"{reference}\": {reason}")]
    ReferenceResolutionFailed { reference: String, reason: String },

    #[error("\"{keyword}\" failed: {reason}")]
    CompositionFailed { keyword: String, reason: String },

    #[error("schema nesting exceeds the maximum depth of {depth}")]
    RecursionLimitExceeded { depth: usize },
}

impl ValidationError {
    pub(crate) fn reference(reference: &str, reason: impl Into<String>) -> Self {
        ValidationError::ReferenceResolutionFailed {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn composition(keyword: &str, reason: impl Into<String>) -> Self {
        ValidationError::CompositionFailed {
            keyword: keyword.to_string(),
            reason: reason.into(),
        }
    }
}

fn display_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_contains(min: &u64, max: &Option<u64>) -> String {
    display_range(&Some(*min), max)
}

fn display_range(min: &Option<u64>, max: &Option<u64>) -> String {
    match (*min, *max) {
        (Some(min), Some(max)) => format!("{}..={}", min, max),
        (Some(min), None) => format!("at least {}", min),
        (None, Some(max)) => format!("at most {}", max),
        (None, None) => "any".to_string(),
    }
}
