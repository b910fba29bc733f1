//! Validation results and the partial results evaluators return.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::path::ValidationPath;

/// Outcome of validating one instance.
///
/// `errors` never holds an empty list, so [`is_valid`](Self::is_valid) is
/// exactly "no path has an error".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: BTreeMap<ValidationPath, Vec<ValidationError>>,
    pub annotations: BTreeMap<ValidationPath, Map<String, Value>>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors reported at exactly `path`.
    pub fn errors_at(&self, path: &ValidationPath) -> &[ValidationError] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Annotation `keyword` recorded at `path`.
    pub fn annotation(&self, path: &ValidationPath, keyword: &str) -> Option<&Value> {
        self.annotations.get(path).and_then(|m| m.get(keyword))
    }

    /// Total number of errors across all paths.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// All errors, in path order.
    pub fn iter_errors(&self) -> impl Iterator<Item = (&ValidationPath, &ValidationError)> {
        self.errors
            .iter()
            .flat_map(|(path, errs)| errs.iter().map(move |e| (path, e)))
    }
}

/// Serializes with an explicit `valid` flag alongside the two maps.
impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResult", 3)?;
        s.serialize_field("valid", &self.is_valid())?;
        s.serialize_field("errors", &self.errors)?;
        s.serialize_field("annotations", &self.annotations)?;
        s.end()
    }
}

/// Partial result of evaluating one schema node against one instance.
///
/// `evaluated_names` and `evaluated_indices` describe members of the instance
/// at this evaluation's own path that some keyword validated; they feed
/// `unevaluatedProperties` and `unevaluatedItems`.
#[derive(Debug, Default)]
pub(crate) struct Evaluation {
    pub errors: BTreeMap<ValidationPath, Vec<ValidationError>>,
    pub annotations: BTreeMap<ValidationPath, Map<String, Value>>,
    pub evaluated_names: BTreeSet<String>,
    pub evaluated_indices: BTreeSet<usize>,
}

impl Evaluation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, path: &ValidationPath, error: ValidationError) {
        self.errors.entry(path.clone()).or_default().push(error);
    }

    pub fn annotate(&mut self, path: &ValidationPath, keyword: &str, value: Value) {
        self.annotations
            .entry(path.clone())
            .or_default()
            .insert(keyword.to_string(), value);
    }

    /// Merge a child evaluated at a different (nested) path.
    ///
    /// Its evaluated sets describe the child's members, not ours, so they are
    /// dropped.
    pub fn merge_nested(&mut self, child: Evaluation) {
        self.merge_errors(child.errors);
        self.merge_annotations(child.annotations);
    }

    /// Merge a subschema applied in place (same instance path).
    ///
    /// Evaluated members propagate only when the subschema passed.
    pub fn merge_in_place(&mut self, child: Evaluation) {
        if child.is_valid() {
            self.evaluated_names.extend(child.evaluated_names);
            self.evaluated_indices.extend(child.evaluated_indices);
        }
        self.merge_errors(child.errors);
        self.merge_annotations(child.annotations);
    }

    /// Merge a child evaluated against a value that is not part of the
    /// instance (decoded content). Its errors move to `path`; its
    /// annotations and evaluated sets are dropped.
    pub fn merge_relocated(&mut self, path: &ValidationPath, child: Evaluation) {
        let mut errs: Vec<ValidationError> = child.errors.into_values().flatten().collect();
        if !errs.is_empty() {
            self.errors.entry(path.clone()).or_default().append(&mut errs);
        }
    }

    fn merge_errors(&mut self, errors: BTreeMap<ValidationPath, Vec<ValidationError>>) {
        for (path, mut errs) in errors {
            if errs.is_empty() {
                continue;
            }
            self.errors.entry(path).or_default().append(&mut errs);
        }
    }

    fn merge_annotations(&mut self, annotations: BTreeMap<ValidationPath, Map<String, Value>>) {
        for (path, map) in annotations {
            self.annotations.entry(path).or_default().extend(map);
        }
    }

    pub fn into_result(self) -> ValidationResult {
        ValidationResult {
            errors: self.errors,
            annotations: self.annotations,
        }
    }
}
