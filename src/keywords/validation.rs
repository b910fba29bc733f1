//! Assertions from the validation vocabulary.
//!
//! Every evaluator here checks the instance in isolation and never recurses,
//! so all of them run even after one fails.

use serde_json::Value;

use super::{as_count, Node};
use crate::error::{BoundKind, ValidationError};
use crate::result::Evaluation;
use crate::types::{json_equal, json_type_name, matches_type};
use crate::validator::Evaluator;

/// Largest fractional part of `value / multipleOf` still treated as a whole
/// quotient, for non-integer operands.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

pub(crate) fn type_check<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let expected: Vec<&str> = match node.get("type") {
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => return,
    };
    if expected.is_empty() || expected.iter().any(|t| matches_type(node.instance, t)) {
        return;
    }
    out.error(
        node.path(),
        ValidationError::InvalidType {
            expected: expected.iter().map(|t| t.to_string()).collect(),
            actual: json_type_name(node.instance).to_string(),
        },
    );
}

pub(crate) fn const_value<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    if let Some(expected) = node.get("const") {
        if !json_equal(node.instance, expected) {
            out.error(
                node.path(),
                ValidationError::ConstMismatch {
                    expected: expected.clone(),
                },
            );
        }
    }
}

pub(crate) fn enum_values<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(allowed) = node.get("enum").and_then(Value::as_array) else {
        return;
    };
    if !allowed.iter().any(|v| json_equal(node.instance, v)) {
        out.error(
            node.path(),
            ValidationError::EnumMismatch {
                allowed: allowed.clone(),
            },
        );
    }
}

/// `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `multipleOf`.
///
/// Boolean `exclusiveMinimum`/`exclusiveMaximum` (draft-04) turn the matching
/// inclusive bound exclusive.
pub(crate) fn numeric<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(value) = node.instance.as_f64() else {
        return;
    };

    let mut check = |bound: f64, kind: BoundKind| {
        let ok = match kind {
            BoundKind::Minimum => value >= bound,
            BoundKind::Maximum => value <= bound,
            BoundKind::ExclusiveMinimum => value > bound,
            BoundKind::ExclusiveMaximum => value < bound,
        };
        if !ok {
            out.error(
                node.path(),
                ValidationError::NumberOutOfRange {
                    value,
                    bound,
                    comparison: kind,
                },
            );
        }
    };

    let exclusive_min = node.get("exclusiveMinimum");
    let exclusive_max = node.get("exclusiveMaximum");

    if let Some(min) = node.get("minimum").and_then(Value::as_f64) {
        if exclusive_min == Some(&Value::Bool(true)) {
            check(min, BoundKind::ExclusiveMinimum);
        } else {
            check(min, BoundKind::Minimum);
        }
    }
    if let Some(max) = node.get("maximum").and_then(Value::as_f64) {
        if exclusive_max == Some(&Value::Bool(true)) {
            check(max, BoundKind::ExclusiveMaximum);
        } else {
            check(max, BoundKind::Maximum);
        }
    }
    if let Some(min) = exclusive_min.and_then(Value::as_f64) {
        check(min, BoundKind::ExclusiveMinimum);
    }
    if let Some(max) = exclusive_max.and_then(Value::as_f64) {
        check(max, BoundKind::ExclusiveMaximum);
    }

    if let Some(divisor) = node.get("multipleOf") {
        if !is_multiple_of(node.instance, divisor) {
            out.error(
                node.path(),
                ValidationError::NotMultipleOf {
                    value,
                    multiple_of: divisor.as_f64().unwrap_or_default(),
                },
            );
        }
    }
}

/// Whether `value` is a multiple of `divisor`. Non-positive or non-numeric
/// divisors constrain nothing.
fn is_multiple_of(value: &Value, divisor: &Value) -> bool {
    if let (Some(v), Some(d)) = (value.as_i64(), divisor.as_i64()) {
        if d > 0 {
            return v % d == 0;
        }
    }
    let (Some(v), Some(d)) = (value.as_f64(), divisor.as_f64()) else {
        return true;
    };
    if d <= 0.0 || !d.is_finite() {
        return true;
    }
    let quotient = v / d;
    // The division itself is off by a few ulps of the quotient.
    let tolerance = MULTIPLE_OF_EPSILON.max(4.0 * f64::EPSILON * quotient.abs());
    (quotient - quotient.round()).abs() <= tolerance
}

pub(crate) fn string_length<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(s) = node.instance.as_str() else {
        return;
    };
    let min = node.get("minLength").and_then(as_count);
    let max = node.get("maxLength").and_then(as_count);
    if min.is_none() && max.is_none() {
        return;
    }

    let length = s.chars().count();
    let too_short = min.is_some_and(|min| (length as u64) < min);
    let too_long = max.is_some_and(|max| (length as u64) > max);
    if too_short || too_long {
        out.error(
            node.path(),
            ValidationError::StringLengthOutOfRange { length, min, max },
        );
    }
}

pub(crate) fn pattern<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let (Some(s), Some(pattern)) = (
        node.instance.as_str(),
        node.get("pattern").and_then(Value::as_str),
    ) else {
        return;
    };
    if let Some(re) = ev.regex(pattern) {
        if !re.is_match(s) {
            out.error(
                node.path(),
                ValidationError::PatternMismatch {
                    pattern: pattern.to_string(),
                },
            );
        }
    }
}

pub(crate) fn array_bounds<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(items) = node.instance.as_array() else {
        return;
    };
    let length = items.len();
    if let Some(min) = node.get("minItems").and_then(as_count) {
        if (length as u64) < min {
            out.error(node.path(), ValidationError::ArrayTooShort { length, min });
        }
    }
    if let Some(max) = node.get("maxItems").and_then(as_count) {
        if (length as u64) > max {
            out.error(node.path(), ValidationError::ArrayTooLong { length, max });
        }
    }
}

pub(crate) fn unique_items<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    if node.get("uniqueItems") != Some(&Value::Bool(true)) {
        return;
    }
    let Some(items) = node.instance.as_array() else {
        return;
    };
    for (first, a) in items.iter().enumerate() {
        if let Some(offset) = items[first + 1..].iter().position(|b| json_equal(a, b)) {
            out.error(
                node.path(),
                ValidationError::DuplicateArrayItems {
                    first,
                    second: first + 1 + offset,
                },
            );
            return;
        }
    }
}

pub(crate) fn object_bounds<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(object) = node.instance.as_object() else {
        return;
    };
    let count = object.len();
    if let Some(min) = node.get("minProperties").and_then(as_count) {
        if (count as u64) < min {
            out.error(
                node.path(),
                ValidationError::ObjectTooFewProperties { count, min },
            );
        }
    }
    if let Some(max) = node.get("maxProperties").and_then(as_count) {
        if (count as u64) > max {
            out.error(
                node.path(),
                ValidationError::ObjectTooManyProperties { count, max },
            );
        }
    }
}

/// Missing properties are reported at the object's own path.
pub(crate) fn required<'a, 'i>(_: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let (Some(object), Some(required)) = (
        node.instance.as_object(),
        node.get("required").and_then(Value::as_array),
    ) else {
        return;
    };
    for name in required.iter().filter_map(Value::as_str) {
        if !object.contains_key(name) {
            out.error(
                node.path(),
                ValidationError::MissingRequiredProperty {
                    property: name.to_string(),
                },
            );
        }
    }
}

/// `dependentRequired`, plus the array form of legacy `dependencies`.
pub(crate) fn dependent_required<'a, 'i>(
    _: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let Some(object) = node.instance.as_object() else {
        return;
    };
    for keyword in ["dependentRequired", "dependencies"] {
        let Some(rules) = node.get(keyword).and_then(Value::as_object) else {
            continue;
        };
        for (property, dependencies) in rules {
            let Some(dependencies) = dependencies.as_array() else {
                continue;
            };
            if !object.contains_key(property) {
                continue;
            }
            for dependency in dependencies.iter().filter_map(Value::as_str) {
                if !object.contains_key(dependency) {
                    out.error(
                        node.path(),
                        ValidationError::DependentPropertyMissing {
                            property: property.clone(),
                            dependency: dependency.to_string(),
                        },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ValidationPath;
    use crate::result::ValidationResult;
    use crate::types::ValidationOptions;
    use crate::validator::validate;
    use serde_json::json;

    fn check(value: Value, schema: Value) -> ValidationResult {
        validate(&value, &schema, &ValidationOptions::new())
    }

    fn root_errors(value: Value, schema: Value) -> Vec<ValidationError> {
        check(value, schema)
            .errors_at(&ValidationPath::root())
            .to_vec()
    }

    #[test]
    fn type_single_and_list() {
        assert!(check(json!("a"), json!({ "type": "string" })).is_valid());
        assert!(!check(json!(1), json!({ "type": "string" })).is_valid());

        let either = json!({ "type": ["string", "number"] });
        assert!(check(json!("a"), either.clone()).is_valid());
        assert!(check(json!(2.5), either.clone()).is_valid());
        assert_eq!(
            root_errors(json!(true), either),
            vec![ValidationError::InvalidType {
                expected: vec!["string".into(), "number".into()],
                actual: "boolean".into(),
            }]
        );
    }

    #[test]
    fn integer_accepts_whole_floats() {
        assert!(check(json!(3.0), json!({ "type": "integer" })).is_valid());
        assert!(!check(json!(3.5), json!({ "type": "integer" })).is_valid());
    }

    #[test]
    fn const_and_enum_compare_numbers_by_value() {
        assert!(check(json!(1.0), json!({ "const": 1 })).is_valid());
        assert!(!check(json!(null), json!({ "const": false })).is_valid());
        assert!(check(json!({ "a": [1] }), json!({ "enum": [0, { "a": [1.0] }] })).is_valid());
        assert!(matches!(
            root_errors(json!("x"), json!({ "enum": ["a", "b"] })).as_slice(),
            [ValidationError::EnumMismatch { .. }]
        ));
    }

    #[test]
    fn numeric_bounds_and_multiple_of() {
        let schema = json!({ "minimum": 0, "maximum": 100, "multipleOf": 5 });
        assert!(check(json!(50), schema.clone()).is_valid());
        assert_eq!(
            root_errors(json!(-5), schema.clone()),
            vec![ValidationError::NumberOutOfRange {
                value: -5.0,
                bound: 0.0,
                comparison: BoundKind::Minimum,
            }]
        );
        assert!(matches!(
            root_errors(json!(52), schema).as_slice(),
            [ValidationError::NotMultipleOf { .. }]
        ));
    }

    #[test]
    fn exclusive_bounds_numeric_and_boolean() {
        assert!(!check(json!(5), json!({ "exclusiveMaximum": 5 })).is_valid());
        assert!(check(json!(4.9), json!({ "exclusiveMaximum": 5 })).is_valid());
        let draft4 = json!({ "minimum": 1, "exclusiveMinimum": true });
        assert!(!check(json!(1), draft4.clone()).is_valid());
        assert!(check(json!(2), draft4).is_valid());
    }

    #[test]
    fn multiple_of_tolerates_float_rounding() {
        assert!(is_multiple_of(&json!(0.3), &json!(0.1)));
        assert!(is_multiple_of(&json!(19.99), &json!(0.01)));
        assert!(!is_multiple_of(&json!(0.35), &json!(0.1)));
        assert!(is_multiple_of(&json!(7), &json!(0)));
    }

    #[test]
    fn multiple_of_tolerance_does_not_grow_with_the_quotient() {
        assert!(!is_multiple_of(&json!(1000000001.5), &json!(1)));
        assert!(!is_multiple_of(&json!(3000000001.0), &json!(2)));
        assert!(!is_multiple_of(&json!(5000000.005), &json!(0.01)));
        assert!(is_multiple_of(&json!(1e12), &json!(0.5)));
    }

    #[test]
    fn string_length_counts_chars() {
        let schema = json!({ "minLength": 3, "maxLength": 10, "pattern": "^[a-z]+$" });
        assert!(check(json!("hello"), schema.clone()).is_valid());
        assert!(!check(json!("hi"), schema.clone()).is_valid());
        assert!(!check(json!("Hello"), schema).is_valid());
        // Three scalar values, nine bytes.
        assert!(check(json!("日本語"), json!({ "maxLength": 3 })).is_valid());
    }

    #[test]
    fn uncompilable_pattern_is_ignored() {
        assert!(check(json!("x"), json!({ "pattern": "(" })).is_valid());
    }

    #[test]
    fn array_bounds_and_uniqueness() {
        assert!(!check(json!([1]), json!({ "minItems": 2 })).is_valid());
        assert!(!check(json!([1, 2, 3]), json!({ "maxItems": 2 })).is_valid());
        assert_eq!(
            root_errors(json!([1, "a", 1.0]), json!({ "uniqueItems": true })),
            vec![ValidationError::DuplicateArrayItems { first: 0, second: 2 }]
        );
        assert!(check(json!([1, 1]), json!({ "uniqueItems": false })).is_valid());
    }

    #[test]
    fn object_bounds_and_required() {
        assert!(!check(json!({}), json!({ "minProperties": 1 })).is_valid());
        assert!(!check(json!({ "a": 1, "b": 2 }), json!({ "maxProperties": 1 })).is_valid());
        assert_eq!(
            root_errors(json!({ "a": 1 }), json!({ "required": ["a", "b"] })),
            vec![ValidationError::MissingRequiredProperty {
                property: "b".into()
            }]
        );
        // Non-objects are out of scope for `required`.
        assert!(check(json!("a"), json!({ "required": ["a"] })).is_valid());
    }

    #[test]
    fn dependent_required_and_legacy_dependencies() {
        let modern = json!({ "dependentRequired": { "card": ["billing"] } });
        assert!(check(json!({ "name": "x" }), modern.clone()).is_valid());
        assert_eq!(
            root_errors(json!({ "card": 1 }), modern),
            vec![ValidationError::DependentPropertyMissing {
                property: "card".into(),
                dependency: "billing".into(),
            }]
        );

        let legacy = json!({ "dependencies": { "card": ["billing"] } });
        assert!(!check(json!({ "card": 1 }), legacy).is_valid());
    }
}
