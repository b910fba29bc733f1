//! Applicator keywords: subschemas applied to members or to the instance itself.
//!
//! Object and array applicators record which members they evaluated, so
//! sibling `unevaluated*` keywords can skip them. In-place applicators pass
//! their children's evaluated members up only when the child passed.

use regex::Regex;
use serde_json::Value;

use super::{as_count, Node};
use crate::error::ValidationError;
use crate::result::Evaluation;
use crate::validator::Evaluator;

fn is_schema(value: &Value) -> bool {
    value.is_object() || value.is_boolean()
}

/// `properties`, `patternProperties` and `additionalProperties`.
pub(crate) fn object_properties<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let Some(object) = node.instance.as_object() else {
        return;
    };
    let properties = node.get("properties").and_then(Value::as_object);
    let patterns: Vec<(Regex, &'a Value)> = node
        .get("patternProperties")
        .and_then(Value::as_object)
        .map(|patterns| {
            patterns
                .iter()
                .filter_map(|(pattern, schema)| ev.regex(pattern).map(|re| (re, schema)))
                .collect()
        })
        .unwrap_or_default();
    let additional = node.get("additionalProperties").filter(|s| is_schema(s));

    if properties.is_none() && patterns.is_empty() && additional.is_none() {
        return;
    }

    for (name, value) in object {
        let mut matched = false;

        if let Some(schema) = properties.and_then(|p| p.get(name)) {
            matched = true;
            out.merge_nested(ev.evaluate(value, schema, &node.ctx.property(name)));
        }
        for (re, schema) in &patterns {
            if re.is_match(name) {
                matched = true;
                out.merge_nested(ev.evaluate(value, schema, &node.ctx.property(name)));
            }
        }
        if !matched {
            match additional {
                Some(schema) => {
                    out.merge_nested(ev.evaluate(value, schema, &node.ctx.property(name)));
                }
                // Permitted, but left for `unevaluatedProperties`.
                None => continue,
            }
        }
        out.evaluated_names.insert(name.clone());
    }
}

/// Each property name, as a string instance, must satisfy `propertyNames`.
pub(crate) fn property_names<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let (Some(object), Some(schema)) = (node.instance.as_object(), node.get("propertyNames"))
    else {
        return;
    };
    for name in object.keys() {
        let instance = Value::String(name.clone());
        out.merge_nested(ev.evaluate(&instance, schema, &node.ctx.property(name)));
    }
}

/// `dependentSchemas`, plus the schema form of legacy `dependencies`.
pub(crate) fn dependent_schemas<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let Some(object) = node.instance.as_object() else {
        return;
    };
    for keyword in ["dependentSchemas", "dependencies"] {
        let Some(rules) = node.get(keyword).and_then(Value::as_object) else {
            continue;
        };
        for (property, schema) in rules {
            if is_schema(schema) && object.contains_key(property) {
                out.merge_in_place(ev.evaluate(node.instance, schema, &node.ctx.in_place()));
            }
        }
    }
}

/// Positional and uniform item schemas, by dialect.
///
/// Modern: `prefixItems` then `items`. Legacy: array-valued `items` then
/// `additionalItems`, or a single `items` for every index. A modern tuple
/// with no `items` falls back to `additionalItems`, and an array-valued
/// `items` is read the legacy way in either dialect.
pub(crate) fn array_items<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(items) = node.instance.as_array() else {
        return;
    };

    let dialect = node.ctx.dialect();
    let (tuple, rest): (&'a [Value], Option<&'a Value>) = match node.get("items") {
        Some(Value::Array(tuple)) => (tuple.as_slice(), node.get("additionalItems")),
        uniform if dialect.has_tuple_items() => (&[], uniform),
        uniform => {
            let prefix = node.get("prefixItems").and_then(Value::as_array);
            let rest = match (uniform, prefix) {
                (Some(uniform), _) => Some(uniform),
                (None, Some(_)) => node.get("additionalItems"),
                (None, None) => None,
            };
            (prefix.map(Vec::as_slice).unwrap_or_default(), rest)
        }
    };
    let rest = rest.filter(|s| is_schema(s));

    for (index, item) in items.iter().enumerate() {
        let schema = match tuple.get(index) {
            Some(schema) => schema,
            None => match rest {
                Some(schema) => schema,
                None => break,
            },
        };
        out.merge_nested(ev.evaluate(item, schema, &node.ctx.index(index)));
        out.evaluated_indices.insert(index);
    }
}

/// `contains` with `minContains` (default 1) and `maxContains`.
pub(crate) fn contains<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let (Some(items), Some(schema)) = (node.instance.as_array(), node.get("contains")) else {
        return;
    };
    let min = node.get("minContains").and_then(as_count).unwrap_or(1);
    let max = node.get("maxContains").and_then(as_count);

    let mut matched = 0;
    for (index, item) in items.iter().enumerate() {
        let child = ev.evaluate(item, schema, &node.ctx.index(index));
        if child.is_valid() {
            matched += 1;
            out.evaluated_indices.insert(index);
            out.merge_nested(child);
        }
    }

    let too_few = (matched as u64) < min;
    let too_many = max.is_some_and(|max| (matched as u64) > max);
    if too_few || too_many {
        out.error(
            node.path(),
            ValidationError::ContainsValidationFailed { matched, min, max },
        );
    }
}

pub(crate) fn all_of<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(branches) = node.get("allOf").and_then(Value::as_array) else {
        return;
    };
    for schema in branches {
        out.merge_in_place(ev.evaluate(node.instance, schema, &node.ctx.in_place()));
    }
}

/// Every branch is evaluated so that all passing branches contribute their
/// annotations and evaluated members.
pub(crate) fn any_of<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(branches) = node.get("anyOf").and_then(Value::as_array) else {
        return;
    };
    if branches.is_empty() {
        return;
    }
    let passing: Vec<Evaluation> = branches
        .iter()
        .map(|schema| ev.evaluate(node.instance, schema, &node.ctx.in_place()))
        .filter(Evaluation::is_valid)
        .collect();

    if passing.is_empty() {
        out.error(
            node.path(),
            ValidationError::composition(
                "anyOf",
                format!("none of the {} subschemas matched", branches.len()),
            ),
        );
    }
    for child in passing {
        out.merge_in_place(child);
    }
}

pub(crate) fn one_of<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(branches) = node.get("oneOf").and_then(Value::as_array) else {
        return;
    };
    if branches.is_empty() {
        return;
    }
    let mut passing: Vec<Evaluation> = branches
        .iter()
        .map(|schema| ev.evaluate(node.instance, schema, &node.ctx.in_place()))
        .filter(Evaluation::is_valid)
        .collect();

    match passing.len() {
        1 => {
            if let Some(child) = passing.pop() {
                out.merge_in_place(child);
            }
        }
        0 => out.error(
            node.path(),
            ValidationError::composition("oneOf", "no subschema matched"),
        ),
        n => out.error(
            node.path(),
            ValidationError::composition(
                "oneOf",
                format!("{n} subschemas matched, expected exactly one"),
            ),
        ),
    }
}

pub(crate) fn not<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(schema) = node.get("not") else {
        return;
    };
    if ev
        .evaluate(node.instance, schema, &node.ctx.in_place())
        .is_valid()
    {
        out.error(
            node.path(),
            ValidationError::composition("not", "instance matches the disallowed subschema"),
        );
    }
}

/// `if`/`then`/`else`. Errors from `if` never surface.
pub(crate) fn conditional<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(condition) = node.get("if") else {
        return;
    };
    let matched = ev.evaluate(node.instance, condition, &node.ctx.in_place());
    let branch = if matched.is_valid() {
        out.merge_in_place(matched);
        node.get("then")
    } else {
        node.get("else")
    };
    if let Some(schema) = branch {
        out.merge_in_place(ev.evaluate(node.instance, schema, &node.ctx.in_place()));
    }
}
