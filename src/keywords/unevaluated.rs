//! `unevaluatedProperties` and `unevaluatedItems`.
//!
//! These run after every other keyword of the node, so `out` already holds
//! the members its siblings (and passing in-place subschemas) evaluated.

use serde_json::Value;

use super::Node;
use crate::error::ValidationError;
use crate::result::Evaluation;
use crate::validator::Evaluator;

pub(crate) fn unevaluated_properties<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let (Some(object), Some(schema)) = (
        node.instance.as_object(),
        node.get("unevaluatedProperties"),
    ) else {
        return;
    };
    let remaining: Vec<&String> = object
        .keys()
        .filter(|name| !out.evaluated_names.contains(name.as_str()))
        .collect();
    if remaining.is_empty() {
        return;
    }

    if *schema == Value::Bool(false) {
        out.error(
            node.path(),
            ValidationError::UnevaluatedPropertiesFound {
                names: remaining.into_iter().cloned().collect(),
            },
        );
        return;
    }

    for name in remaining {
        let child = ev.evaluate(&object[name], schema, &node.ctx.property(name));
        if child.is_valid() {
            out.evaluated_names.insert(name.clone());
        }
        out.merge_nested(child);
    }
}

pub(crate) fn unevaluated_items<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    out: &mut Evaluation,
) {
    let (Some(items), Some(schema)) = (node.instance.as_array(), node.get("unevaluatedItems"))
    else {
        return;
    };
    let remaining: Vec<usize> = (0..items.len())
        .filter(|index| !out.evaluated_indices.contains(index))
        .collect();
    if remaining.is_empty() {
        return;
    }

    if *schema == Value::Bool(false) {
        out.error(
            node.path(),
            ValidationError::UnevaluatedItemsFound { indices: remaining },
        );
        return;
    }

    for index in remaining {
        let child = ev.evaluate(&items[index], schema, &node.ctx.index(index));
        if child.is_valid() {
            out.evaluated_indices.insert(index);
        }
        out.merge_nested(child);
    }
}
