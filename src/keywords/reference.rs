//! `$ref` and `$dynamicRef`.
//!
//! `$id`, `$anchor`, `$dynamicAnchor`, `$defs` and `definitions` carry no
//! assertions of their own; the resolver and the scope stack read them.

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::Node;
use crate::error::ValidationError;
use crate::result::Evaluation;
use crate::validator::Evaluator;

pub(crate) fn static_ref<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
        return;
    };
    let target = ev
        .resolver()
        .resolve_reference_from(reference, node.ctx.base())
        .map(|(schema, base)| (schema, Some(base)));
    apply(ev, node, reference, target, out);
}

pub(crate) fn dynamic_ref<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(reference) = node.get("$dynamicRef").and_then(Value::as_str) else {
        return;
    };
    let target = ev
        .resolver()
        .resolve_dynamic_reference(reference, node.ctx)
        .map(|schema| (schema, None));
    apply(ev, node, reference, target, out);
}

fn apply<'a, 'i>(
    ev: &Evaluator<'a>,
    node: &Node<'a, 'i>,
    reference: &str,
    target: Result<(&'a Value, Option<Url>), ValidationError>,
    out: &mut Evaluation,
) {
    match target {
        Ok((schema, base)) => {
            let child = ev.evaluate(node.instance, schema, &node.ctx.follow_reference(base));
            out.merge_in_place(child);
        }
        Err(err) => {
            debug!(reference, path = %node.path(), "reference left unresolved");
            out.error(node.path(), err);
        }
    }
}
