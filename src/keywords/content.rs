//! `contentMediaType`, `contentEncoding` and `contentSchema`.

use serde_json::Value;
use tracing::debug;

use super::Node;
use crate::result::Evaluation;
use crate::validator::Evaluator;

pub(crate) fn content<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(text) = node.instance.as_str() else {
        return;
    };
    let media_type = node.get("contentMediaType").and_then(Value::as_str);

    if ev.options.collect_annotations {
        for keyword in ["contentMediaType", "contentEncoding"] {
            if let Some(value) = node.get(keyword) {
                out.annotate(node.path(), keyword, value.clone());
            }
        }
    }

    let (Some(media_type), Some(schema)) = (media_type, node.get("contentSchema")) else {
        return;
    };
    if !is_json_media_type(media_type) {
        return;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(decoded) => {
            let child = ev.evaluate(&decoded, schema, &node.ctx.in_place());
            out.merge_relocated(node.path(), child);
        }
        Err(e) => {
            debug!(path = %node.path(), error = %e, "content is not JSON, skipping contentSchema");
        }
    }
}

/// `application/json` or any `+json` structured suffix, parameters ignored.
fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}
