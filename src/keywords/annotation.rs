//! Meta-data annotations and `format`.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use super::Node;
use crate::error::ValidationError;
use crate::result::Evaluation;
use crate::validator::Evaluator;

const METADATA_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "examples",
    "default",
    "deprecated",
    "readOnly",
    "writeOnly",
    "$comment",
];

pub(crate) fn metadata<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    if !ev.options.collect_annotations {
        return;
    }
    for keyword in METADATA_KEYWORDS {
        if let Some(value) = node.get(keyword) {
            out.annotate(node.path(), keyword, value.clone());
        }
    }
}

/// Annotates `format` and, when formats are enforced, asserts it.
///
/// An unenforced format is always annotated so callers can show the hint.
pub(crate) fn format<'a, 'i>(ev: &Evaluator<'a>, node: &Node<'a, 'i>, out: &mut Evaluation) {
    let Some(format) = node.get("format").and_then(Value::as_str) else {
        return;
    };
    if !ev.options.validate_formats || ev.options.collect_annotations {
        out.annotate(node.path(), "format", Value::String(format.to_string()));
    }
    if !ev.options.validate_formats {
        return;
    }
    if let Some(s) = node.instance.as_str() {
        if !check_format(format, s) {
            out.error(
                node.path(),
                ValidationError::FormatMismatch {
                    format: format.to_string(),
                },
            );
        }
    }
}

/// Whether `value` conforms to the named format. Unknown formats pass.
pub fn check_format(format: &str, value: &str) -> bool {
    match format {
        "email" => is_email(value),
        "date" => is_date(value),
        "date-time" => DateTime::parse_from_rfc3339(value).is_ok(),
        "time" => DateTime::parse_from_rfc3339(&format!("1970-01-01T{value}")).is_ok(),
        "uri" => url::Url::parse(value).is_ok(),
        "uuid" => value.len() == 36 && Uuid::parse_str(value).is_ok(),
        "ipv4" => value.parse::<Ipv4Addr>().is_ok(),
        "ipv6" => value.parse::<Ipv6Addr>().is_ok(),
        "hostname" => is_hostname(value),
        "regex" => Regex::new(value).is_ok(),
        _ => true,
    }
}

/// Loose `local@domain.tld` check. Not RFC 5321.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn is_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_hostname(value: &str) -> bool {
    let name = value.strip_suffix('.').unwrap_or(value);
    if name.is_empty() || name.len() > 253 {
        return false;
    }
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
