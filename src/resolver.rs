//! Reference resolution: `$ref`, `$dynamicRef`, anchors and JSON Pointers.
//!
//! Everything resolves inside the root document set with
//! [`SchemaResolver::set_root_schema`]. Embedded resources (subschemas with
//! their own `$id`) are addressable by that `$id`, resolved against the
//! enclosing resource's URI; nothing is fetched.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::context::{ValidationContext, DATA_KEYWORDS};
use crate::error::ValidationError;

/// Base URI for a root document without an absolute `$id`.
const DEFAULT_BASE: &str = "json-schema:///root.json";

/// Resolve an `$id` against `base` (the default base when `None`), without
/// its fragment.
pub(crate) fn join_id(base: Option<&Url>, id: &str) -> Option<Url> {
    let mut url = match base {
        Some(base) => base.join(id).ok()?,
        None => Url::parse(DEFAULT_BASE).ok()?.join(id).ok()?,
    };
    url.set_fragment(None);
    Some(url)
}

/// Resolves references against a caller-set root document.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolver {
    root: Option<Value>,
    root_base: Option<Url>,
    /// Absolute resource URI to the JSON Pointer of that resource in the root.
    resources: HashMap<String, String>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document internal references resolve against.
    pub fn set_root_schema(&mut self, schema: Value) {
        let id = schema.get("$id").and_then(Value::as_str).unwrap_or_default();
        self.root_base = join_id(None, id);
        self.resources.clear();
        if let Some(base) = &self.root_base {
            self.resources.insert(base.to_string(), String::new());
            index_resources(&schema, base, "", &mut self.resources);
        }
        self.root = Some(schema);
    }

    pub fn root_schema(&self) -> Option<&Value> {
        self.root.as_ref()
    }

    /// Dereference one step.
    ///
    /// A node with `$ref` (or `$dynamicRef`) resolves to its target; any other
    /// node is returned unchanged.
    pub fn resolve_schema<'a>(
        &'a self,
        node: &'a Value,
        ctx: &ValidationContext<'a>,
    ) -> Result<&'a Value, ValidationError> {
        self.step(node, ctx).map(|(schema, _)| schema)
    }

    /// One dereference step, plus the base URI of the target's resource when
    /// it changed.
    fn step<'a>(
        &'a self,
        node: &'a Value,
        ctx: &ValidationContext<'a>,
    ) -> Result<(&'a Value, Option<Url>), ValidationError> {
        if let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            return self
                .resolve_reference_from(reference, ctx.base())
                .map(|(schema, base)| (schema, Some(base)));
        }
        if let Some(reference) = node.get("$dynamicRef").and_then(Value::as_str) {
            return self
                .resolve_dynamic_reference(reference, ctx)
                .map(|schema| (schema, None));
        }
        Ok((node, None))
    }

    /// Resolve a static `$ref` value against the root document's URI.
    ///
    /// Supports `#`, `#/json/pointer`, `#anchor`, and `<uri>` / `<uri>#...`
    /// where `<uri>` names the root or an embedded resource.
    pub fn resolve_reference(&self, reference: &str) -> Result<&Value, ValidationError> {
        self.resolve_reference_from(reference, None)
            .map(|(schema, _)| schema)
    }

    /// Resolve a `$ref` value against `base` (the root's URI when `None`).
    ///
    /// Also returns the URI of the resource holding the target, which is the
    /// base for references inside it.
    pub(crate) fn resolve_reference_from(
        &self,
        reference: &str,
        base: Option<&Url>,
    ) -> Result<(&Value, Url), ValidationError> {
        let root = self.root.as_ref().ok_or_else(|| {
            ValidationError::reference(reference, "no root schema has been set")
        })?;
        let target = self
            .absolute(reference, base)
            .ok_or_else(|| ValidationError::reference(reference, "malformed reference"))?;

        let mut document = target.clone();
        document.set_fragment(None);
        let resource = self
            .resources
            .get(document.as_str())
            .and_then(|pointer| navigate_pointer(root, pointer))
            .ok_or_else(|| {
                debug!(reference, %document, "reference target is outside the root document");
                ValidationError::reference(reference, "external references are not fetched")
            })?;

        let schema = match target.fragment() {
            None | Some("") => Ok(resource),
            Some(pointer) if pointer.starts_with('/') => navigate_pointer(resource, pointer)
                .ok_or_else(|| {
                    debug!(reference, "JSON pointer does not resolve");
                    ValidationError::reference(reference, "pointer does not resolve")
                }),
            Some(anchor) => find_anchor(resource, anchor).ok_or_else(|| {
                debug!(reference, "anchor not found");
                ValidationError::reference(reference, "anchor not found")
            }),
        }?;
        Ok((schema, document))
    }

    fn absolute(&self, reference: &str, base: Option<&Url>) -> Option<Url> {
        base.or(self.root_base.as_ref())?.join(reference).ok()
    }

    /// Resolve a `$dynamicRef` value against the dynamic scope.
    ///
    /// For a plain-name fragment, the outermost scope frame that declares a
    /// matching `$dynamicAnchor` wins, so an extending schema overrides the
    /// anchor of the schema it extends. With no match, falls back to a static
    /// anchor lookup. Pointer fragments resolve like `$ref`.
    pub fn resolve_dynamic_reference<'a>(
        &'a self,
        reference: &str,
        ctx: &ValidationContext<'a>,
    ) -> Result<&'a Value, ValidationError> {
        let (_, fragment) = split_reference(reference);
        let Some(name) = fragment.filter(|f| !f.is_empty() && !f.starts_with('/')) else {
            return self
                .resolve_reference_from(reference, ctx.base())
                .map(|(schema, _)| schema);
        };

        for frame in ctx.dynamic_scope() {
            if let Some(target) = frame.anchor(name) {
                return Ok(target);
            }
        }

        debug!(reference, "no dynamic scope frame declares the anchor");
        self.resolve_reference_from(reference, ctx.base())
            .map(|(schema, _)| schema)
    }

    /// Follow a reference chain from `schema` until a concrete node.
    ///
    /// The result has no `$ref`/`$dynamicRef` left to follow, so resolving
    /// it again returns it unchanged.
    pub fn resolve_fully<'a>(
        &'a self,
        schema: &'a Value,
        max_depth: usize,
    ) -> Result<&'a Value, ValidationError> {
        let mut ctx = ValidationContext::new(Default::default());
        let mut current = schema;
        for _ in 0..max_depth {
            if !has_reference(current) {
                return Ok(current);
            }
            ctx = ctx.enter(current);
            let (next, base) = self.step(current, &ctx)?;
            ctx = ctx.follow_reference(base);
            current = next;
        }
        Err(ValidationError::RecursionLimitExceeded { depth: max_depth })
    }

    /// Whether `reference`, read against the root's URI, names a document
    /// other than the root or one of its embedded resources.
    pub fn is_external(&self, reference: &str) -> bool {
        self.is_external_from(reference, None)
    }

    /// [`is_external`](Self::is_external) for a reference inside the
    /// resource at `base`.
    pub(crate) fn is_external_from(&self, reference: &str, base: Option<&Url>) -> bool {
        if reference.starts_with('#') {
            return false;
        }
        match self.absolute(reference, base) {
            Some(mut url) => {
                url.set_fragment(None);
                !self.resources.contains_key(url.as_str())
            }
            None => true,
        }
    }
}

fn has_reference(schema: &Value) -> bool {
    ["$ref", "$dynamicRef"]
        .iter()
        .any(|k| schema.get(*k).map(Value::is_string).unwrap_or(false))
}

/// Split `uri#fragment` into its base and fragment.
fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (reference, None),
    }
}

/// Record the pointer of every `$id`-bearing node under its absolute URI.
/// The first declaration of a URI wins.
fn index_resources(node: &Value, base: &Url, pointer: &str, index: &mut HashMap<String, String>) {
    match node {
        Value::Object(map) => {
            let own = map
                .get("$id")
                .and_then(Value::as_str)
                .and_then(|id| join_id(Some(base), id));
            let base = match own {
                Some(url) => {
                    index
                        .entry(url.to_string())
                        .or_insert_with(|| pointer.to_string());
                    url
                }
                None => base.clone(),
            };
            for (key, child) in map {
                if !DATA_KEYWORDS.contains(&key.as_str()) {
                    let child_pointer = format!("{}/{}", pointer, escape_token(key));
                    index_resources(child, &base, &child_pointer, index);
                }
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                index_resources(item, base, &format!("{}/{}", pointer, i), index);
            }
        }
        _ => {}
    }
}

/// Escape an object key as a pointer segment that [`navigate_pointer`]
/// decodes back to the same key.
fn escape_token(key: &str) -> String {
    key.replace('%', "%25").replace('~', "~0").replace('/', "~1")
}

/// Navigate an RFC 6901 JSON Pointer (without the leading `#`).
///
/// Segments are percent-decoded, then `~1` -> `/` and `~0` -> `~`. Numeric
/// segments index arrays; everything else indexes objects.
pub fn navigate_pointer<'v>(root: &'v Value, pointer: &str) -> Option<&'v Value> {
    let path = pointer.strip_prefix('/').unwrap_or(pointer);
    if pointer.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for part in path.split('/') {
        let key = percent_decode(part).replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn percent_decode(s: &str) -> String {
    if !s.contains('%') {
        return s.to_string();
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Find the subschema declaring `$anchor` (or `$dynamicAnchor`) `name`.
pub fn find_anchor<'v>(node: &'v Value, name: &str) -> Option<&'v Value> {
    find_node(node, &|map| {
        ["$anchor", "$dynamicAnchor"]
            .iter()
            .any(|k| map.get(*k).and_then(Value::as_str) == Some(name))
    })
}

fn find_node<'v>(
    node: &'v Value,
    matches: &dyn Fn(&serde_json::Map<String, Value>) -> bool,
) -> Option<&'v Value> {
    match node {
        Value::Object(map) => {
            if matches(map) {
                return Some(node);
            }
            map.iter()
                .filter(|(key, _)| !DATA_KEYWORDS.contains(&key.as_str()))
                .find_map(|(_, child)| find_node(child, matches))
        }
        Value::Array(items) => items.iter().find_map(|item| find_node(item, matches)),
        _ => None,
    }
}
