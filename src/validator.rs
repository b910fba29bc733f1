//! Validation entry points and the keyword orchestrator.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::ValidationContext;
use crate::error::ValidationError;
use crate::keywords::{self, Node};
use crate::resolver::SchemaResolver;
use crate::result::{Evaluation, ValidationResult};
use crate::types::{Dialect, ValidationOptions};

/// Validates instances against schemas that reference a shared root document.
///
/// Set the root once per document with [`set_root_schema`](Self::set_root_schema),
/// then call [`validate`](Self::validate) as often as needed, with the root or
/// any subschema of it.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    resolver: SchemaResolver,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator whose internal references resolve against `schema`.
    pub fn with_root_schema(schema: Value) -> Self {
        let mut validator = Self::new();
        validator.set_root_schema(schema);
        validator
    }

    /// Replace the root document.
    pub fn set_root_schema(&mut self, schema: Value) {
        self.resolver.set_root_schema(schema);
    }

    pub fn root_schema(&self) -> Option<&Value> {
        self.resolver.root_schema()
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Dereference `schema` until it is a concrete (non-reference) node.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceResolutionFailed` when a reference in the chain does
    /// not resolve, and `RecursionLimitExceeded` for reference cycles.
    pub fn resolve_schema(&self, schema: &Value) -> Result<Value, ValidationError> {
        self.resolver
            .resolve_fully(schema, crate::types::DEFAULT_MAX_DEPTH)
            .cloned()
    }

    /// Validate `value` against `schema`.
    ///
    /// Never fails: every problem, including unresolvable references, is an
    /// entry in the returned result.
    pub fn validate(
        &self,
        value: &Value,
        schema: &Value,
        options: &ValidationOptions,
    ) -> ValidationResult {
        let dialect = self
            .root_schema()
            .and_then(Dialect::of)
            .unwrap_or_default();
        let evaluator = Evaluator::new(&self.resolver, options);
        let ctx = ValidationContext::new(dialect);
        evaluator.evaluate(value, schema, &ctx).into_result()
    }
}

/// Validate `value` against a self-contained `schema`.
///
/// Internal references resolve against `schema` itself.
pub fn validate(value: &Value, schema: &Value, options: &ValidationOptions) -> ValidationResult {
    Validator::with_root_schema(schema.clone()).validate(value, schema, options)
}

/// One validation run: shared resolver and options plus per-run caches.
pub(crate) struct Evaluator<'a> {
    resolver: &'a SchemaResolver,
    pub options: &'a ValidationOptions,
    patterns: RefCell<HashMap<&'a str, Option<Regex>>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(resolver: &'a SchemaResolver, options: &'a ValidationOptions) -> Self {
        Self {
            resolver,
            options,
            patterns: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolver(&self) -> &'a SchemaResolver {
        self.resolver
    }

    /// Compiled form of a schema regex, or `None` if it does not compile.
    pub fn regex(&self, pattern: &'a str) -> Option<Regex> {
        self.patterns
            .borrow_mut()
            .entry(pattern)
            .or_insert_with(|| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    debug!(pattern, error = %e, "ignoring uncompilable pattern");
                    None
                }
            })
            .clone()
    }

    /// Evaluate one schema node against one instance.
    pub fn evaluate(
        &self,
        instance: &Value,
        schema: &'a Value,
        ctx: &ValidationContext<'a>,
    ) -> Evaluation {
        let mut out = Evaluation::new();

        if ctx.depth() > self.options.max_depth {
            warn!(path = %ctx.path(), "schema recursion limit reached");
            out.error(
                ctx.path(),
                ValidationError::RecursionLimitExceeded {
                    depth: self.options.max_depth,
                },
            );
            return out;
        }

        let map = match schema {
            Value::Bool(true) => return out,
            Value::Bool(false) => {
                out.error(ctx.path(), ValidationError::SchemaValidationDisabled);
                return out;
            }
            Value::Object(map) => map,
            // Not a schema; tolerated as "anything goes".
            _ => return out,
        };

        let ctx = ctx.enter(schema);

        let mut disabled = Vec::new();
        if self.options.enforce_vocabularies {
            if let Some(vocabulary) = ctx.vocabulary() {
                for keyword in map.keys() {
                    if let Some(uri) = vocabulary.missing_vocabulary(keyword) {
                        disabled.push((keyword.as_str(), uri));
                    }
                }
            }
        }

        let node = Node::new(
            map,
            instance,
            &ctx,
            disabled.iter().map(|(k, _)| *k).collect(),
        );

        if ctx.dialect().ref_replaces_siblings() && node.get("$ref").is_some() {
            // Before 2019-09, `$ref` replaces its siblings.
            keywords::reference::static_ref(self, &node, &mut out);
        } else {
            for group in [
                keywords::ANNOTATIONS,
                keywords::VALIDATION,
                keywords::CONTENT,
                keywords::APPLICATORS,
                keywords::UNEVALUATED,
            ] {
                for run in group {
                    run(self, &node, &mut out);
                }
            }
        }

        for (keyword, uri) in disabled {
            out.error(
                ctx.path(),
                ValidationError::UnknownKeyword {
                    keyword: keyword.to_string(),
                    vocabulary: uri.to_string(),
                },
            );
        }

        out
    }
}
