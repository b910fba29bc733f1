//! Keyword evaluators, grouped by vocabulary.
//!
//! Each evaluator is a plain function that reads the keywords it owns from a
//! [`Node`] and records errors, annotations and evaluated members into the
//! node's [`Evaluation`]. The orchestrator runs the tables below in order:
//! annotations, validation, content, applicators, then unevaluated, so the
//! unevaluated evaluators see every sibling's evaluated members.

use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::path::ValidationPath;
use crate::result::Evaluation;
use crate::validator::Evaluator;

pub(crate) mod annotation;
pub(crate) mod applicator;
pub(crate) mod content;
pub(crate) mod reference;
pub(crate) mod unevaluated;
pub(crate) mod validation;

pub(crate) type KeywordFn = for<'a, 'i> fn(&Evaluator<'a>, &Node<'a, 'i>, &mut Evaluation);

pub(crate) const ANNOTATIONS: &[KeywordFn] = &[annotation::metadata];

pub(crate) const VALIDATION: &[KeywordFn] = &[
    validation::type_check,
    validation::const_value,
    validation::enum_values,
    validation::numeric,
    validation::string_length,
    validation::pattern,
    annotation::format,
    validation::array_bounds,
    validation::unique_items,
    validation::object_bounds,
    validation::required,
    validation::dependent_required,
];

pub(crate) const CONTENT: &[KeywordFn] = &[content::content];

pub(crate) const APPLICATORS: &[KeywordFn] = &[
    reference::static_ref,
    reference::dynamic_ref,
    applicator::object_properties,
    applicator::property_names,
    applicator::dependent_schemas,
    applicator::array_items,
    applicator::contains,
    applicator::all_of,
    applicator::any_of,
    applicator::one_of,
    applicator::not,
    applicator::conditional,
];

pub(crate) const UNEVALUATED: &[KeywordFn] = &[
    unevaluated::unevaluated_properties,
    unevaluated::unevaluated_items,
];

/// A schema object applied to one instance, with vocabulary gating.
pub(crate) struct Node<'a, 'i> {
    schema: &'a Map<String, Value>,
    pub instance: &'i Value,
    pub ctx: &'i ValidationContext<'a>,
    disabled: Vec<&'a str>,
}

impl<'a, 'i> Node<'a, 'i> {
    pub fn new(
        schema: &'a Map<String, Value>,
        instance: &'i Value,
        ctx: &'i ValidationContext<'a>,
        disabled: Vec<&'a str>,
    ) -> Self {
        Self {
            schema,
            instance,
            ctx,
            disabled,
        }
    }

    /// The keyword's value, unless absent or disabled by `$vocabulary`.
    pub fn get(&self, keyword: &str) -> Option<&'a Value> {
        if self.disabled.contains(&keyword) {
            return None;
        }
        self.schema.get(keyword)
    }

    pub fn path(&self) -> &ValidationPath {
        self.ctx.path()
    }
}

/// A non-negative whole number, as used by `minLength`, `maxItems`, etc.
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}
