//! Keyword vocabularies and `$vocabulary` declarations.

use serde_json::{Map, Value};

pub const CORE: &str = "https://json-schema.org/draft/2020-12/vocab/core";
pub const APPLICATOR: &str = "https://json-schema.org/draft/2020-12/vocab/applicator";
pub const UNEVALUATED: &str = "https://json-schema.org/draft/2020-12/vocab/unevaluated";
pub const VALIDATION: &str = "https://json-schema.org/draft/2020-12/vocab/validation";
pub const META_DATA: &str = "https://json-schema.org/draft/2020-12/vocab/meta-data";
pub const FORMAT_ANNOTATION: &str = "https://json-schema.org/draft/2020-12/vocab/format-annotation";
pub const FORMAT_ASSERTION: &str = "https://json-schema.org/draft/2020-12/vocab/format-assertion";
pub const CONTENT: &str = "https://json-schema.org/draft/2020-12/vocab/content";

const CORE_KEYWORDS: &[&str] = &[
    "$id",
    "$schema",
    "$ref",
    "$anchor",
    "$dynamicRef",
    "$dynamicAnchor",
    "$vocabulary",
    "$comment",
    "$defs",
];

const APPLICATOR_KEYWORDS: &[&str] = &[
    "prefixItems",
    "items",
    "contains",
    "additionalProperties",
    "properties",
    "patternProperties",
    "dependentSchemas",
    "propertyNames",
    "if",
    "then",
    "else",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
];

const UNEVALUATED_KEYWORDS: &[&str] = &["unevaluatedItems", "unevaluatedProperties"];

const VALIDATION_KEYWORDS: &[&str] = &[
    "type",
    "const",
    "enum",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxContains",
    "minContains",
    "maxProperties",
    "minProperties",
    "required",
    "dependentRequired",
];

const META_DATA_KEYWORDS: &[&str] = &[
    "title",
    "description",
    "default",
    "deprecated",
    "readOnly",
    "writeOnly",
    "examples",
];

const CONTENT_KEYWORDS: &[&str] = &["contentEncoding", "contentMediaType", "contentSchema"];

/// Keywords from older drafts that are still evaluated for compatibility.
/// They belong to no 2020-12 vocabulary, so declarations never gate them.
pub const LEGACY_KEYWORDS: &[&str] = &["additionalItems", "definitions", "dependencies"];

/// The 2020-12 vocabulary that owns `keyword`.
///
/// `format` reports the annotation vocabulary; a declaration enabling the
/// assertion vocabulary enables it too.
pub fn vocabulary_of(keyword: &str) -> Option<&'static str> {
    let tables: [(&[&str], &'static str); 6] = [
        (CORE_KEYWORDS, CORE),
        (APPLICATOR_KEYWORDS, APPLICATOR),
        (UNEVALUATED_KEYWORDS, UNEVALUATED),
        (VALIDATION_KEYWORDS, VALIDATION),
        (META_DATA_KEYWORDS, META_DATA),
        (CONTENT_KEYWORDS, CONTENT),
    ];
    if keyword == "format" {
        return Some(FORMAT_ANNOTATION);
    }
    tables
        .iter()
        .find(|(keywords, _)| keywords.contains(&keyword))
        .map(|(_, uri)| *uri)
}

/// Whether `keyword` means anything to this engine.
pub fn is_known_keyword(keyword: &str) -> bool {
    vocabulary_of(keyword).is_some() || LEGACY_KEYWORDS.contains(&keyword)
}

/// A `$vocabulary` declaration in effect for a schema subtree.
#[derive(Debug, Clone, Copy)]
pub struct VocabularySet<'a> {
    declared: &'a Map<String, Value>,
}

impl<'a> VocabularySet<'a> {
    /// Read the declaration on `schema`, if it has one.
    pub fn declared_by(schema: &'a Value) -> Option<Self> {
        schema
            .get("$vocabulary")
            .and_then(Value::as_object)
            .map(|declared| Self { declared })
    }

    /// Whether the declaration lists `uri` with a `true` value.
    pub fn enables(&self, uri: &str) -> bool {
        self.declared.get(uri).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The vocabulary that `keyword` needs but this declaration leaves out.
    ///
    /// Returns `None` when the keyword is allowed: core keywords, keywords of
    /// enabled vocabularies, and keywords that belong to no vocabulary.
    pub fn missing_vocabulary(&self, keyword: &str) -> Option<&'static str> {
        let uri = vocabulary_of(keyword)?;
        if uri == CORE || self.enables(uri) {
            return None;
        }
        if uri == FORMAT_ANNOTATION && self.enables(FORMAT_ASSERTION) {
            return None;
        }
        Some(uri)
    }
}
