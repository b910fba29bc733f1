//! argschema
//!
//! JSON Schema validation for `serde_json` values, covering draft-07 through
//! 2020-12.
//!
//! Validation never fails as a call: every problem (type mismatches, missing
//! properties, unresolvable references, runaway recursion) becomes a
//! [`ValidationError`] keyed by the instance path it applies to, so a host
//! can attach errors to the exact field or table row that caused them.
//!
//! # Example
//!
//! ```
//! use argschema::{validate, ValidationError, ValidationOptions, ValidationPath};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "$ref": "#/$defs/positiveInteger" }
//!     },
//!     "required": ["name"],
//!     "$defs": {
//!         "positiveInteger": { "type": "integer", "minimum": 1 }
//!     }
//! });
//!
//! let result = validate(&json!({ "name": "Ada", "age": 0 }), &schema, &ValidationOptions::new());
//!
//! assert!(!result.is_valid());
//! let age = ValidationPath::root().property("age");
//! assert!(matches!(
//!     result.errors_at(&age),
//!     [ValidationError::NumberOutOfRange { .. }]
//! ));
//! ```
//!
//! # Dialects
//!
//! | `$schema` | Tuple keyword | Remainder keyword | `$ref` siblings |
//! |-----------|---------------|-------------------|-----------------|
//! | 2020-12 (or none) | `prefixItems` | `items` | evaluated |
//! | 2019-09 | `items` (array) | `additionalItems` | evaluated |
//! | draft-03 ... draft-07 | `items` (array) | `additionalItems` | ignored |
//!
//! A nested `$schema` switches the dialect for its subtree.
//!
//! # Options
//!
//! [`ValidationOptions`] controls `format` enforcement, `$vocabulary`
//! enforcement, annotation collection and the recursion limit. It
//! deserializes from a partial JSON object:
//!
//! ```json
//! { "validateFormats": false, "collectAnnotations": true, "maxDepth": 64 }
//! ```

mod context;
mod error;
mod keywords;
mod linter;
mod loader;
mod path;
mod resolver;
mod result;
mod types;
mod validator;
mod vocabulary;

pub use context::{ScopeFrame, ValidationContext};
pub use error::{BoundKind, LoadError, ValidationError};
pub use keywords::annotation::check_format;
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{load_json, load_options, load_schema, load_schema_str};
pub use path::{PathComponent, ValidationPath};
pub use resolver::{find_anchor, navigate_pointer, SchemaResolver};
pub use result::ValidationResult;
pub use types::{json_type_name, Dialect, ValidationOptions, DEFAULT_MAX_DEPTH};
pub use validator::{validate, Validator};
pub use vocabulary::{is_known_keyword, vocabulary_of, VocabularySet};
