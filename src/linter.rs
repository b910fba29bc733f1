//! Schema linting - static analysis of schema files.
//!
//! Checks schema files for:
//! - JSON syntax errors
//! - Internal `$ref`/`$dynamicRef` targets that don't resolve
//! - `pattern`/`patternProperties` regexes that don't compile
//! - Keywords no vocabulary defines (usually typos)
//! - External references, which the validator will not follow

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::loader::load_schema;
use crate::path::ValidationPath;
use crate::resolver::{join_id, SchemaResolver};
use crate::vocabulary::is_known_keyword;

/// Keywords whose value is an object mapping names to subschemas.
const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
    "dependencies",
];

/// Keywords whose value is an array of subschemas.
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems", "items"];

/// Keywords whose value is a single subschema.
const SCHEMA_KEYWORDS: &[&str] = &[
    "not",
    "if",
    "then",
    "else",
    "items",
    "additionalItems",
    "additionalProperties",
    "unevaluatedItems",
    "unevaluatedProperties",
    "contains",
    "propertyNames",
    "contentSchema",
];

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// JSON Pointer into the schema (e.g., "/properties/id/$ref")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
/// Returns aggregated results for all files.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single schema file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let display_file = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();

    let schema = match load_schema(file) {
        Ok(s) => s,
        Err(e) => {
            return FileResult {
                file: display_file,
                status: FileStatus::Error,
                diagnostics: vec![Diagnostic {
                    severity: Severity::Error,
                    code: "E001".to_string(),
                    file: file.to_path_buf(),
                    path: "/".to_string(),
                    message: format!("syntax error: {}", e),
                }],
            };
        }
    };

    let mut resolver = SchemaResolver::new();
    resolver.set_root_schema(schema.clone());
    let mut linter = SchemaLinter {
        file,
        resolver: &resolver,
        diagnostics: Vec::new(),
    };
    linter.check_schema(&schema, &ValidationPath::root(), None);
    let diagnostics = linter.diagnostics;
    debug!(file = %file.display(), count = diagnostics.len(), "linted schema");

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: display_file,
        status,
        diagnostics,
    }
}

struct SchemaLinter<'a> {
    file: &'a Path,
    resolver: &'a SchemaResolver,
    diagnostics: Vec<Diagnostic>,
}

impl SchemaLinter<'_> {
    fn report(&mut self, severity: Severity, code: &str, path: &ValidationPath, message: String) {
        let path = if path.is_root() {
            "/".to_string()
        } else {
            path.to_string()
        };
        self.diagnostics.push(Diagnostic {
            severity,
            code: code.to_string(),
            file: self.file.to_path_buf(),
            path,
            message,
        });
    }

    /// Check one schema node and every subschema below it.
    ///
    /// Only keyword positions are walked, so property names inside
    /// `properties` and instance data in `const`/`enum`/`default` are never
    /// mistaken for keywords. `base` is the URI of the enclosing resource.
    fn check_schema(&mut self, schema: &Value, path: &ValidationPath, base: Option<&Url>) {
        let Value::Object(map) = schema else {
            return;
        };
        let own = map
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| join_id(base, id));
        let base = own.as_ref().or(base);

        for (keyword, value) in map {
            let here = path.property(keyword.as_str());

            if !is_known_keyword(keyword) && !keyword.starts_with("x-") {
                self.report(
                    Severity::Warning,
                    "W001",
                    &here,
                    format!("unknown keyword \"{}\"", keyword),
                );
                continue;
            }

            match (keyword.as_str(), value) {
                ("$ref" | "$dynamicRef", Value::String(reference)) => {
                    self.check_reference(reference, base, &here);
                }
                ("pattern", Value::String(pattern)) => self.check_regex(pattern, &here),
                _ => {}
            }

            if SCHEMA_MAP_KEYWORDS.contains(&keyword.as_str()) {
                if let Value::Object(members) = value {
                    for (name, subschema) in members {
                        let member = here.property(name.as_str());
                        if keyword == "patternProperties" {
                            self.check_regex(name, &member);
                        }
                        self.check_schema(subschema, &member, base);
                    }
                }
            }
            if SCHEMA_LIST_KEYWORDS.contains(&keyword.as_str()) {
                if let Value::Array(items) = value {
                    for (i, subschema) in items.iter().enumerate() {
                        self.check_schema(subschema, &here.index(i), base);
                    }
                }
            }
            if SCHEMA_KEYWORDS.contains(&keyword.as_str()) {
                self.check_schema(value, &here, base);
            }
        }
    }

    fn check_reference(&mut self, reference: &str, base: Option<&Url>, path: &ValidationPath) {
        if self.resolver.is_external_from(reference, base) {
            self.report(
                Severity::Warning,
                "W004",
                path,
                format!("external reference will not be followed: {}", reference),
            );
            return;
        }
        if let Err(e) = self.resolver.resolve_reference_from(reference, base) {
            self.report(Severity::Error, "E003", path, e.to_string());
        }
    }

    fn check_regex(&mut self, pattern: &str, path: &ValidationPath) {
        if let Err(e) = Regex::new(pattern) {
            self.report(
                Severity::Error,
                "E006",
                path,
                format!("invalid regex \"{}\": {}", pattern, e),
            );
        }
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
