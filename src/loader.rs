//! Loading schemas, instances and option files.
//!
//! Only local files and in-memory strings are supported; external `$ref`
//! targets are never fetched.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::types::ValidationOptions;

/// Load a JSON document (schema or instance) from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::ReadError` if it can't be read,
/// or `LoadError::InvalidJson` if it isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    read_json(path)
}

/// Load a schema from a file path. See [`load_json`].
///
/// # Errors
///
/// Same as [`load_json`].
pub fn load_schema(path: &Path) -> Result<Value, LoadError> {
    let schema = read_json(path)?;
    debug!(path = %path.display(), "loaded schema");
    Ok(schema)
}

/// Load a schema from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load [`ValidationOptions`] from a JSON file. Missing fields keep their
/// defaults, so `{"validateFormats": false}` is a complete options file.
///
/// # Errors
///
/// Same as [`load_json`]; a wrongly typed value is `LoadError::InvalidJson`.
pub fn load_options(path: &Path) -> Result<ValidationOptions, LoadError> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_schema_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_schema(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_schema_str_valid() {
        let schema = load_schema_str(r#"{"type": "object"}"#).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_str_invalid() {
        let result = load_schema_str("not json");
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn load_json_accepts_any_document() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[1, 2, 3]").unwrap();

        assert_eq!(load_json(file.path()).unwrap(), serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn load_options_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"validateFormats": false, "maxDepth": 8}}"#).unwrap();

        let options = load_options(file.path()).unwrap();
        assert!(!options.validate_formats);
        assert_eq!(options.max_depth, 8);
        assert!(!options.collect_annotations);
    }

    #[test]
    fn load_options_wrong_type() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"maxDepth": "deep"}}"#).unwrap();

        let result = load_options(file.path());
        assert!(matches!(result, Err(LoadError::InvalidJson { .. })));
    }
}
