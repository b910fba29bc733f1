//! CLI integration tests for the argschema binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("argschema"))
}

// Helper to create a temp schema or instance file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const PERSON_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "name": { "type": "string" },
        "email": { "type": "string", "format": "email" }
    },
    "required": ["name"]
}"#;

mod validate_command {
    use super::*;

    #[test]
    fn validate_valid_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{"name": "Ada"}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn validate_missing_required_property() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Validation failed"))
            .stderr(predicate::str::contains("missing required property \"name\""));
    }

    #[test]
    fn validate_reports_instance_path() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{"name": 42}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/name: expected string, got integer"));
    }

    #[test]
    fn validate_format_asserted_by_default() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(
            &dir,
            "instance.json",
            r#"{"name": "Ada", "email": "not-an-email"}"#,
        );

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/email"));
    }

    #[test]
    fn validate_no_formats_flag() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(
            &dir,
            "instance.json",
            r#"{"name": "Ada", "email": "not-an-email"}"#,
        );

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--no-formats",
            ])
            .assert()
            .success();
    }

    #[test]
    fn validate_json_output_valid() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{"name": "Ada"}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""valid":true"#));
    }

    #[test]
    fn validate_json_output_invalid() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""kind":"missingRequiredProperty""#));
    }

    #[test]
    fn validate_json_output_file_error() {
        let dir = TempDir::new().unwrap();
        let instance = write_temp_file(&dir, "instance.json", r#"{}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                "/nonexistent/schema.json",
                "--json",
            ])
            .assert()
            .code(3)
            .stdout(predicate::str::contains(r#""valid":false"#))
            .stdout(predicate::str::contains(r#""error":"#));
    }

    #[test]
    fn validate_annotations_flag() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{"properties": {"port": {"title": "Port", "default": 8080}}}"#,
        );
        let instance = write_temp_file(&dir, "instance.json", r#"{"port": 9000}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--annotations",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title":"Port""#))
            .stdout(predicate::str::contains(r#""default":8080"#));
    }

    #[test]
    fn validate_config_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(
            &dir,
            "instance.json",
            r#"{"name": "Ada", "email": "not-an-email"}"#,
        );
        let config = write_temp_file(&dir, "options.json", r#"{"validateFormats": false}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    #[test]
    fn validate_max_depth() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r##"{"properties": {"next": {"$ref": "#"}}}"##,
        );
        let instance = write_temp_file(
            &dir,
            "instance.json",
            r#"{"next": {"next": {"next": {"next": {}}}}}"#,
        );

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--max-depth",
                "3",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("maximum depth of 3"));
    }
}

mod resolve_command {
    use super::*;

    const DEFS_SCHEMA: &str = r##"{
        "$ref": "#/$defs/user",
        "$defs": {
            "user": { "$ref": "#/$defs/named" },
            "named": { "type": "object", "required": ["name"] }
        }
    }"##;

    #[test]
    fn resolve_follows_root_reference() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", DEFS_SCHEMA);

        cmd()
            .args(["resolve", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""required":["name"]"#))
            .stdout(predicate::str::contains("$ref").not());
    }

    #[test]
    fn resolve_pointer() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", DEFS_SCHEMA);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--pointer",
                "#/$defs/user",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type":"object""#));
    }

    #[test]
    fn resolve_with_pretty() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", DEFS_SCHEMA);

        cmd()
            .args(["resolve", schema.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn resolve_with_output_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", DEFS_SCHEMA);
        let output = dir.path().join("output.json");

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        let resolved: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(resolved["required"], serde_json::json!(["name"]));
    }

    #[test]
    fn resolve_unresolvable_pointer() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", DEFS_SCHEMA);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--pointer",
                "#/$defs/missing",
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot resolve reference"));
    }

    #[test]
    fn resolve_reference_cycle() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r##"{
                "$defs": {
                    "a": { "$ref": "#/$defs/b" },
                    "b": { "$ref": "#/$defs/a" }
                }
            }"##,
        );

        cmd()
            .args(["resolve", schema.to_str().unwrap(), "--pointer", "#/$defs/a"])
            .assert()
            .code(2);
    }
}

mod lint_command {
    use super::*;

    #[test]
    fn lint_clean_file() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", PERSON_SCHEMA);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("all passed"));
    }

    #[test]
    fn lint_broken_reference() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r##"{"$ref": "#/$defs/missing"}"##);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E003"));
    }

    #[test]
    fn lint_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r#"{"pattern": "(unclosed"}"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("E006"));
    }

    #[test]
    fn lint_json_format() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r#"{"typ": "object"}"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""code": "W001""#))
            .stdout(predicate::str::contains(r#""severity": "warning""#));
    }

    #[test]
    fn lint_strict_fails_on_warnings() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "schema.json", r#"{"typ": "object"}"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--strict"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("W001"));
    }

    #[test]
    fn lint_quiet_hides_passing_files() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "good.json", PERSON_SCHEMA);
        write_temp_file(&dir, "bad.json", r#"{ not json"#);

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--quiet"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("bad.json"))
            .stdout(predicate::str::contains("good.json").not())
            .stdout(predicate::str::contains("Linting").not());
    }

    #[test]
    fn lint_missing_path() {
        cmd()
            .args(["lint", "/nonexistent/schemas"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("path not found"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["resolve", "/nonexistent/schema.json"])
            .assert()
            .code(3)
            .stderr(
                predicate::str::contains("not found").or(predicate::str::contains("No such file")),
            );
    }

    #[test]
    fn invalid_json_schema() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "bad.json", r#"{ not valid json"#);

        cmd()
            .args(["resolve", schema.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn invalid_json_instance() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{"name": "#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("loading instance"));
    }

    #[test]
    fn invalid_config_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", PERSON_SCHEMA);
        let instance = write_temp_file(&dir, "instance.json", r#"{"name": "Ada"}"#);
        let config = write_temp_file(&dir, "options.json", r#"{"maxDepth": "deep"}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("loading config"));
    }

    #[test]
    fn unresolvable_reference_is_a_validation_error() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r##"{"properties": {"id": {"$ref": "#/$defs/id"}}}"##,
        );
        let instance = write_temp_file(&dir, "instance.json", r#"{"id": 1}"#);

        cmd()
            .args([
                "validate",
                instance.to_str().unwrap(),
                "--schema",
                schema.to_str().unwrap(),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/id: cannot resolve reference"));
    }
}

mod required_args {
    use super::*;

    #[test]
    fn missing_schema_flag() {
        let dir = TempDir::new().unwrap();
        let instance = write_temp_file(&dir, "instance.json", r#"{}"#);

        cmd()
            .args(["validate", instance.to_str().unwrap()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--schema"));
    }

    #[test]
    fn missing_instance_for_validate() {
        cmd()
            .args(["validate", "--schema", "schema.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("INSTANCE"));
    }

    #[test]
    fn missing_schema_path() {
        cmd().args(["resolve"]).assert().failure();
    }

    #[test]
    fn invalid_max_depth() {
        cmd()
            .args([
                "validate",
                "instance.json",
                "--schema",
                "schema.json",
                "--max-depth",
                "deep",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--max-depth"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Validate JSON against JSON Schema"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("argschema"));
    }

    #[test]
    fn validate_help() {
        cmd()
            .args(["validate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--schema"))
            .stdout(predicate::str::contains("--no-formats"))
            .stdout(predicate::str::contains("--max-depth"));
    }

    #[test]
    fn resolve_help() {
        cmd()
            .args(["resolve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--pointer"))
            .stdout(predicate::str::contains("--pretty"));
    }
}

mod fixtures {
    use super::*;

    #[test]
    fn validate_tree_fixture() {
        cmd()
            .args([
                "validate",
                "tests/fixtures/tree-valid.json",
                "--schema",
                "tests/fixtures/tree.json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"));
    }

    #[test]
    fn loose_tree_accepts_misspelled_property() {
        cmd()
            .args([
                "validate",
                "tests/fixtures/tree-typo.json",
                "--schema",
                "tests/fixtures/tree.json",
            ])
            .assert()
            .success();
    }

    #[test]
    fn strict_tree_rejects_misspelled_property() {
        // The strict anchor wins for nested nodes too
        cmd()
            .args([
                "validate",
                "tests/fixtures/tree-typo.json",
                "--schema",
                "tests/fixtures/strict-tree.json",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("/children/0"))
            .stderr(predicate::str::contains("childern"));
    }

    #[test]
    fn strict_tree_accepts_valid_tree() {
        cmd()
            .args([
                "validate",
                "tests/fixtures/tree-valid.json",
                "--schema",
                "tests/fixtures/strict-tree.json",
            ])
            .assert()
            .success();
    }

    #[test]
    fn options_fixture_collects_annotations() {
        cmd()
            .args([
                "validate",
                "tests/fixtures/tree-valid.json",
                "--schema",
                "tests/fixtures/tree.json",
                "--config",
                "tests/fixtures/options.json",
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""title":"Tree""#));
    }

    #[test]
    fn lint_fixture_directory() {
        cmd()
            .args(["lint", "tests/fixtures", "--quiet"])
            .assert()
            .success();
    }
}
