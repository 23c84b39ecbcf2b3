use phpunit_driver::config::{Config, ConfigError, ExecutionMode};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Test that Config::default() describes a bare local run.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert!(config.command.is_none());
    assert!(config.php.is_none());
    assert!(config.phpunit.is_none());
    assert!(config.args.is_empty());
    assert!(config.paths.is_empty());
    assert_eq!(config.mode, ExecutionMode::Direct);
    assert!(config.cwd.is_none());
    assert!(config.env.is_empty());
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("phpunit-driver/config.toml"));
}

/// Test that a full document parses, keeping path mappings in document order.
#[test]
fn test_parse_valid_toml() {
    let toml_content = r#"
command = "docker compose exec -T app"
php = "php"
phpunit = "vendor/bin/phpunit"
args = ["--group", "unit"]
mode = "indirect"
cwd = "/home/dev/project"

[paths]
"${workspaceFolder}/vendor" = "/opt/vendor"
"${workspaceFolder}" = "/app"

[env]
XDEBUG_MODE = "coverage"
"#;

    let config = Config::from_toml_str(toml_content).expect("Should parse valid TOML");

    assert_eq!(config.command.as_deref(), Some("docker compose exec -T app"));
    assert_eq!(config.args, vec!["--group", "unit"]);
    assert_eq!(config.mode, ExecutionMode::Indirect);
    assert_eq!(config.cwd, Some(PathBuf::from("/home/dev/project")));
    assert_eq!(config.env.get("XDEBUG_MODE").map(String::as_str), Some("coverage"));

    let paths: Vec<(&str, &str)> = config.paths.iter().collect();
    assert_eq!(
        paths,
        vec![
            ("${workspaceFolder}/vendor", "/opt/vendor"),
            ("${workspaceFolder}", "/app"),
        ]
    );
}

/// Test that the raw key lookup mirrors the document.
#[test]
fn test_get_reads_raw_values() {
    let config = Config::from_toml_str("php = \"/usr/bin/php8.3\"\nargs = [\"--stop-on-failure\"]")
        .expect("Should parse");

    assert_eq!(config.get("php").as_deref(), Some("/usr/bin/php8.3"));
    assert_eq!(config.get("args").as_deref(), Some("--stop-on-failure"));
    assert_eq!(config.get("mode").as_deref(), Some("direct"));
    assert_eq!(config.get("command"), None);
    assert_eq!(config.get("unknown"), None);
}

/// Test that invalid TOML produces a parse error.
#[test]
fn test_parse_invalid_toml() {
    let result = Config::from_toml_str("this is not valid toml [[[");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// Test that an unknown mode is a parse error, not a silent default.
#[test]
fn test_parse_unknown_mode() {
    let result = Config::from_toml_str("mode = \"ssh\"");
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// Test validation fails when indirect mode has nothing to run through.
#[test]
fn test_validation_fails_indirect_without_command() {
    let result = Config::from_toml_str("mode = \"indirect\"\nphp = \"php\"");

    match result {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("command"));
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

/// Test validation fails for a mapping with an empty side.
#[test]
fn test_validation_fails_empty_mapping_side() {
    let mut config = Config::default();
    config.paths.insert("/home/dev/project", "");

    match config.validate() {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("/home/dev/project"));
        }
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

/// Test loading from an explicit file path.
#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "php = \"php\"\nphpunit = \"vendor/bin/paratest\"").expect("Failed to write");

    let config = Config::load_from(file.path()).expect("Should load");
    assert_eq!(config.phpunit.as_deref(), Some("vendor/bin/paratest"));
}

/// Test that a missing file is a read error naming the path.
#[test]
fn test_load_from_missing_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");

    match Config::load_from(&path) {
        Err(err @ ConfigError::ReadError { .. }) => {
            assert!(err.to_string().contains("absent.toml"));
        }
        other => panic!("Expected ReadError, got {other:?}"),
    }
}

/// Test round-trip serialization/deserialization.
#[test]
fn test_config_roundtrip() {
    let mut original = Config {
        php: Some("php".into()),
        mode: ExecutionMode::Indirect,
        command: Some("ssh ci".into()),
        ..Config::default()
    };
    original.paths.insert("/b", "/remote/b");
    original.paths.insert("/a", "/remote/a");

    let serialized = toml::to_string(&original).expect("Should serialize");
    let deserialized = Config::from_toml_str(&serialized).expect("Should deserialize");

    assert_eq!(deserialized.php, original.php);
    assert_eq!(deserialized.mode, original.mode);
    assert_eq!(deserialized.paths, original.paths);
}
