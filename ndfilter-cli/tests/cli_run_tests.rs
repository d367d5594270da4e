//! Integration tests for configuration resolution and end-to-end runs.
//!
//! Uses real files in temporary directories for config, filters, input and output.
//! Every test is serial because configuration resolution reads the environment.

use std::fs;
use std::path::Path;

use clap::Parser;
use serial_test::serial;
use tempfile::TempDir;

use ndfilter_cli::{Cli, CliError, app};

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["ndfilter"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("should parse arguments")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path should be UTF-8")
}

#[tokio::test]
#[serial]
async fn test_resolve_explicit_missing_config_is_error() {
    // Given: --config pointing at a file that does not exist
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("nope.toml");

    // When: Resolving configuration
    let err = app::resolve_config(&cli(&["--config", path_str(&missing)]))
        .await
        .expect_err("missing explicit config should fail");

    // Then: Configuration error exit code
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn test_resolve_config_file_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(
        &config_path,
        r#"
[general]
log_level = "info"

[filter]
concurrency = 2
format = "csv"
project = ["id"]

[filter.filters]
status = "^ok$"
"#,
    )
    .expect("should write config");

    let config = app::resolve_config(&cli(&["--config", path_str(&config_path)]))
        .await
        .expect("config should resolve")
        .config;

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.filter.concurrency, 2);
    assert_eq!(config.filter.format, "csv");
    assert_eq!(config.filter.project, vec!["id"]);
    assert_eq!(config.filter.filters.get("status").map(String::as_str), Some("^ok$"));
}

#[tokio::test]
#[serial]
async fn test_resolve_filters_merge_precedence() {
    // Given: filters in the config file, a filters file and a flag
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(
        &config_path,
        "[filter.filters]\na = \"from-config\"\nb = \"from-config\"\nc = \"from-config\"\n",
    )
    .expect("should write config");
    let filters_path = temp_dir.path().join("filters.json");
    fs::write(&filters_path, r#"{"b":"from-file","c":"from-file"}"#).expect("should write filters");

    // When: All three sources are combined
    let config = app::resolve_config(&cli(&[
        "--config",
        path_str(&config_path),
        "--filters-file",
        path_str(&filters_path),
        "--filters",
        r#"{"c":"from-flag"}"#,
    ]))
    .await
    .expect("config should resolve")
    .config;

    // Then: flag > file > config, key by key
    let filters = &config.filter.filters;
    assert_eq!(filters.get("a").map(String::as_str), Some("from-config"));
    assert_eq!(filters.get("b").map(String::as_str), Some("from-file"));
    assert_eq!(filters.get("c").map(String::as_str), Some("from-flag"));
}

#[tokio::test]
#[serial]
async fn test_resolve_malformed_filters_flag_is_config_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");

    for bad in [r#"["status"]"#, r#"{"status":1}"#, "{not json"] {
        let err = app::resolve_config(&cli(&[
            "--config",
            path_str(&config_path),
            "--filters",
            bad,
        ]))
        .await
        .expect_err("malformed filters should fail");
        assert_eq!(err.exit_code(), 2, "filters {bad:?} should be a config error");
    }
}

#[tokio::test]
#[serial]
async fn test_resolve_rejects_zero_concurrency() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");

    let err = app::resolve_config(&cli(&[
        "--config",
        path_str(&config_path),
        "--concurrency",
        "0",
    ]))
    .await
    .expect_err("zero workers should fail validation");
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("concurrency"));
}

#[tokio::test]
#[serial]
async fn test_resolve_flag_fixes_invalid_file_value() {
    // Given: a config file whose concurrency is out of range
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "[filter]\nconcurrency = 0\nformat = \"xml\"\n")
        .expect("should write config");

    // When: flags supply valid values
    let config = app::resolve_config(&cli(&[
        "--config",
        path_str(&config_path),
        "--concurrency",
        "2",
        "--format",
        "csv",
    ]))
    .await
    .expect("flags should override invalid file values")
    .config;

    // Then: the flag values win
    assert_eq!(config.filter.concurrency, 2);
    assert_eq!(config.filter.format, "csv");
}

#[tokio::test]
#[serial]
async fn test_resolve_invalid_file_value_without_override_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "[filter]\nconcurrency = 0\n").expect("should write config");

    let err = app::resolve_config(&cli(&["--config", path_str(&config_path)]))
        .await
        .expect_err("invalid file value should fail after resolution");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
#[serial]
async fn test_resolve_env_overrides_file_and_flag_overrides_env() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "[filter]\nconcurrency = 2\norder = \"arrival\"\n")
        .expect("should write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("NDFILTER_FILTER_CONCURRENCY", "6");
        std::env::set_var("NDFILTER_FILTER_ORDER", "input");
    }

    let result = app::resolve_config(&cli(&[
        "--config",
        path_str(&config_path),
        "--concurrency",
        "3",
    ]))
    .await;

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe {
        std::env::remove_var("NDFILTER_FILTER_CONCURRENCY");
        std::env::remove_var("NDFILTER_FILTER_ORDER");
    }

    let config = result.expect("config should resolve").config;
    assert_eq!(config.filter.concurrency, 3, "flag should beat env");
    assert_eq!(config.filter.order, "input", "env should beat file");
}

#[tokio::test]
#[serial]
async fn test_resolve_reports_unparsable_env_value() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::set_var("NDFILTER_FILTER_CONCURRENCY", "many") };

    let result = app::resolve_config(&cli(&["--config", path_str(&config_path)])).await;

    // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
    unsafe { std::env::remove_var("NDFILTER_FILTER_CONCURRENCY") };

    let resolved = result.expect("unparsable env value should be ignored");
    assert_eq!(resolved.config.filter.concurrency, 4, "default should be kept");
    assert_eq!(resolved.warnings.len(), 1);
    assert_eq!(resolved.warnings[0].env_key, "NDFILTER_FILTER_CONCURRENCY");
    assert_eq!(resolved.warnings[0].value, "many");
}

#[tokio::test]
#[serial]
async fn test_run_end_to_end_json() {
    // Given: an input file with the two canonical records
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");
    let input_path = temp_dir.path().join("in.ndjson");
    fs::write(
        &input_path,
        "{\"id\":\"1\",\"status\":\"ok\"}\n{\"id\":\"2\",\"status\":\"fail\"}\n",
    )
    .expect("should write input");
    let output_path = temp_dir.path().join("out.ndjson");

    let args = cli(&[
        "--config",
        path_str(&config_path),
        "--filters",
        r#"{"status":"ok"}"#,
        "--input",
        path_str(&input_path),
        "--output",
        path_str(&output_path),
    ]);

    // When: Running the filter
    let config = app::resolve_config(&args)
        .await
        .expect("config should resolve")
        .config;
    let summary = app::run(&args, &config).await.expect("run should succeed");

    // Then: Only the matching record is written
    assert_eq!(summary.lines_read, 2);
    assert_eq!(summary.records_written, 1);
    let output = fs::read_to_string(&output_path).expect("should read output");
    assert_eq!(output, "{\"id\": \"1\", \"status\": \"ok\"}\n");
}

#[tokio::test]
#[serial]
async fn test_run_end_to_end_csv_projection() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");
    let input_path = temp_dir.path().join("in.ndjson");
    fs::write(
        &input_path,
        "{\"id\":\"1\",\"status\":\"ok\"}\n{\"id\":\"2\",\"status\":\"fail\"}\nnot valid json\n",
    )
    .expect("should write input");
    let output_path = temp_dir.path().join("out.csv");

    let args = cli(&[
        "--config",
        path_str(&config_path),
        "--filters",
        r#"{"status":"ok"}"#,
        "--project",
        "id",
        "--format",
        "csv",
        "--input",
        path_str(&input_path),
        "--output",
        path_str(&output_path),
    ]);

    let config = app::resolve_config(&args)
        .await
        .expect("config should resolve")
        .config;
    let summary = app::run(&args, &config).await.expect("run should succeed");

    assert_eq!(summary.decode_failures, 1);
    let output = fs::read_to_string(&output_path).expect("should read output");
    assert_eq!(output, "1\n");
}

#[tokio::test]
#[serial]
async fn test_run_missing_input_file_is_io_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "").expect("should write config");
    let missing = temp_dir.path().join("missing.ndjson");
    let output_path = temp_dir.path().join("out.ndjson");

    let args = cli(&[
        "--config",
        path_str(&config_path),
        "--input",
        path_str(&missing),
        "--output",
        path_str(&output_path),
    ]);
    let config = app::resolve_config(&args)
        .await
        .expect("config should resolve")
        .config;
    let err = app::run(&args, &config).await.expect_err("missing input should fail");

    assert!(matches!(err, CliError::Io(_)));
    assert_eq!(err.exit_code(), 10);
}

#[tokio::test]
#[serial]
async fn test_validate_prints_effective_config() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("ndfilter.toml");
    fs::write(&config_path, "[filter]\nformat = \"csv\"\n").expect("should write config");

    let args = cli(&[
        "--config",
        path_str(&config_path),
        "--validate",
        "--order",
        "input",
    ]);
    let config = app::resolve_config(&args)
        .await
        .expect("config should resolve")
        .config;
    let rendered = app::validate(&config).expect("config should validate");

    assert!(rendered.contains("format = \"csv\""));
    assert!(rendered.contains("order = \"input\""));
}
