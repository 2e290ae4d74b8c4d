// crates/judgment-gate-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards and section validation.
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

//! Config load validation tests for judgment-gate-config.

#![allow(clippy::use_debug, reason = "Test failure messages include debug output.")]

use std::io::Write;
use std::path::Path;

use judgment_gate_config::ApiConfig;
use judgment_gate_config::AuditSinkKind;
use judgment_gate_config::ConfigError;
use judgment_gate_config::DEFAULT_MAX_RESPONSE_BYTES;
use judgment_gate_config::JudgmentGateConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn write_config(contents: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

fn load_str(contents: &str) -> Result<JudgmentGateConfig, String> {
    let file = write_config(contents)?;
    JudgmentGateConfig::load(Some(file.path())).map_err(|err| err.to_string())
}

fn assert_invalid(result: Result<JudgmentGateConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn assert_invalid_str(contents: &str, needle: &str) -> TestResult {
    let file = write_config(contents)?;
    assert_invalid(JudgmentGateConfig::load(Some(file.path())), needle)
}

// ============================================================================
// SECTION: Load Guards
// ============================================================================

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    assert_invalid(
        JudgmentGateConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    assert_invalid(
        JudgmentGateConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&vec![b'#'; 1_048_577]).map_err(|err| err.to_string())?;
    assert_invalid(JudgmentGateConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(JudgmentGateConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(JudgmentGateConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    assert_invalid_str("[labels\nstop = 1", "config parse error")
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let config = load_str("")?;
    if config != JudgmentGateConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    let labels = config.labels.to_gate_labels();
    if labels.stop != "Stop" || labels.continue_label != "Continue" {
        return Err(format!("unexpected default labels: {labels:?}"));
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("default audit sink should be none".to_string());
    }
    if config.api.max_response_bytes != DEFAULT_MAX_RESPONSE_BYTES {
        return Err("unexpected default response limit".to_string());
    }
    config.validate().map_err(|err| err.to_string())
}

#[test]
fn full_config_loads() -> TestResult {
    let config = load_str(
        r#"
[labels]
stop = "Halt"
continue = "Ship it"
submission_error = "Could not record your decision."

[audit]
sink = "stderr"

[api]
base_url = "https://pipelines.example.com/api/"
bearer_token = "secret"
connect_timeout_ms = 500
request_timeout_ms = 5000
max_response_bytes = 1024
"#,
    )?;
    let labels = config.labels.to_gate_labels();
    if labels.continue_label != "Ship it" || labels.stop != "Halt" {
        return Err(format!("labels not applied: {labels:?}"));
    }
    let base = config.api.require_base_url().map_err(|err| err.to_string())?;
    if base != "https://pipelines.example.com/api/" {
        return Err(format!("unexpected base url {base}"));
    }
    if config.api.request_timeout().as_millis() != 5_000 {
        return Err("request timeout not applied".to_string());
    }
    Ok(())
}

#[test]
fn base_url_is_required_only_on_demand() -> TestResult {
    let api = ApiConfig::default();
    match api.require_base_url() {
        Err(err) if err.to_string().contains("api.base_url must be set") => Ok(()),
        other => Err(format!("unexpected result {other:?}")),
    }
}

// ============================================================================
// SECTION: Section Validation
// ============================================================================

#[test]
fn empty_label_is_rejected() -> TestResult {
    assert_invalid_str("[labels]\nstop = \"  \"\n", "labels.stop must be non-empty")
}

#[test]
fn oversized_label_is_rejected() -> TestResult {
    let label = "x".repeat(257);
    assert_invalid_str(
        &format!("[labels]\ncontinue = \"{label}\"\n"),
        "labels.continue exceeds max length",
    )
}

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid_str("[audit]\nsink = \"file\"\n", "audit.path is required for file sink")
}

#[test]
fn path_without_file_sink_is_rejected() -> TestResult {
    assert_invalid_str(
        "[audit]\nsink = \"stderr\"\npath = \"audit.log\"\n",
        "audit.path is only allowed for file sink",
    )
}

#[test]
fn file_sink_opens_configured_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let log = dir.path().join("audit.jsonl");
    let path = log.display().to_string();
    let config = load_str(&format!("[audit]\nsink = \"file\"\npath = {path:?}\n"))?;
    config.audit.build_sink().map_err(|err| err.to_string())?;
    if !log.exists() {
        return Err("audit file was not created".to_string());
    }
    Ok(())
}

#[test]
fn unknown_sink_is_rejected() -> TestResult {
    assert_invalid_str("[audit]\nsink = \"syslog\"\n", "config parse error")
}

#[test]
fn plain_http_requires_opt_in() -> TestResult {
    assert_invalid_str(
        "[api]\nbase_url = \"http://localhost:8084\"\n",
        "api.base_url uses http:// without allow_http",
    )?;
    load_str("[api]\nbase_url = \"http://localhost:8084\"\nallow_http = true\n").map(|_| ())
}

#[test]
fn base_url_requires_scheme() -> TestResult {
    assert_invalid_str(
        "[api]\nbase_url = \"pipelines.example.com\"\n",
        "api.base_url must include http:// or https://",
    )
}

#[test]
fn timeouts_outside_bounds_are_rejected() -> TestResult {
    assert_invalid_str("[api]\nconnect_timeout_ms = 50\n", "api.connect_timeout_ms must be between")?;
    assert_invalid_str("[api]\nrequest_timeout_ms = 60001\n", "api.request_timeout_ms must be between")
}

#[test]
fn response_limit_is_bounded() -> TestResult {
    assert_invalid_str("[api]\nmax_response_bytes = 0\n", "api.max_response_bytes must be > 0")?;
    assert_invalid_str(
        "[api]\nmax_response_bytes = 67108865\n",
        "api.max_response_bytes exceeds max limit",
    )
}

#[test]
fn oversized_bearer_token_is_rejected() -> TestResult {
    let token = "t".repeat(4097);
    assert_invalid_str(
        &format!("[api]\nbearer_token = \"{token}\"\n"),
        "api.bearer_token exceeds max length",
    )
}
