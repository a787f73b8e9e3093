use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:9/v1";

fn bare_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("newssense"));
    cmd.env_remove("BASE_URL")
        .env_remove("API_KEY")
        .env_remove("MODEL_NAME")
        .env_remove("NS_CONFIG")
        .env_remove("NS_TEMPERATURE")
        .env_remove("NS_MAX_TOKENS")
        .env_remove("NS_TIMEOUT")
        .env_remove("NS_TURN_TIMEOUT")
        .env_remove("NS_RETRIES")
        .env_remove("NS_RETRY_DELAY")
        .env_remove("NS_USER_ID")
        .env_remove("NS_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn newssense_cmd() -> Command {
    let mut cmd = bare_cmd();
    cmd.env("BASE_URL", UNREACHABLE_BASE_URL)
        .env("API_KEY", "test-secret-key")
        .env("MODEL_NAME", "test-model")
        .env("NS_TIMEOUT", "2");
    cmd
}

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("newssense-test-{label}-{nanos}"))
}

#[test]
fn missing_environment_refuses_to_start() {
    bare_cmd()
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(contains("Please set BASE_URL, API_KEY, and MODEL_NAME."))
        .stdout(contains("Welcome").not());
}

#[test]
fn missing_key_is_named() {
    bare_cmd()
        .env("BASE_URL", UNREACHABLE_BASE_URL)
        .env("MODEL_NAME", "test-model")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(contains("Missing required configuration: API_KEY."));
}

#[test]
fn exit_keyword_quits_cleanly() {
    newssense_cmd()
        .write_stdin("exit\n")
        .assert()
        .success()
        .stdout(contains("Welcome to NewsSense!").and(contains("Goodbye!")));
}

#[test]
fn quit_keyword_ignores_case() {
    newssense_cmd()
        .write_stdin("  QUIT \n")
        .assert()
        .success()
        .stdout(contains("Goodbye!").and(contains("NewsSense: ").not()));
}

#[test]
fn end_of_input_quits_cleanly() {
    newssense_cmd()
        .write_stdin("\n\n")
        .assert()
        .success()
        .stdout(contains("Goodbye!"));
}

#[test]
fn failed_turn_is_reported_and_loop_continues() {
    newssense_cmd()
        .write_stdin("What's trending in tech?\nexit\n")
        .assert()
        .success()
        .stdout(contains("error: ").and(contains("Goodbye!")));
}

#[test]
fn guardrail_blocks_before_any_request() {
    let config_path = unique_temp_path("guardrail.toml");
    fs::write(
        &config_path,
        "[profiles.strict]\nblocked_terms = [\"celebrity gossip\"]\n",
    )
    .expect("config should be writable");

    newssense_cmd()
        .env("NS_CONFIG", &config_path)
        .args(["--profile", "strict"])
        .write_stdin("Summarize the latest Celebrity Gossip\nexit\n")
        .assert()
        .success()
        .stdout(
            contains("GUARDRAIL TRIGGERED")
                .and(contains("celebrity gossip"))
                .and(contains("error: ").not()),
        );
}

#[test]
fn unknown_profile_is_a_config_error() {
    let config_path = unique_temp_path("profiles.toml");
    fs::write(&config_path, "[profiles.local]\nmodel = \"llama3\"\n")
        .expect("config should be writable");

    newssense_cmd()
        .env("NS_CONFIG", &config_path)
        .args(["--profile", "missing"])
        .assert()
        .failure()
        .stderr(contains("Profile 'missing' not found"));
}

#[test]
fn invalid_output_flag_is_rejected() {
    newssense_cmd()
        .args(["--output", "yaml"])
        .assert()
        .failure()
        .stderr(contains("invalid output 'yaml'"));
}

#[test]
fn verbose_does_not_leak_api_key() {
    newssense_cmd()
        .arg("-v")
        .write_stdin("exit\n")
        .assert()
        .success()
        .stderr(contains("endpoint=http://127.0.0.1:9/v1").and(contains("test-secret-key").not()));
}
