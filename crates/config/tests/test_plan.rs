//! Test plan for the `hireloop-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and validation behaviour.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use hireloop_config::{load, ApiConfig, AuthConfig, ClientConfig, SearchConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "HIRELOOP_CONFIG",
    "HIRELOOP__API__BASE_URL",
    "HIRELOOP__API__REQUEST_TIMEOUT_SECONDS",
    "HIRELOOP__REALTIME__URL",
    "HIRELOOP__AUTH__OTP_RESEND_COOLDOWN_SECONDS",
    "HIRELOOP__AUTH__TOKEN_STORE_PATH",
    "HIRELOOP__AUTH__GOOGLE__CLIENT_ID",
    "HIRELOOP__AUTH__GOOGLE__CLIENT_SECRET",
    "HIRELOOP__AUTH__GOOGLE__REDIRECT_URI",
    "HIRELOOP__SEARCH__DEBOUNCE_MILLIS",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

fn isolated() -> (TempDir, TestContext) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());
    (temp_dir, ctx)
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let (_temp_dir, _ctx) = isolated();

    let config = load().expect("configuration load should succeed without files");
    let defaults = ClientConfig::default();

    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(
        config.api.request_timeout_seconds,
        defaults.api.request_timeout_seconds
    );
    assert_eq!(config.realtime.url, defaults.realtime.url);
    assert_eq!(config.auth.otp_resend_cooldown_seconds, 30);
    assert!(config.auth.token_store_path.is_none());
    assert_eq!(config.search.debounce_millis, 500);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "hireloop.toml",
        r#"
        [api]
        base_url = "https://first.example/api"
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/hireloop.toml",
        r#"
        [api]
        base_url = "https://second.example/api"
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.api.base_url, "https://first.example/api");
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "hireloop.toml",
        r#"
        [realtime]
        url = "wss://socket.example"

        [search]
        debounce_millis = 250
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = ClientConfig::default();

    assert_eq!(config.realtime.url, "wss://socket.example");
    assert_eq!(config.search.debounce(), Duration::from_millis(250));
    assert_eq!(config.api.base_url, defaults.api.base_url);
    assert_eq!(
        config.auth.otp_resend_cooldown_seconds,
        defaults.auth.otp_resend_cooldown_seconds
    );
}

#[test]
#[serial]
fn load_reads_json_files() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "hireloop.json",
        r#"{ "auth": { "token_store_path": "tokens.json" } }"#,
    );

    let config = load().expect("json configuration should load");
    assert_eq!(config.auth.token_store_path.as_deref(), Some("tokens.json"));
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "hireloop.toml",
        r#"
        [auth]
        otp_resend_cooldown_seconds = 45
        "#,
    );

    ctx.set_var("HIRELOOP__AUTH__OTP_RESEND_COOLDOWN_SECONDS", "10");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.auth.otp_resend_cooldown(), Duration::from_secs(10));
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/client.toml",
        r#"
        [auth.google]
        client_id = "google-client"
        redirect_uri = "http://localhost:3000/oauth/callback"
        "#,
    );
    ctx.set_var(
        "HIRELOOP_CONFIG",
        temp_dir.path().join("elsewhere/client.toml").display().to_string(),
    );

    let config = load().expect("explicit config path should load");
    assert_eq!(config.auth.google.client_id.as_deref(), Some("google-client"));
    assert!(config.auth.google.client_secret.is_none());
}

#[test]
#[serial]
fn load_strips_trailing_slash_from_base_url() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("HIRELOOP__API__BASE_URL", "https://api.example/v1///");

    let config = load().expect("configuration load should succeed");
    assert_eq!(config.api.base_url, "https://api.example/v1");
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "hireloop.toml",
        r#"
        [api]
        request_timeout_seconds = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration") || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn google_auth_config_defaults_to_optional_fields_none() {
    let defaults = AuthConfig::default();
    assert!(defaults.google.client_id.is_none());
    assert!(defaults.google.client_secret.is_none());
    assert!(defaults.google.redirect_uri.is_none());
}

#[test]
fn duration_helpers_match_defaults() {
    assert_eq!(ApiConfig::default().request_timeout(), Duration::from_secs(30));
    assert_eq!(SearchConfig::default().debounce(), Duration::from_millis(500));
    assert_eq!(
        AuthConfig::default().otp_resend_cooldown(),
        Duration::from_secs(30)
    );
}
