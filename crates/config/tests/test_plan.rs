//! Test plan for the `vercup-config` crate.
//!
//! These tests exercise the configuration loader across default handling,
//! file discovery, environment overrides, and the legacy `.env` variables.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use vercup_config::{load, AppConfig, AssistantConfig, HttpConfig, MailConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "VERCUP_CONFIG",
    "VERCUP__HTTP__ADDRESS",
    "VERCUP__HTTP__PORT",
    "VERCUP__HTTP__SESSION_IDLE_SECONDS",
    "VERCUP__MAIL__SENDER",
    "VERCUP__MAIL__PASSWORD",
    "VERCUP__MAIL__RECEIVER",
    "VERCUP__MAIL__SMTP_HOST",
    "VERCUP__MAIL__SMTP_PORT",
    "VERCUP__ASSISTANT__API_KEY",
    "VERCUP__ASSISTANT__MODEL",
    "VERCUP__ASSISTANT__BASE_URL",
    "VERCUP__ASSISTANT__KNOWLEDGE_PATH",
    "EMAIL_SENDER",
    "EMAIL_PASSWORD",
    "EMAIL_RECEIVER",
    "OPENAI_API_KEY",
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
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.http.session_idle_seconds, 1800);
    assert_eq!(config.mail.smtp_host, defaults.mail.smtp_host);
    assert_eq!(config.mail.smtp_port, 587);
    assert!(config.mail.sender.is_none());
    assert!(!config.mail.is_complete());
    assert_eq!(config.assistant.model, defaults.assistant.model);
    assert!(config.assistant.api_key.is_none());
    assert!(!config.assistant.is_enabled());
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "vercup.toml",
        r#"
        [http]
        port = 4242
        "#,
    );
    write_config_file(
        temp_dir.path(),
        "config/vercup.toml",
        r#"
        [http]
        port = 5151
        "#,
    );

    let config = load().expect("configuration load should pick the first file");
    assert_eq!(config.http.port, 4242);
}

#[test]
#[serial]
fn load_merges_partial_file_with_defaults() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "vercup.toml",
        r#"
        [mail]
        sender = "vercup@example.com"
        receiver = "team@example.com"

        [assistant]
        model = "gpt-4o"
        "#,
    );

    let config = load().expect("configuration load should succeed");
    let defaults = AppConfig::default();

    assert_eq!(config.mail.sender.as_deref(), Some("vercup@example.com"));
    assert_eq!(config.mail.smtp_host, defaults.mail.smtp_host);
    assert_eq!(config.assistant.model, "gpt-4o");
    assert_eq!(config.assistant.base_url, defaults.assistant.base_url);
    assert_eq!(config.http.port, defaults.http.port);
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "elsewhere/custom.toml",
        r#"
        [http]
        address = "0.0.0.0"
        "#,
    );
    ctx.set_var(
        "VERCUP_CONFIG",
        temp_dir.path().join("elsewhere/custom.toml").display().to_string(),
    );

    let config = load().expect("explicit configuration path should load");
    assert_eq!(config.http.address, "0.0.0.0");
}

#[test]
#[serial]
fn load_applies_environment_overrides() {
    let (temp_dir, mut ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "vercup.toml",
        r#"
        [http]
        port = 3030
        "#,
    );

    ctx.set_var("VERCUP__HTTP__PORT", "8080");
    ctx.set_var("VERCUP__HTTP__SESSION_IDLE_SECONDS", "90");

    let config = load().expect("configuration load should honour env overrides");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.http.session_idle_seconds, 90);
}

#[test]
#[serial]
fn load_reads_legacy_mail_and_chat_variables() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("EMAIL_SENDER", "vercup@example.com");
    ctx.set_var("EMAIL_PASSWORD", "app-password");
    ctx.set_var("EMAIL_RECEIVER", "team@example.com");
    ctx.set_var("OPENAI_API_KEY", "sk-test-key");

    let config = load().expect("legacy variables should load");

    assert_eq!(config.mail.sender.as_deref(), Some("vercup@example.com"));
    assert_eq!(config.mail.password.as_deref(), Some("app-password"));
    assert_eq!(config.mail.receiver.as_deref(), Some("team@example.com"));
    assert!(config.mail.is_complete());
    assert_eq!(config.assistant.api_key.as_deref(), Some("sk-test-key"));
    assert!(config.assistant.is_enabled());
}

#[test]
#[serial]
fn prefixed_variables_win_over_legacy_variables() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("EMAIL_SENDER", "legacy@example.com");
    ctx.set_var("VERCUP__MAIL__SENDER", "prefixed@example.com");

    let config = load().expect("configuration should load");
    assert_eq!(config.mail.sender.as_deref(), Some("prefixed@example.com"));
}

#[test]
#[serial]
fn blank_legacy_variables_are_ignored() {
    let (_temp_dir, mut ctx) = isolated();

    ctx.set_var("EMAIL_SENDER", "   ");

    let config = load().expect("configuration should load");
    assert!(config.mail.sender.is_none());
}

#[test]
#[serial]
fn load_errors_on_invalid_toml_contents() {
    let (temp_dir, _ctx) = isolated();

    write_config_file(
        temp_dir.path(),
        "vercup.toml",
        r#"
        [http]
        port = "not-a-number
        "#,
    );

    let error = load().expect_err("invalid TOML should cause load to fail");
    let message = error.to_string();
    assert!(
        message.contains("invalid configuration")
            || message.contains("unable to build configuration"),
        "unexpected error message: {message}"
    );
}

#[test]
fn mail_config_requires_all_three_credentials() {
    let mut mail = MailConfig {
        sender: Some("vercup@example.com".to_string()),
        password: Some("secret".to_string()),
        receiver: None,
        ..MailConfig::default()
    };
    assert!(!mail.is_complete());

    mail.receiver = Some("team@example.com".to_string());
    assert!(mail.is_complete());

    mail.password = Some(String::new());
    assert!(!mail.is_complete());
}

#[test]
fn debug_output_redacts_secrets() {
    let mail = MailConfig {
        password: Some("hunter2".to_string()),
        ..MailConfig::default()
    };
    let assistant = AssistantConfig {
        api_key: Some("sk-secret".to_string()),
        ..AssistantConfig::default()
    };

    let rendered = format!("{mail:?} {assistant:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn http_config_defaults_match_expected_host_and_port() {
    let defaults = HttpConfig::default();
    assert_eq!(defaults.address, "127.0.0.1");
    assert_eq!(defaults.port, 8501);
    assert_eq!(defaults.session_idle_seconds, 30 * 60);
}
