use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "vercup.toml",
    "config/vercup.toml",
    "crates/config/vercup.toml",
    "../vercup.toml",
    "../config/vercup.toml",
];

/// Plain environment variables honoured for compatibility with existing `.env` files.
/// They only fill values the layered configuration left unset.
pub const LEGACY_EMAIL_SENDER: &str = "EMAIL_SENDER";
pub const LEGACY_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const LEGACY_EMAIL_RECEIVER: &str = "EMAIL_RECEIVER";
pub const LEGACY_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mail: MailConfig,
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
    /// Chat sessions untouched for this long are dropped.
    #[serde(default = "HttpConfig::default_session_idle")]
    pub session_idle_seconds: u64,
}

impl HttpConfig {
    const fn default_session_idle() -> u64 {
        30 * 60
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8501,
            session_idle_seconds: Self::default_session_idle(),
        }
    }
}

/// SMTP settings for the inquiry notifier.
///
/// ```
/// use vercup_config::MailConfig;
///
/// let mail = MailConfig::default();
/// assert_eq!(mail.smtp_host, "smtp.gmail.com");
/// assert_eq!(mail.smtp_port, 587);
/// assert!(!mail.is_complete());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default = "MailConfig::default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "MailConfig::default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default = "MailConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl MailConfig {
    fn default_smtp_host() -> String {
        "smtp.gmail.com".to_string()
    }

    const fn default_smtp_port() -> u16 {
        587
    }

    const fn default_timeout() -> u64 {
        30
    }

    /// True when sender, password and receiver are all present and non-blank.
    pub fn is_complete(&self) -> bool {
        [&self.sender, &self.password, &self.receiver]
            .iter()
            .all(|value| is_present(value))
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: None,
            password: None,
            receiver: None,
            smtp_host: Self::default_smtp_host(),
            smtp_port: Self::default_smtp_port(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("sender", &self.sender)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("receiver", &self.receiver)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Settings for the hosted chat-completion endpoint backing the assistant.
///
/// ```
/// use vercup_config::AssistantConfig;
///
/// let assistant = AssistantConfig::default();
/// assert_eq!(assistant.base_url, "https://api.openai.com/v1");
/// assert!((assistant.temperature - 0.7).abs() < f32::EPSILON);
/// assert!(!assistant.is_enabled());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "AssistantConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "AssistantConfig::default_model")]
    pub model: String,
    #[serde(default = "AssistantConfig::default_temperature")]
    pub temperature: f32,
    #[serde(default = "AssistantConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub knowledge_path: Option<String>,
}

impl AssistantConfig {
    fn default_base_url() -> String {
        "https://api.openai.com/v1".to_string()
    }

    fn default_model() -> String {
        "gpt-4o-mini".to_string()
    }

    const fn default_temperature() -> f32 {
        0.7
    }

    const fn default_request_timeout() -> u64 {
        60
    }

    pub fn is_enabled(&self) -> bool {
        is_present(&self.api_key)
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::default_base_url(),
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            request_timeout_seconds: Self::default_request_timeout(),
            knowledge_path: None,
        }
    }
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("knowledge_path", &self.knowledge_path)
            .finish()
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.trim().is_empty())
}

fn legacy_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn fill_from_legacy(slot: &mut Option<String>, key: &str) {
    if is_present(slot) {
        return;
    }
    if let Some(value) = legacy_var(key) {
        debug!(variable = key, "using legacy environment variable");
        *slot = Some(value);
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use vercup_config::load;
///
/// std::env::remove_var("VERCUP_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default(
            "http.session_idle_seconds",
            i64::try_from(defaults.http.session_idle_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("mail.smtp_host", defaults.mail.smtp_host.clone())?
        .set_default("mail.smtp_port", i64::from(defaults.mail.smtp_port))?
        .set_default(
            "mail.timeout_seconds",
            i64::try_from(defaults.mail.timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("assistant.base_url", defaults.assistant.base_url.clone())?
        .set_default("assistant.model", defaults.assistant.model.clone())?
        .set_default("assistant.temperature", f64::from(defaults.assistant.temperature))?
        .set_default(
            "assistant.request_timeout_seconds",
            i64::try_from(defaults.assistant.request_timeout_seconds).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("VERCUP").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("VERCUP_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via VERCUP_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    fill_from_legacy(&mut config.mail.sender, LEGACY_EMAIL_SENDER);
    fill_from_legacy(&mut config.mail.password, LEGACY_EMAIL_PASSWORD);
    fill_from_legacy(&mut config.mail.receiver, LEGACY_EMAIL_RECEIVER);
    fill_from_legacy(&mut config.assistant.api_key, LEGACY_OPENAI_API_KEY);

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
