use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "hireloop.toml",
    "config/hireloop.toml",
    "hireloop.json",
    "config/hireloop.json",
    "../hireloop.toml",
    "../config/hireloop.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub realtime: RealtimeConfig,
    pub auth: AuthConfig,
    pub search: SearchConfig,
}

/// Location of the REST backend.
///
/// ```
/// use hireloop_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://localhost:5000/api");
/// assert_eq!(api.request_timeout_seconds, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    const fn default_request_timeout() -> u64 {
        30
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    pub url: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:5000/socket".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_otp_cooldown")]
    pub otp_resend_cooldown_seconds: u64,
    /// Where tokens persist between CLI invocations. `None` keeps them in memory.
    #[serde(default)]
    pub token_store_path: Option<String>,
    #[serde(default)]
    pub google: GoogleAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_resend_cooldown_seconds: Self::default_otp_cooldown(),
            token_store_path: None,
            google: GoogleAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    const fn default_otp_cooldown() -> u64 {
        30
    }

    pub fn otp_resend_cooldown(&self) -> Duration {
        Duration::from_secs(self.otp_resend_cooldown_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GoogleAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_debounce")]
    pub debounce_millis: u64,
}

impl SearchConfig {
    const fn default_debounce() -> u64 {
        500
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_millis: Self::default_debounce(),
        }
    }
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use hireloop_config::load;
///
/// std::env::remove_var("HIRELOOP_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<ClientConfig> {
    let defaults = ClientConfig::default();

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default(
            "api.request_timeout_seconds",
            i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX),
        )?
        .set_default("realtime.url", defaults.realtime.url.clone())?
        .set_default(
            "auth.otp_resend_cooldown_seconds",
            i64::try_from(defaults.auth.otp_resend_cooldown_seconds).unwrap_or(i64::MAX),
        )?
        .set_default(
            "search.debounce_millis",
            i64::try_from(defaults.search.debounce_millis).unwrap_or(i64::MAX),
        )?;

    let environment_overrides = config::Environment::with_prefix("HIRELOOP").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("HIRELOOP_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via HIRELOOP_CONFIG");
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
        .try_deserialize::<ClientConfig>()
        .context("invalid configuration")?;

    let trimmed = config.api.base_url.trim_end_matches('/').len();
    config.api.base_url.truncate(trimmed);

    debug!(?config, "loaded client configuration");
    Ok(config)
}
