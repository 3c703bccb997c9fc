use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const CONFIG_DIR_NAME: &str = ".opsswarm";
const CONFIG_FILE_NAME: &str = "config.toml";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    pub api_key: Option<String>,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ── Reasoning oracle ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// "groq", any OpenAI-compatible provider name, or "rules" for the
    /// offline rule-based oracle
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".into()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_oracle_timeout_secs() -> u64 {
    60
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

// ── Tool gateway ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
    /// Shard probed during planning when the logs name none
    #[serde(default = "default_status_check_target")]
    pub status_check_target: String,
    /// Simulated restart latency
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

fn default_gateway_timeout_secs() -> u64 {
    15
}

fn default_status_check_target() -> String {
    "DB_SHARD_04".into()
}

fn default_restart_delay_ms() -> u64 {
    2000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_gateway_timeout_secs(),
            status_check_target: default_status_check_target(),
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

// ── Safety guard ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Tokens blocked in addition to the built-in denylist
    #[serde(default)]
    pub extra_denylist: Vec<String>,
}

// ── Observability ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// "none" | "log"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// tracing max level: "error" | "warn" | "info" | "debug" | "trace"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_backend() -> String {
    "log".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            log_level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME),
            api_key: None,
            oracle: OracleConfig::default(),
            gateway: GatewayConfig::default(),
            guard: GuardConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Load `~/.opsswarm/config.toml`, writing a default file on first run.
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(CONFIG_DIR_NAME))
    }

    pub fn load_or_init_in(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create .opsswarm directory")?;
        }

        if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config.validate()?;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // API key: OPSSWARM_API_KEY or GROQ_API_KEY
        if let Ok(key) =
            std::env::var("OPSSWARM_API_KEY").or_else(|_| std::env::var("GROQ_API_KEY"))
        {
            if !key.is_empty() {
                self.api_key = Some(key);
            }
        }

        if let Ok(provider) = std::env::var("OPSSWARM_PROVIDER") {
            if !provider.is_empty() {
                self.oracle.provider = provider;
            }
        }

        if let Ok(model) = std::env::var("OPSSWARM_MODEL") {
            if !model.is_empty() {
                self.oracle.model = model;
            }
        }

        if let Ok(base_url) = std::env::var("OPSSWARM_BASE_URL") {
            if !base_url.is_empty() {
                self.oracle.base_url = base_url;
            }
        }

        if let Ok(temp_str) = std::env::var("OPSSWARM_TEMPERATURE") {
            if let Ok(temp) = temp_str.parse::<f64>() {
                if (0.0..=2.0).contains(&temp) {
                    self.oracle.temperature = temp;
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.oracle.temperature) {
            return Err(ConfigError::Validation(format!(
                "oracle.temperature must be within 0.0..=2.0, got {}",
                self.oracle.temperature
            )));
        }
        if self.oracle.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "oracle.max_tokens must be positive".into(),
            ));
        }
        if self.oracle.timeout_secs == 0 || self.gateway.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "oracle.timeout_secs and gateway.timeout_secs must be positive".into(),
            ));
        }
        if self.gateway.status_check_target.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.status_check_target must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// API key with everything past the first four characters masked.
    pub fn masked_api_key(&self) -> String {
        match self.api_key.as_deref() {
            None | Some("") => "(not set)".into(),
            Some(key) => {
                let visible: String = key.chars().take(4).collect();
                format!("{visible}****")
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
