use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: constants::market_data::DEFAULT_BASE_URL.to_string(),
            timeout_secs: constants::market_data::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl MarketDataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub base_url: String,
    /// Currency the market data is quoted in
    pub base: String,
    /// Currency the latest close is converted into
    pub target: String,
    pub timeout_secs: u64,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            base_url: constants::fx::DEFAULT_BASE_URL.to_string(),
            base: constants::fx::DEFAULT_BASE.to_string(),
            target: constants::fx::DEFAULT_TARGET.to_string(),
            timeout_secs: constants::fx::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl FxConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub dir: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dir: constants::chart::DEFAULT_DIR.to_string(),
            width: constants::chart::DEFAULT_WIDTH,
            height: constants::chart::DEFAULT_HEIGHT,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_concurrent: usize,
    pub queue_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
            model: "mistral-7b-instruct".to_string(),
            temperature: 0.7,
            max_concurrent: 2,
            queue_size: 32,
        }
    }
}

impl LlmConfig {
    /// An LLM is usable when enabled and pointed somewhere: either a hosted
    /// endpoint with a key, or a custom (local) base URL.
    pub fn is_configured(&self) -> bool {
        self.enabled && (self.api_key.is_some() || self.base_url.is_some())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub memory_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            memory_turns: 20,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub market_data: MarketDataConfig,
    pub fx: FxConfig,
    pub chart: ChartConfig,
    pub llm: LlmConfig,
    pub agent: AgentConfig,
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "config.yaml";

    /// Load from `CONFIG_PATH` (or `config.yaml`), then apply env overrides.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!("⚠️ [CONFIG] {} not found, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.normalize()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.trim().is_empty() {
                self.llm.base_url = Some(url);
            }
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Upper-case currency codes and reject values the services cannot use.
    pub fn normalize(&mut self) -> Result<(), ConfigError> {
        self.fx.base = self.fx.base.trim().to_uppercase();
        self.fx.target = self.fx.target.trim().to_uppercase();

        if self.fx.base.is_empty() || self.fx.target.is_empty() {
            return Err(ConfigError::Invalid("fx.base and fx.target must be set".into()));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart dimensions must be non-zero".into()));
        }
        if self.llm.max_concurrent == 0 || self.llm.queue_size == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_concurrent and llm.queue_size must be non-zero".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::Invalid("agent.max_iterations must be non-zero".into()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
