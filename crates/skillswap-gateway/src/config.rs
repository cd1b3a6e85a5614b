use anyhow::Context;
use serde::Deserialize;
use skillswap_matching::RecommendationConfig;
use skillswap_types::Provider;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[providers]
default = "openai"  # or "ollama"

[providers.openai]
api_key = ""  # Set via OPENAI_API_KEY env var
model = "gpt-4o-mini"
base_url = ""  # Optional: Set via OPENAI_BASE_URL env var

[providers.ollama]
base_url = "http://localhost:11434/v1"
model = "llama3"

[recommendations]
count = 3  # must be positive
oracle_timeout_secs = 30
max_candidates = 50

[database]
path = "skillswap.db"

[logging]
level = "info"  # trace, debug, info, warn, error
"#;

#[derive(Debug, Deserialize, Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProvidersConfig {
    pub default: String,
    pub openai: OpenAIConfig,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationsConfig {
    pub count: usize,
    pub oracle_timeout_secs: u64,
    pub max_candidates: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub recommendations: RecommendationsConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.skillswap/skillswap.toml
    fn global_config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".skillswap").join("skillswap.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::global_config_path()?;

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(config_path)
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.skillswap/skillswap.toml (auto-created if missing)
    /// 2. Local override: ./skillswap.toml (optional)
    /// 3. SKILLSWAP__ environment variables
    /// 4. Convenience env vars (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let global_config_path = Self::ensure_global_config()?;

        let mut config_builder = config::Config::builder()
            .add_source(config::File::from(global_config_path))
            .add_source(config::File::with_name("skillswap").required(false))
            .add_source(config::Environment::with_prefix("SKILLSWAP").separator("__"));

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            config_builder = config_builder.set_override("providers.openai.api_key", key)?;
        }

        if let Ok(url) = env::var("OPENAI_BASE_URL") {
            config_builder = config_builder.set_override("providers.openai.base_url", url)?;
        }

        if let Ok(url) = env::var("OLLAMA_BASE_URL") {
            config_builder = config_builder.set_override("providers.ollama.base_url", url)?;
        }

        if let Ok(path) = env::var("SKILLSWAP_DATABASE") {
            config_builder = config_builder.set_override("database.path", path)?;
        }

        let config: Self = config_builder
            .build()?
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.recommendations.count == 0 {
            anyhow::bail!("recommendations.count must be positive");
        }
        if self.recommendations.oracle_timeout_secs == 0 {
            anyhow::bail!("recommendations.oracle_timeout_secs must be positive");
        }
        Ok(())
    }

    /// Provider for the recommendation oracle
    pub fn provider(&self) -> Provider {
        match self.providers.default.as_str() {
            "openai" => Provider::openai_full(
                &self.providers.openai.model,
                self.providers.openai.api_key.clone(),
                self.providers.openai.base_url.clone(),
            ),
            "ollama" => Provider::ollama(
                &self.providers.ollama.model,
                &self.providers.ollama.base_url,
            ),
            other => {
                warn!("Unknown provider '{}', defaulting to OpenAI", other);
                Provider::default()
            }
        }
    }

    pub fn recommendation_config(&self) -> RecommendationConfig {
        RecommendationConfig {
            count: self.recommendations.count,
            oracle_timeout: Duration::from_secs(self.recommendations.oracle_timeout_secs),
            max_candidates: self.recommendations.max_candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.path, "skillswap.db");

        let recs = config.recommendation_config();
        assert_eq!(recs, RecommendationConfig::default());

        match config.provider() {
            Provider::OpenAI {
                model,
                api_key,
                base_url,
            } => {
                assert_eq!(model, "gpt-4o-mini");
                assert!(api_key.is_none());
                assert!(base_url.is_none());
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn test_count_passes_through_and_must_be_positive() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.recommendations.count = 25;
        assert!(config.validate().is_ok());
        assert_eq!(config.recommendation_config().count, 25);

        config.recommendations.count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ollama_provider() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.providers.default = "ollama".into();
        assert_eq!(
            config.provider(),
            Provider::ollama("llama3", "http://localhost:11434/v1")
        );
    }
}
