use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub tokens: TokenConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default)]
    pub environment: RuntimeEnvironment,
}

/// Deployment environment; decides cookie security attributes.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_secret: String,
    pub refresh_ttl_days: i64,
    #[serde(default = "default_rotate_refresh_tokens")]
    pub rotate_refresh_tokens: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

fn default_base_path() -> String {
    "/api/v1/user".to_string()
}

fn default_rotate_refresh_tokens() -> bool {
    true
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (TOKENS__ACCESS_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: CORS__ALLOWED_ORIGINS=https://a.example,https://b.example
            .add_source(
                Environment::default()
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.access_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "tokens.access_secret must be set".to_string(),
            ));
        }
        if self.tokens.refresh_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "tokens.refresh_secret must be set".to_string(),
            ));
        }
        let base_path = &self.server.base_path;
        if !base_path.is_empty() && !base_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "server.base_path must be empty or start with '/', got {:?}",
                base_path
            )));
        }
        if self.tokens.access_ttl_minutes <= 0 || self.tokens.refresh_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "token lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
