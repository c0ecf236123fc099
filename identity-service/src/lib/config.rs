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
    pub jwt: JwtConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_seconds: i64,
    #[serde(default)]
    pub leeway_seconds: i64,
}

impl JwtConfig {
    /// Token lifetimes and leeway as consumed by the token service.
    pub fn token_policy(&self) -> auth::TokenPolicy {
        auth::TokenPolicy {
            access_ttl: chrono::Duration::seconds(self.access_token_ttl_seconds),
            refresh_ttl: chrono::Duration::seconds(self.refresh_token_ttl_seconds),
            leeway: chrono::Duration::seconds(self.leeway_seconds),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        if self.access_token_ttl_seconds <= 0 || self.refresh_token_ttl_seconds <= 0 {
            return Err(ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }
        if self.leeway_seconds < 0 {
            return Err(ConfigError::Message(
                "jwt.leeway_seconds must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccountsConfig {
    #[serde(default = "default_role")]
    pub default_role: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_access_token_ttl() -> i64 {
    900
}

fn default_refresh_token_ttl() -> i64 {
    604_800
}

fn default_role() -> String {
    "ROLE_USER".to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        Self::from_builder(configuration)
    }

    fn from_builder(configuration: ConfigBuilder) -> Result<Self, ConfigError> {
        let config: Config = configuration.try_deserialize()?;
        config.jwt.validate()?;

        Ok(config)
    }
}
