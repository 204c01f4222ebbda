use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Signing key used only when `jwt.allow_development_secret` is set in a debug build.
const DEVELOPMENT_JWT_SECRET: &str = "tennis-tracker-development-secret-do-not-deploy";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: PasswordConfig,
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
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: Option<String>,
    #[serde(default = "default_expiration_hours")]
    pub expiration_hours: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default)]
    pub allow_development_secret: bool,
}

// The secret must never end up in logs, so Debug is written by hand.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .field("allow_development_secret", &self.allow_development_secret)
            .finish()
    }
}

/// Argon2 cost factor and password-reset settings.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub reset_token_ttl_minutes: i64,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            reset_token_ttl_minutes: 60,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_expiration_hours() -> i64 {
    auth::authenticator::DEFAULT_TOKEN_LIFETIME_HOURS
}

fn default_issuer() -> String {
    auth::authenticator::DEFAULT_ISSUER.to_string()
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        // Unprefixed: JWT__SECRET=... overrides jwt.secret
        Self::load_from(&run_mode, Environment::default().separator("__"))
    }

    fn load_from(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

impl JwtConfig {
    /// Resolve the token signing secret.
    ///
    /// A configured, non-empty secret always wins. Without one, the fixed
    /// development key is only handed out when `allow_development_secret` is
    /// set *and* this is a debug build; otherwise startup must fail.
    ///
    /// # Errors
    /// * `ConfigError::Message` - No secret configured and the fallback is not allowed
    pub fn signing_secret(&self) -> Result<String, ConfigError> {
        match self.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
            _ if self.allow_development_secret && cfg!(debug_assertions) => {
                tracing::warn!(
                    "jwt.secret is not set: signing tokens with the built-in DEVELOPMENT key. \
                     Anyone can forge tokens for this instance. Never run it like this in production"
                );
                Ok(DEVELOPMENT_JWT_SECRET.to_string())
            }
            _ => Err(ConfigError::Message(
                "jwt.secret must be set (e.g. via JWT__SECRET)".to_string(),
            )),
        }
    }
}
