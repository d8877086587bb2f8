use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_token_expiry() -> i64 {
    7 * 24 * 3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_payment_order_prefix() -> String {
    "PP".to_string()
}

/// Application configuration, loaded from `config/*.toml` files layered with
/// `APP__`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (postgres in production, sqlite in tests)
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    /// Create missing tables on startup; used by tests and local runs.
    #[serde(default)]
    pub auto_migrate: bool,

    /// Secret for the signed approval/rejection capability tokens.
    #[validate(length(min = 32, message = "jwt_secret must be at least 32 characters"))]
    pub jwt_secret: String,

    /// Lifetime of an out-of-band approval token in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Form number prefix for payment orders (`PP` + YYMM + increment).
    #[serde(default = "default_payment_order_prefix")]
    pub payment_order_prefix: String,
}

impl AppConfig {
    /// Direct constructor, mainly for tests and embedding.
    pub fn new(
        database_url: String,
        jwt_secret: String,
        token_expiry_secs: i64,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            db_max_connections: default_max_connections(),
            db_min_connections: default_min_connections(),
            auto_migrate: false,
            jwt_secret,
            token_expiry_secs,
            environment,
            log_level: default_log_level(),
            payment_order_prefix: default_payment_order_prefix(),
        }
    }

    /// Load configuration files for the current environment, then apply
    /// environment-variable overrides, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config = Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_default("environment", environment)?
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(app_config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
