use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::types::{TrainerId, TypeConstraintError};

/// Runtime settings of the dashboard.
///
/// Sources, lowest precedence first: built-in defaults, `config/default.yaml`,
/// `config/{APP_ENV}.yaml`, `APP_*` environment variables, then the
/// conventional `DATABASE_URL` and `BACKEND_API_URL` variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    /// Base URL of the backend hosting `/admin/analyze_tone`.
    pub backend_api_url: String,
    pub bind_address: String,
    pub port: u16,
    /// Glob Tera loads templates from.
    pub templates_dir: String,
    /// Signing key for flash-message cookies; at least 64 bytes. A random key
    /// is generated per process when unset.
    pub secret: Option<String>,
    /// Trainer shown when a page is opened without `trainer_id`.
    pub default_trainer_id: String,
    pub listing_cache_ttl_secs: u64,
    pub tone_manual_timeout_secs: u64,
    pub tone_after_insert_timeout_secs: u64,
    pub pool_max_size: u32,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        Config::builder()
            .set_default("database_url", "trainer_data.db")?
            .set_default("backend_api_url", "http://127.0.0.1:8000")?
            .set_default("bind_address", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("templates_dir", "templates/**/*")?
            .set_default("default_trainer_id", "tr_001")?
            .set_default("listing_cache_ttl_secs", 60)?
            .set_default("tone_manual_timeout_secs", 15)?
            .set_default("tone_after_insert_timeout_secs", 30)?
            .set_default("pool_max_size", 5)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP"))
            .set_override_option("database_url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("backend_api_url", std::env::var("BACKEND_API_URL").ok())?
            .build()?
            .try_deserialize()
    }

    pub fn default_trainer(&self) -> Result<TrainerId, TypeConstraintError> {
        TrainerId::new(self.default_trainer_id.as_str())
    }

    pub fn listing_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.listing_cache_ttl_secs)
    }

    pub fn tone_manual_timeout(&self) -> Duration {
        Duration::from_secs(self.tone_manual_timeout_secs)
    }

    pub fn tone_after_insert_timeout(&self) -> Duration {
        Duration::from_secs(self.tone_after_insert_timeout_secs)
    }
}
