use ::config::builder::DefaultState;
use ::config::{ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the SAXO backend API
    pub backend_url: String,

    /// CoinMarketCap API base URL
    pub cmc_api_url: String,

    /// CoinMarketCap API key
    pub cmc_api_key: String,

    /// USD based currency conversion feed
    pub rates_url: String,

    /// Currency prices are shown in
    pub local_currency: String,

    /// Delay between a settled trade and the dashboard refresh
    pub reload_delay_ms: u64,

    pub request_timeout_secs: u64,

    /// How many CoinMarketCap listings to fetch
    pub listing_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080/api".to_string(),
            cmc_api_url: "https://pro-api.coinmarketcap.com".to_string(),
            cmc_api_key: String::new(),
            rates_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            local_currency: "IDR".to_string(),
            reload_delay_ms: 2000,
            request_timeout_secs: 15,
            listing_limit: 100,
        }
    }
}

impl AppConfig {
    /// Builder seeded with the defaults above
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = Self::default();

        ::config::Config::builder()
            .set_default("backend_url", defaults.backend_url)?
            .set_default("cmc_api_url", defaults.cmc_api_url)?
            .set_default("cmc_api_key", defaults.cmc_api_key)?
            .set_default("rates_url", defaults.rates_url)?
            .set_default("local_currency", defaults.local_currency)?
            .set_default("reload_delay_ms", defaults.reload_delay_ms as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("listing_limit", defaults.listing_limit as i64)
    }

    /// Loads the configuration from `SAXO_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(Environment::with_prefix("SAXO"))
            .build()?
            .try_deserialize()
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Joins a path onto the backend base URL
    pub fn backend_endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
