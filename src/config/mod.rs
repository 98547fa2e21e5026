use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub api_key: String,
    pub webhook_secret: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig {
                api_key: env::var("GATEWAY_API_KEY")
                    .map_err(|_| AppError::Configuration("GATEWAY_API_KEY not set".to_string()))?,
                webhook_secret: env::var("GATEWAY_WEBHOOK_SECRET").map_err(|_| {
                    AppError::Configuration("GATEWAY_WEBHOOK_SECRET not set".to_string())
                })?,
                base_url: env::var("GATEWAY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.hostedcheckout.example".to_string()),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(AppError::Configuration(
                "Database pool size must be greater than 0".to_string(),
            ));
        }

        if self.gateway.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Gateway API key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
