use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_TITLE_LOOKUP_ENDPOINT, DEFAULT_TITLE_LOOKUP_TIMEOUT_SECS,
};

/// Where records are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Embedded redb file
    Local { path: String },
    /// Hosted JSON tree reached over REST
    Remote {
        url: String,
        auth_token: Option<String>,
    },
}

/// Inline JSON credentials for the hosted store
#[derive(Debug, Deserialize)]
struct StoreCredentials {
    #[serde(rename = "authToken", alias = "databaseSecret")]
    auth_token: Option<String>,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    pub store_backend: StoreBackend,
    pub title_lookup_endpoint: String,
    pub title_lookup_timeout_secs: u64,
    pub bcrypt_cost: u32,
    pub log_requests: bool,
}

fn parse_var<T: std::str::FromStr>(
    value: Option<String>,
    default: T,
    name: &str,
) -> Result<T, String> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| format!("Invalid {}", name)),
        None => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build configuration from any variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = parse_var(
            var("SERVER_PORT").or_else(|| var("PORT")),
            8080u16,
            "SERVER_PORT",
        )?;

        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let store_backend = match var("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                let inline_token = match var("DATABASE_CREDENTIALS") {
                    Some(raw) => {
                        serde_json::from_str::<StoreCredentials>(&raw)
                            .map_err(|e| format!("Invalid DATABASE_CREDENTIALS: {}", e))?
                            .auth_token
                    }
                    None => None,
                };
                StoreBackend::Remote {
                    url: url.trim().to_string(),
                    auth_token: var("DATABASE_AUTH_TOKEN").or(inline_token),
                }
            }
            None => StoreBackend::Local {
                path: var("DATABASE_PATH").unwrap_or_else(|| "./data/hotcues.db".to_string()),
            },
        };

        let title_lookup_endpoint = var("TITLE_LOOKUP_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_TITLE_LOOKUP_ENDPOINT.to_string());

        let title_lookup_timeout_secs = parse_var(
            var("TITLE_LOOKUP_TIMEOUT_SECS"),
            DEFAULT_TITLE_LOOKUP_TIMEOUT_SECS,
            "TITLE_LOOKUP_TIMEOUT_SECS",
        )?;

        let bcrypt_cost = parse_var(var("BCRYPT_COST"), DEFAULT_BCRYPT_COST, "BCRYPT_COST")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err("Invalid BCRYPT_COST: must be between 4 and 31".to_string());
        }

        let log_requests = parse_var(var("LOG_REQUESTS"), false, "LOG_REQUESTS")?;

        Ok(Config {
            server_host,
            server_port,
            environment,
            allowed_origins,
            store_backend,
            title_lookup_endpoint,
            title_lookup_timeout_secs,
            bcrypt_cost,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
