//! Startup configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".cm-data";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;
const MAX_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    /// Shared secret expected from the OAuth proxy. `None` disables sign-in.
    pub callback_secret: Option<String>,
    pub seed_demo: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let data_dir = value("CM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let bind_addr = value("CM_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                name: "CM_BIND_ADDR",
                reason: err.to_string(),
            })?;

        let jwt_secret = value("CM_JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("CM_JWT_SECRET not set, using the development secret");
            DEFAULT_JWT_SECRET.to_string()
        });

        let token_ttl_seconds = match value("CM_TOKEN_TTL_SECONDS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| (1..=MAX_TOKEN_TTL_SECONDS).contains(ttl))
                .ok_or_else(|| ConfigError::Invalid {
                    name: "CM_TOKEN_TTL_SECONDS",
                    reason: format!(
                        "'{}' is not a number of seconds between 1 and {}",
                        raw, MAX_TOKEN_TTL_SECONDS
                    ),
                })?,
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let seed_demo = match value("CM_SEED_DEMO") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "CM_SEED_DEMO",
                reason: format!("'{}' is not a boolean", raw),
            })?,
            None => false,
        };

        Ok(Self {
            data_dir,
            bind_addr,
            jwt_secret,
            token_ttl_seconds,
            callback_secret: value("CM_AUTH_CALLBACK_SECRET"),
            seed_demo,
        })
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join("accounts.json")
    }

    pub fn clients_path(&self) -> PathBuf {
        self.data_dir.join("clients.json")
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
