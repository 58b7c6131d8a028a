use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::HeaderValue;
use ipnet::IpNet;

use crate::store::DEFAULT_RETENTION;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub store: StoreConfig,
    pub submit_delay: Duration,
    pub max_body_size: usize,
    pub trusted_proxies: Vec<IpNet>,
    pub cors_origins: Vec<HeaderValue>,
    pub redirect_url: Option<String>,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
}

/// Which submission store the service writes to.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// Postgres `contact_submissions` table.
    Table { database_url: String },
    /// Bounded JSON journal kept on local disk.
    Journal {
        dir: PathBuf,
        quota_bytes: usize,
        retention: usize,
    },
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("LEADFORM_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEADFORM_HOST: {e}"))?;

        let port: u16 = env_or("LEADFORM_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEADFORM_PORT: {e}"))?;

        let log_level = env_or("LEADFORM_LOG_LEVEL", "info");

        let store = match env_or("LEADFORM_STORE", "journal").as_str() {
            "table" => StoreConfig::Table {
                database_url: env_required("DATABASE_URL")?,
            },
            "journal" => StoreConfig::Journal {
                dir: PathBuf::from(env_or("LEADFORM_JOURNAL_DIR", "./data")),
                quota_bytes: env_or("LEADFORM_JOURNAL_QUOTA", "5242880")
                    .parse()
                    .map_err(|e| format!("Invalid LEADFORM_JOURNAL_QUOTA: {e}"))?,
                retention: env_or("LEADFORM_JOURNAL_RETENTION", &DEFAULT_RETENTION.to_string())
                    .parse()
                    .map_err(|e| format!("Invalid LEADFORM_JOURNAL_RETENTION: {e}"))?,
            },
            other => return Err(format!("Invalid LEADFORM_STORE '{other}': expected 'journal' or 'table'")),
        };

        // Journal writes are local and near-instant; pad them so success is not suspiciously fast.
        let default_delay = match store {
            StoreConfig::Journal { .. } => "500",
            StoreConfig::Table { .. } => "0",
        };
        let submit_delay = env_or("LEADFORM_SUBMIT_DELAY_MS", default_delay)
            .parse()
            .map(Duration::from_millis)
            .map_err(|e| format!("Invalid LEADFORM_SUBMIT_DELAY_MS: {e}"))?;

        let max_body_size: usize = env_or("LEADFORM_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid LEADFORM_MAX_BODY_SIZE: {e}"))?;

        let trusted_proxies: Vec<IpNet> = env_or("LEADFORM_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid LEADFORM_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cors_origins: Vec<HeaderValue> = env_or("LEADFORM_CORS_ORIGINS", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                HeaderValue::from_str(s.trim())
                    .map_err(|e| format!("Invalid LEADFORM_CORS_ORIGINS entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let redirect_url = std::env::var("LEADFORM_REDIRECT_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let rate_limit: u32 = env_or("LEADFORM_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid LEADFORM_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("LEADFORM_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid LEADFORM_RATE_LIMIT_WINDOW_SECS: {e}"))?;

        Ok(Config {
            host,
            port,
            log_level,
            store,
            submit_delay,
            max_body_size,
            trusted_proxies,
            cors_origins,
            redirect_url,
            rate_limit,
            rate_limit_window_secs,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
