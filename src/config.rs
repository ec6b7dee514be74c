//! Configuration management for cf-ddns.

use crate::error::{DdnsError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CF_DDNS_CONFIG";

/// Main configuration structure. Loaded once at startup, never mutated.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// API token (or environment variable name if prefixed with $).
    pub api_token: String,

    /// Zone ID holding every managed record.
    pub zone_id: String,

    /// Check interval in seconds (default: 300 = 5 minutes).
    #[serde(default = "default_interval", alias = "check_interval")]
    pub check_interval_secs: u64,

    /// Address-echo endpoint answering with `{"ip": "..."}`.
    #[serde(default = "default_ip_service")]
    pub ip_service: String,

    /// Base URL of the provider API, up to and including the version segment.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Managed records, reconciled in this order.
    #[serde(default)]
    pub domains: Vec<DomainSpec>,

    /// Log sink settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_interval() -> u64 {
    300
}

fn default_ip_service() -> String {
    "https://api.ipify.org?format=json".to_string()
}

fn default_api_base_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// One managed A record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DomainSpec {
    /// Fully qualified record name (e.g., "vpn.example.com").
    pub record_name: String,
    /// Whether to proxy through Cloudflare (default: false).
    #[serde(default)]
    pub proxied: bool,
}

impl DomainSpec {
    pub fn new(record_name: impl Into<String>, proxied: bool) -> Self {
        Self {
            record_name: record_name.into(),
            proxied,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log file, opened in append mode.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Default level filter; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("cf-ddns.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("ip_service", &self.ip_service)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("domains", &self.domains)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Config {
    /// Find the config file: `$CF_DDNS_CONFIG`, then the usual locations.
    pub fn discover_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let candidates = [
            dirs::config_dir().map(|p| p.join("cf-ddns/config.toml")),
            Some(PathBuf::from("/etc/cf-ddns/config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return candidate;
            }
        }

        PathBuf::from("config.toml")
    }

    /// Load, resolve and validate configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DdnsError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse, resolve and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.api_token = resolve_env(&config.api_token)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the updater cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(DdnsError::Config("api_token is empty".to_string()));
        }
        if self.zone_id.trim().is_empty() {
            return Err(DdnsError::Config("zone_id is empty".to_string()));
        }
        if self.check_interval_secs == 0 {
            return Err(DdnsError::Config(
                "check_interval_secs must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(DdnsError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.domains.is_empty() {
            return Err(DdnsError::Config("no domains configured".to_string()));
        }

        let mut seen = HashSet::new();
        for domain in &self.domains {
            if domain.record_name.trim().is_empty() {
                return Err(DdnsError::Config("empty record_name".to_string()));
            }
            if !seen.insert(domain.record_name.as_str()) {
                return Err(DdnsError::Config(format!(
                    "duplicate record_name {}",
                    domain.record_name
                )));
            }
        }

        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Resolve environment variable references (values starting with $).
///
/// An unset or non-UTF-8 variable is a configuration error.
fn resolve_env(value: &str) -> Result<String> {
    match value.strip_prefix('$') {
        Some(var_name) => std::env::var(var_name).map_err(|e| {
            DdnsError::Config(format!("api_token references ${}: {}", var_name, e))
        }),
        None => Ok(value.to_string()),
    }
}
