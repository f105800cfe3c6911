// Configuration Management Module
// Handles marketplace.toml loading, environment overrides, defaults, and validation

use crate::network::NetworkConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Main marketplace configuration shared by all four services
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Bind addresses, one per service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_customer_db_bind")]
    pub customer_db_bind: String,

    #[serde(default = "default_product_db_bind")]
    pub product_db_bind: String,

    #[serde(default = "default_seller_server_bind")]
    pub seller_server_bind: String,

    #[serde(default = "default_buyer_server_bind")]
    pub buyer_server_bind: String,
}

/// Where the frontends (and the Product DB's feedback relay) find the backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_customer_db_bind")]
    pub customer_db_addr: String,

    #[serde(default = "default_product_db_bind")]
    pub product_db_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session expires
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,

    /// How often the expiry sweep runs
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// How long an expired session id keeps answering SessionExpired
    #[serde(default = "default_tombstone_retention")]
    pub tombstone_retention_secs: u64,
}

// Default value functions
fn default_customer_db_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_product_db_bind() -> String { "127.0.0.1:8081".to_string() }
fn default_seller_server_bind() -> String { "127.0.0.1:8082".to_string() }
fn default_buyer_server_bind() -> String { "127.0.0.1:8083".to_string() }
fn default_session_timeout() -> u64 { 300 }
fn default_sweep_interval() -> u64 { 5 }
fn default_tombstone_retention() -> u64 { 3600 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            customer_db_bind: default_customer_db_bind(),
            product_db_bind: default_product_db_bind(),
            seller_server_bind: default_seller_server_bind(),
            buyer_server_bind: default_buyer_server_bind(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            customer_db_addr: default_customer_db_bind(),
            product_db_addr: default_product_db_bind(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_session_timeout(),
            sweep_interval_secs: default_sweep_interval(),
            tombstone_retention_secs: default_tombstone_retention(),
        }
    }
}

impl SessionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn tombstone_retention(&self) -> Duration {
        Duration::from_secs(self.tombstone_retention_secs)
    }
}

impl MarketConfig {
    /// Load configuration from file (or defaults), then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let contents = std::fs::read_to_string(path)
                .context("Failed to read configuration file")?;

            let config: MarketConfig = toml::from_str(&contents)
                .context("Failed to parse configuration file")?;

            Ok(config)
        } else {
            warn!("Configuration file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Override fields from environment-style variables.
    /// `lookup` returns the value of a variable if it is set.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strings: [(&str, &mut String); 6] = [
            ("CUSTOMER_DB_BIND_ADDR", &mut self.server.customer_db_bind),
            ("PRODUCT_DB_BIND_ADDR", &mut self.server.product_db_bind),
            ("SELLER_SERVER_BIND_ADDR", &mut self.server.seller_server_bind),
            ("BUYER_SERVER_BIND_ADDR", &mut self.server.buyer_server_bind),
            ("CUSTOMER_DB_ADDR", &mut self.upstream.customer_db_addr),
            ("PRODUCT_DB_ADDR", &mut self.upstream.product_db_addr),
        ];
        for (key, field) in strings {
            if let Some(value) = lookup(key) {
                info!("{key} set, overriding configuration");
                *field = value;
            }
        }

        let numbers: [(&str, &mut u64); 2] = [
            ("SESSION_TIMEOUT_SECS", &mut self.sessions.timeout_secs),
            ("SESSION_SWEEP_INTERVAL_SECS", &mut self.sessions.sweep_interval_secs),
        ];
        for (key, field) in numbers {
            if let Some(value) = lookup(key) {
                *field = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {key} value: {value}"))?;
            }
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, addr) in [
            ("server.customer_db_bind", &self.server.customer_db_bind),
            ("server.product_db_bind", &self.server.product_db_bind),
            ("server.seller_server_bind", &self.server.seller_server_bind),
            ("server.buyer_server_bind", &self.server.buyer_server_bind),
        ] {
            addr.parse::<SocketAddr>()
                .with_context(|| format!("{name} is not a socket address: {addr}"))?;
        }

        if self.upstream.customer_db_addr.trim().is_empty() {
            anyhow::bail!("upstream.customer_db_addr cannot be empty");
        }

        if self.upstream.product_db_addr.trim().is_empty() {
            anyhow::bail!("upstream.product_db_addr cannot be empty");
        }

        if self.sessions.timeout_secs == 0 {
            anyhow::bail!("Session timeout must be at least 1 second");
        }

        if self.sessions.sweep_interval_secs == 0 {
            anyhow::bail!("Sweep interval must be at least 1 second");
        }

        if self.sessions.sweep_interval_secs > self.sessions.timeout_secs {
            anyhow::bail!("Sweep interval cannot exceed the session timeout");
        }

        if self.network.max_line_length == 0 {
            anyhow::bail!("Maximum line length cannot be 0");
        }

        Ok(())
    }
}

/// Parse a bind address, naming the offending value on failure
pub fn parse_bind_addr(addr: &str) -> Result<SocketAddr> {
    addr.parse()
        .with_context(|| format!("Invalid bind address: {addr}"))
}
