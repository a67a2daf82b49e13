//! Storefront configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cap on concurrently stored sessions
pub const DEFAULT_MAX_SESSIONS: usize = 100_000;

/// Storefront service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Session lifecycle configuration
    pub sessions: SessionSettings,
    /// Catalog configuration
    pub catalog: CatalogSettings,
    /// Contact relay configuration
    pub contact: ContactSettings,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            sessions: SessionSettings::default(),
            catalog: CatalogSettings::default(),
            contact: ContactSettings::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Platform PORT wins over the default, ATELIER_PORT wins over both
        if let Some(port) = env_parse("PORT") {
            cfg.port = port;
        }
        if let Ok(host) = std::env::var("ATELIER_HOST") {
            cfg.host = host;
        }
        if let Some(port) = env_parse("ATELIER_PORT") {
            cfg.port = port;
        }

        // Session settings
        if let Some(v) = env_parse("ATELIER_SESSION_MAX_AGE_SECS") {
            cfg.sessions.max_age_secs = v;
        }
        if let Some(v) = env_parse("ATELIER_SESSION_SWEEP_INTERVAL_SECS") {
            cfg.sessions.sweep_interval_secs = v;
        }
        if let Some(v) = env_parse("ATELIER_MAX_SESSIONS") {
            cfg.sessions.max_sessions = v;
        }

        // Catalog settings
        if let Some(v) = env_parse("ATELIER_RECOMMENDATION_LIMIT") {
            cfg.catalog.default_recommendation_limit = v;
        }

        // Contact settings
        if let Some(v) = env_parse("ATELIER_CONTACT_RATE_LIMIT_MAX") {
            cfg.contact.rate_limit_max = v;
        }
        if let Some(v) = env_parse("ATELIER_CONTACT_RATE_LIMIT_WINDOW_SECS") {
            cfg.contact.rate_limit_window_secs = v;
        }
        if let Ok(url) = std::env::var("ATELIER_CONTACT_WEBHOOK_URL") {
            if !url.trim().is_empty() {
                cfg.contact.webhook_url = Some(url);
            }
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the background tasks cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sessions.sweep_interval_secs == 0 {
            bail!("ATELIER_SESSION_SWEEP_INTERVAL_SECS must be greater than zero");
        }
        if self.sessions.max_sessions == 0 {
            bail!("ATELIER_MAX_SESSIONS must be greater than zero");
        }
        if self.contact.rate_limit_window_secs == 0 {
            bail!("ATELIER_CONTACT_RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Session lifecycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Idle age after which a session is swept
    pub max_age_secs: u64,
    /// Interval between sweeps
    pub sweep_interval_secs: u64,
    /// Maximum number of stored sessions
    pub max_sessions: usize,
}

impl SessionSettings {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_age_secs: atelier_common::SESSION_MAX_AGE_SECS,
            sweep_interval_secs: atelier_common::SESSION_SWEEP_INTERVAL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Recommendations returned when the caller gives no limit
    pub default_recommendation_limit: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_recommendation_limit: atelier_common::DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

/// Contact form relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSettings {
    /// Submissions allowed per client within one window
    pub rate_limit_max: u32,
    /// Rate limit window length
    pub rate_limit_window_secs: u64,
    /// Optional webhook receiving accepted submissions
    pub webhook_url: Option<String>,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            rate_limit_max: 5,
            rate_limit_window_secs: 60,
            webhook_url: None,
        }
    }
}
