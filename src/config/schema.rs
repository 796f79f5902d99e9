//! Configuration schema for issn-probe
//!
//! Configuration is stored at `~/.config/issn-probe/config.toml`

use crate::error::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Desktop browser identity; many journal hosts refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/93.0.4577.82 Safari/537.36";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Landing page fetch settings
    pub fetch: FetchConfig,

    /// Content matching settings
    pub matcher: MatcherConfig,

    /// Page cache settings
    pub cache: CacheConfig,

    /// ISSN registry lookup settings
    pub registry: RegistryConfig,
}

impl Config {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.fetch.concurrency == 0 {
            return Err(ProbeError::config_value(
                "fetch.concurrency",
                "must be at least 1",
            ));
        }
        if self.fetch.max_attempts == 0 {
            return Err(ProbeError::config_value(
                "fetch.max_attempts",
                "must be at least 1",
            ));
        }
        if self.registry.max_attempts == 0 {
            return Err(ProbeError::config_value(
                "registry.max_attempts",
                "must be at least 1",
            ));
        }
        if self.fetch.jitter_min_ms > self.fetch.jitter_max_ms {
            return Err(ProbeError::config_value(
                "fetch.jitter_min_ms",
                "must not exceed fetch.jitter_max_ms",
            ));
        }
        if self.fetch.backoff_multiplier < 1.0 || self.registry.backoff_multiplier < 1.0 {
            return Err(ProbeError::config_value(
                "backoff_multiplier",
                "must be >= 1.0",
            ));
        }
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(ProbeError::config_value(
                "general.log_format",
                "must be \"text\" or \"json\"",
            ));
        }
        if self.fetch.retryable_statuses.contains(&self.fetch.ban_status) {
            return Err(ProbeError::config_value(
                "fetch.ban_status",
                "must not also be a retryable status",
            ));
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Landing page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Number of concurrent workers (bounds in-flight requests)
    pub concurrency: usize,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Attempts per target, including the first
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    pub backoff_base_ms: u64,

    /// Growth factor applied per retry
    pub backoff_multiplier: f64,

    /// Upper bound for a single backoff delay, in milliseconds
    pub max_backoff_ms: u64,

    /// Lower bound of the random pause before each network request
    pub jitter_min_ms: u64,

    /// Upper bound of the random pause before each network request
    pub jitter_max_ms: u64,

    /// Statuses that are retried with backoff
    pub retryable_statuses: Vec<u16>,

    /// Status that means the remote side has blocked us; halts the run
    pub ban_status: u16,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Skip TLS certificate verification.
    ///
    /// Many journal hosts serve expired or self-signed certificates. The
    /// fetched pages are only scanned for ISSNs, so availability wins over
    /// integrity here. A warning is logged whenever this is enabled.
    pub accept_invalid_certs: bool,

    /// Shuffle targets before dispatch to spread load across hosts
    pub shuffle: bool,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout_secs: 10,
            max_attempts: 3,
            backoff_base_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 30_000,
            jitter_min_ms: 100,
            jitter_max_ms: 500,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            ban_status: 403,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
            shuffle: true,
        }
    }
}

/// Content matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Substring identifying the publishing platform
    pub platform_signature: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            platform_signature: "Open Journal Systems".to_string(),
        }
    }
}

/// Page cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (defaults to the platform cache dir)
    pub dir: Option<PathBuf>,
}

/// ISSN registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry base URL
    pub base_url: String,

    /// Attempts per ISSN, including the first
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    pub backoff_base_ms: u64,

    /// Growth factor applied per retry
    pub backoff_multiplier: f64,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Status that means the registry has blocked us
    pub ban_status: u16,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://portal.issn.org".to_string(),
            max_attempts: 7,
            backoff_base_ms: 1_000,
            backoff_multiplier: 2.0,
            timeout_secs: 30,
            ban_status: 403,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[fetch]"));
        assert!(toml.contains("[registry]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.fetch.ban_status, 403);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [fetch]
            concurrency = 2
            retryable_statuses = [503]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fetch.concurrency, 2);
        assert_eq!(config.fetch.retryable_statuses, vec![503]);
        assert_eq!(config.fetch.timeout_secs, 10); // default preserved
        assert_eq!(config.matcher.platform_signature, "Open Journal Systems");
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.fetch.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_jitter() {
        let mut config = Config::default();
        config.fetch.jitter_min_ms = 600;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_retryable_ban_status() {
        let mut config = Config::default();
        config.fetch.ban_status = 503;
        assert!(config.validate().is_err());
    }
}
