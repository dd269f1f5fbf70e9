//! Runtime configuration: API endpoint, demo brokerage, and polling
//! intervals. Defaults are the production values; the environment can
//! override them.

use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Production base URL for the Quovo v2 API.
pub const DEFAULT_BASE_URL: &str = "https://api.quovo.com/v2";

/// Brokerage id of the "Test Data Brokerage", which returns an
/// auto-generated sample Portfolio after a successful Account sync.
pub const TEST_BROKERAGE_ID: u64 = 21534;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How often the sync status endpoint is polled, and how long to cool
/// down when a poll attempt fails mid-sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Steady-state delay between consecutive status polls.
    pub interval: Duration,

    /// Cooldown after a failed poll once polling has begun. Longer than
    /// the steady interval so a struggling backend is not hammered.
    pub error_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            error_backoff: Duration::from_secs(3),
        }
    }
}

/// Runtime configuration for the walkthrough.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the Quovo v2 API.
    pub base_url: Url,

    /// Brokerage id used when creating the demo Account.
    pub brokerage_id: u64,

    /// Per-request HTTP timeout.
    pub timeout: Duration,

    /// Sync polling intervals.
    pub poll: PollPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            brokerage_id: TEST_BROKERAGE_ID,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll: PollPolicy::default(),
        }
    }
}

impl ApiConfig {
    /// Defaults plus `QUOVO_API_URL` / `QUOVO_TEST_BROKERAGE` overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("QUOVO_API_URL") {
            config.base_url =
                Url::parse(&raw).with_context(|| format!("invalid QUOVO_API_URL: {raw}"))?;
        }
        if let Ok(raw) = std::env::var("QUOVO_TEST_BROKERAGE") {
            config.brokerage_id = raw
                .parse()
                .with_context(|| format!("invalid QUOVO_TEST_BROKERAGE: {raw}"))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_production_values() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url.as_str(), "https://api.quovo.com/v2");
        assert_eq!(config.brokerage_id, 21534);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.poll.interval, Duration::from_millis(500));
        assert_eq!(config.poll.error_backoff, Duration::from_secs(3));
    }

    #[test]
    fn environment_overrides_apply() {
        std::env::set_var("QUOVO_TEST_BROKERAGE", "777");
        let config = ApiConfig::from_env().unwrap();
        std::env::remove_var("QUOVO_TEST_BROKERAGE");
        assert_eq!(config.brokerage_id, 777);
    }
}
