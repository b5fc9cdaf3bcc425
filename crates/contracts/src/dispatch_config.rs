//! Dispatch session configuration contracts shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default collection deadline (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Dispatch session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Collection deadline, measured once from session start
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of concurrently open fetches (None = unbounded)
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// What happens to unfinished workers once the deadline fires
    #[serde(default)]
    pub on_timeout: TimeoutPolicy,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_in_flight: None,
            on_timeout: TimeoutPolicy::default(),
        }
    }
}

impl DispatchConfig {
    /// Create a config with the given deadline and default options
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout_ms: timeout.as_millis() as u64,
            ..Self::default()
        }
    }

    /// Collection deadline as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Set the concurrency cap
    pub fn max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    /// Set the timeout policy
    pub fn on_timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }
}

/// Fate of workers still running when the collection deadline fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Stop waiting only; workers keep running and their results are dropped
    #[default]
    Detach,
    /// Signal cancellation and abort every unfinished worker
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_unbounded_and_detached() {
        let config = DispatchConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(1));
        assert_eq!(config.max_in_flight, None);
        assert_eq!(config.on_timeout, TimeoutPolicy::Detach);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{ "on_timeout": "cancel", "max_in_flight": 4 }"#).unwrap();
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.max_in_flight, Some(4));
        assert_eq!(config.on_timeout, TimeoutPolicy::Cancel);
    }
}
