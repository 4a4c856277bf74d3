//! Settings for the arena's HTTP server.

use std::time::{Duration, Instant};

/// Default port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8787;

/// How often finished conversations past their TTL are dropped from memory.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Browser origins allowed to drive conversations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsPolicy {
    #[default]
    Any,
    Allow(Vec<String>),
}

impl CorsPolicy {
    /// No origins, or a `*` among them, means any origin.
    pub fn from_origins(origins: Vec<String>) -> Self {
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            Self::Any
        } else {
            Self::Allow(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsPolicy,
    /// Period of the registry eviction sweep. `None` disables it.
    pub sweep_interval: Option<Duration>,
    started: Instant,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            cors: CorsPolicy::Any,
            sweep_interval: Some(DEFAULT_SWEEP_INTERVAL),
            started: Instant::now(),
        }
    }

    pub fn with_cors(mut self, cors: CorsPolicy) -> Self {
        self.cors = cors;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.sweep_interval = interval.filter(|d| !d.is_zero());
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Seconds since the config was built, which is server start.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8787");
        assert_eq!(config.cors, CorsPolicy::Any);
        assert_eq!(config.sweep_interval, Some(DEFAULT_SWEEP_INTERVAL));
    }

    #[test]
    fn test_cors_policy_from_origins() {
        assert_eq!(CorsPolicy::from_origins(vec![]), CorsPolicy::Any);
        assert_eq!(
            CorsPolicy::from_origins(vec!["http://a.test".into(), "*".into()]),
            CorsPolicy::Any
        );
        assert_eq!(
            CorsPolicy::from_origins(vec!["http://localhost:5173".into()]),
            CorsPolicy::Allow(vec!["http://localhost:5173".into()])
        );
    }

    #[test]
    fn test_zero_sweep_interval_disables_sweep() {
        let config = ApiConfig::new("0.0.0.0", 3000).with_sweep_interval(Some(Duration::ZERO));
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.sweep_interval.is_none());
    }
}
