//! Tunables for the fetch engine.

use std::time::Duration;

use log::warn;

/// Default freshness window.
///
/// Entries older than this are refetched. Must stay below 10 seconds.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(5);

/// Default upper bound on a single upstream call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`QuoteFetcher`](crate::QuoteFetcher).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Maximum age of an entry that may be served from cache.
    pub freshness_window: Duration,
    /// Upstream calls that take longer fail with a timeout and write nothing.
    pub provider_timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl FetcherConfig {
    /// Read overrides from `QC_FRESHNESS_WINDOW_MS` and `QC_PROVIDER_TIMEOUT_MS`.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            freshness_window: duration_from_env("QC_FRESHNESS_WINDOW_MS")
                .unwrap_or(defaults.freshness_window),
            provider_timeout: duration_from_env("QC_PROVIDER_TIMEOUT_MS")
                .unwrap_or(defaults.provider_timeout),
        }
    }

    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}

/// Parse a millisecond duration from an environment variable.
pub(crate) fn duration_from_env(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    parse_millis(&raw).or_else(|| {
        warn!("Ignoring invalid value for {}: '{}'", key, raw);
        None
    })
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FetcherConfig::default();
        assert_eq!(config.freshness_window, DEFAULT_FRESHNESS_WINDOW);
        assert_eq!(config.provider_timeout, DEFAULT_PROVIDER_TIMEOUT);
        // An entry aged ~10 seconds must be stale under the default window
        assert!(config.freshness_window < Duration::from_secs(10));
    }

    #[test]
    fn test_builder_setters() {
        let config = FetcherConfig::default()
            .with_freshness_window(Duration::from_millis(250))
            .with_provider_timeout(Duration::from_secs(2));
        assert_eq!(config.freshness_window, Duration::from_millis(250));
        assert_eq!(config.provider_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_parse_millis() {
        assert_eq!(parse_millis("1500"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_millis(" 20 "), Some(Duration::from_millis(20)));
        assert_eq!(parse_millis("5s"), None);
        assert_eq!(parse_millis("-1"), None);
    }
}
