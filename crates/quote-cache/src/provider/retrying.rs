//! Retry with exponential backoff around an upstream provider.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};

use super::QuoteProvider;
use crate::errors::{ProviderError, RetryClass};
use crate::models::{AssetId, Field, Quote};

/// Retry settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every further attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Repeats calls that failed with a [`RetryClass::WithBackoff`] error.
///
/// Errors classified [`RetryClass::Never`] are returned immediately. When
/// attempts run out the last error is returned.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: QuoteProvider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for RetryingProvider<P> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn get_quotes(
        &self,
        reference_currency_id: &str,
        asset_ids: &[AssetId],
        fields: &[Field],
    ) -> Result<HashMap<AssetId, Quote>, ProviderError> {
        let mut attempt = 1;
        loop {
            let error = match self
                .inner
                .get_quotes(reference_currency_id, asset_ids, fields)
                .await
            {
                Ok(quotes) => return Ok(quotes),
                Err(e) => e,
            };

            if error.retry_class() == RetryClass::Never || attempt >= self.policy.max_attempts {
                warn!(
                    "Provider '{}' failed after {} attempt(s): {}",
                    self.inner.id(),
                    attempt,
                    error
                );
                return Err(error);
            }

            let backoff = self.policy.backoff_after(attempt);
            info!(
                "Provider '{}' failed with {}, retrying in {:?} ({}/{})",
                self.inner.id(),
                error,
                backoff,
                attempt,
                self.policy.max_attempts
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }
}
