//! Token bucket throttling in front of an upstream provider.
//!
//! The bucket holds up to `burst_capacity` tokens and refills at
//! `requests_per_minute / 60` tokens per second. Every upstream call takes one
//! token, waiting asynchronously when the bucket is empty.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};

use super::QuoteProvider;
use crate::errors::ProviderError;
use crate::models::{AssetId, Field, Quote};

/// Default rate limit: 60 requests per minute.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Default bucket capacity (allows bursting).
const DEFAULT_BURST_CAPACITY: f64 = 10.0;

/// Rate limit settings for a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimitConfig {
    /// Sustained requests per minute.
    pub requests_per_minute: u32,
    /// Requests that may be issued back to back from a full bucket.
    pub burst_capacity: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            burst_capacity: DEFAULT_BURST_CAPACITY,
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let capacity = bucket_capacity(config.burst_capacity);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: f64::from(config.requests_per_minute.max(1)) / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    /// Take a token, or report how long until one is available.
    fn take(&mut self) -> Result<(), Duration> {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / self.rate))
        }
    }
}

/// A bucket must hold at least one whole token or no call ever passes.
fn bucket_capacity(burst_capacity: f64) -> f64 {
    if !burst_capacity.is_finite() {
        warn!(
            "Rate limiter: invalid burst capacity {}, using {}",
            burst_capacity, DEFAULT_BURST_CAPACITY
        );
        return DEFAULT_BURST_CAPACITY;
    }
    if burst_capacity < 1.0 {
        warn!(
            "Rate limiter: burst capacity {} is below 1, using 1",
            burst_capacity
        );
        return 1.0;
    }
    burst_capacity
}

/// Wraps a provider so that calls never exceed a configured rate.
pub struct RateLimitedProvider<P> {
    inner: P,
    bucket: Mutex<TokenBucket>,
}

impl<P: QuoteProvider> RateLimitedProvider<P> {
    pub fn new(inner: P, config: RateLimitConfig) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(&config)),
            inner,
        }
    }

    /// Lock the bucket, recovering from poison if necessary.
    ///
    /// The worst case after recovery is a slightly wrong token count.
    fn lock_bucket(&self) -> MutexGuard<'_, TokenBucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Try to take a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.lock_bucket().take().is_ok()
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            // Guard is dropped before sleeping
            let wait = match self.lock_bucket().take() {
                Ok(()) => return,
                Err(wait) => wait,
            };

            debug!(
                "Rate limiter: waiting {:?} before calling '{}'",
                wait,
                self.inner.id()
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for RateLimitedProvider<P> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn get_quotes(
        &self,
        reference_currency_id: &str,
        asset_ids: &[AssetId],
        fields: &[Field],
    ) -> Result<HashMap<AssetId, Quote>, ProviderError> {
        self.acquire().await;
        self.inner
            .get_quotes(reference_currency_id, asset_ids, fields)
            .await
    }
}
