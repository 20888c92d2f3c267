//! Fetch engine: serves fresh quotes from cache and fetches the rest.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};

use crate::cache::{CacheStore, Resolution};
use crate::config::FetcherConfig;
use crate::errors::{ProviderError, QuoteFetchError};
use crate::models::{AssetId, FetchRequest, FetchResponse, Field, QuoteEntry};
use crate::provider::QuoteProvider;

/// Answers quote requests from the cache, calling the provider only for
/// assets that are absent or stale.
///
/// Requests for the same reference currency run one at a time, so a request
/// that arrives while another is fetching waits for it and then reuses what
/// it cached. Requests for different reference currencies run in parallel.
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<CacheStore>,
    config: FetcherConfig,
}

impl QuoteFetcher {
    /// Create a fetcher with the default configuration.
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<CacheStore>) -> Self {
        Self::with_config(provider, store, FetcherConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn QuoteProvider>,
        store: Arc<CacheStore>,
        config: FetcherConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Drop all cached quotes.
    pub fn clear_cache(&self) {
        self.store.clear();
    }

    pub async fn fetch_request(
        &self,
        request: &FetchRequest,
    ) -> Result<FetchResponse, QuoteFetchError> {
        self.fetch(
            &request.reference_currency_id,
            &request.asset_ids,
            &request.fields,
        )
        .await
    }

    /// Fetch quotes for `asset_ids` in `reference_currency_id`.
    ///
    /// Validation happens before anything else: an empty reference currency
    /// or an empty field list is rejected with
    /// [`QuoteFetchError::InvalidArguments`], and an empty asset list yields an
    /// empty response. Neither touches the cache or the provider.
    ///
    /// Otherwise, with the partition for `reference_currency_id` locked:
    ///
    /// 1. Split `asset_ids` into fresh cache hits and missing ids (absent or stale)
    /// 2. If nothing is missing, answer from the cache
    /// 3. Request the missing ids from the provider, in caller order
    /// 4. Cache every returned quote and answer with cache hits plus fetched quotes
    ///
    /// If the cache is cleared while the provider call is in flight, the
    /// fetched quotes are returned but not cached.
    ///
    /// A provider failure or timeout is returned as
    /// [`QuoteFetchError::UpstreamFailure`] and leaves the cache untouched. Stale
    /// entries are never served in its place. Requested ids the provider did
    /// not return are absent from the response.
    pub async fn fetch(
        &self,
        reference_currency_id: &str,
        asset_ids: &[AssetId],
        fields: &[Field],
    ) -> Result<FetchResponse, QuoteFetchError> {
        if reference_currency_id.is_empty() {
            return Err(QuoteFetchError::InvalidArguments(
                "reference currency id is empty",
            ));
        }
        if fields.is_empty() {
            return Err(QuoteFetchError::InvalidArguments("fields are empty"));
        }
        if asset_ids.is_empty() {
            return Ok(FetchResponse::empty());
        }

        let mut entries = self.store.lock_partition(reference_currency_id).await;

        let Resolution { mut fresh, missing } =
            entries.resolve(asset_ids, Utc::now(), self.config.freshness_window);

        if missing.is_empty() {
            debug!(
                "Quote cache hit for all {} asset(s) in '{}'",
                fresh.len(),
                reference_currency_id
            );
            return Ok(fresh.into());
        }

        info!(
            "Fetching {} quote(s) in '{}' from '{}' ({} served from cache)",
            missing.len(),
            reference_currency_id,
            self.provider.id(),
            fresh.len()
        );

        let fields = distinct(fields);
        let call = self
            .provider
            .get_quotes(reference_currency_id, &missing, &fields);

        let fetched = match tokio::time::timeout(self.config.provider_timeout, call).await {
            Ok(Ok(quotes)) => quotes,
            Ok(Err(e)) => {
                warn!(
                    "Provider '{}' failed for '{}': {}",
                    self.provider.id(),
                    reference_currency_id,
                    e
                );
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    "Provider '{}' timed out after {:?} for '{}'",
                    self.provider.id(),
                    self.config.provider_timeout,
                    reference_currency_id
                );
                return Err(ProviderError::Timeout {
                    provider: self.provider.id().to_string(),
                }
                .into());
            }
        };

        let fetched_at = Utc::now();
        let requested: HashSet<&str> = asset_ids.iter().map(String::as_str).collect();
        let write = self.store.is_current(&entries);
        if !write {
            debug!(
                "Quote cache cleared while fetching '{}', not caching {} quote(s)",
                reference_currency_id,
                fetched.len()
            );
        }

        for (asset_id, value) in fetched {
            if requested.contains(asset_id.as_str()) {
                fresh.insert(asset_id.clone(), value.clone());
            }
            if write {
                entries.upsert(QuoteEntry::new(asset_id, fetched_at, value));
            }
        }

        let unresolved = missing
            .iter()
            .filter(|id| !fresh.contains_key(id.as_str()))
            .count();
        if unresolved > 0 {
            debug!(
                "Provider '{}' returned no quote for {} asset(s) in '{}'",
                self.provider.id(),
                unresolved,
                reference_currency_id
            );
        }

        Ok(fresh.into())
    }
}

/// Fields with repeats removed, first occurrence kept.
fn distinct(fields: &[Field]) -> Vec<Field> {
    let mut seen = HashSet::with_capacity(fields.len());
    fields.iter().copied().filter(|f| seen.insert(*f)).collect()
}
