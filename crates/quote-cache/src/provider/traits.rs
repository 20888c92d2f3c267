//! Upstream quote provider trait definition.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{AssetId, Field, Quote};

/// Source of authoritative quote values.
///
/// The fetch engine calls this only for assets it cannot serve from cache.
/// Implementations should be idempotent; the engine never retries, so any
/// retry policy belongs in the implementation or in a wrapper such as
/// [`RetryingProvider`](super::RetryingProvider).
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quote_cache::provider::QuoteProvider;
///
/// struct FixedPriceProvider;
///
/// #[async_trait]
/// impl QuoteProvider for FixedPriceProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn get_quotes(
///         &self,
///         _reference_currency_id: &str,
///         asset_ids: &[AssetId],
///         _fields: &[Field],
///     ) -> Result<HashMap<AssetId, Quote>, ProviderError> {
///         Ok(asset_ids
///             .iter()
///             .map(|id| (id.clone(), Quote::with_price(dec!(1))))
///             .collect())
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used in logs and error messages.
    fn id(&self) -> &'static str;

    /// Fetch quotes for `asset_ids` expressed in `reference_currency_id`.
    ///
    /// # Arguments
    ///
    /// * `reference_currency_id` - Currency the values are expressed in (e.g., "usd")
    /// * `asset_ids` - Assets to price, in the order they should be requested
    /// * `fields` - Metrics to include in each quote
    ///
    /// # Returns
    ///
    /// The quotes the provider knows about. Assets the provider cannot price
    /// may be missing from the map.
    async fn get_quotes(
        &self,
        reference_currency_id: &str,
        asset_ids: &[AssetId],
        fields: &[Field],
    ) -> Result<HashMap<AssetId, Quote>, ProviderError>;
}
