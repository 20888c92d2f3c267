//! HTTP quotes API provider.
//!
//! Calls a single endpoint:
//!
//! ```text
//! GET {base_url}/quotes?currencyId=usd&coinIds=ethereum,solana&fields=price,priceChange24h
//! ```
//!
//! and expects `{"quotes": {"<asset id>": {"price": .., ...}}}` back.
//! Asset ids and fields are joined with commas in the order given.

mod models;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use self::models::{ErrorBody, QuotesBody};
use crate::errors::ProviderError;
use crate::models::{AssetId, Field, Quote};
use crate::provider::QuoteProvider;

pub const PROVIDER_ID: &str = "QUOTES_API";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "api-key";

/// Connection settings for [`HttpQuoteProvider`].
#[derive(Clone, Debug)]
pub struct HttpProviderConfig {
    /// Base URL of the API, without the `/quotes` suffix
    pub base_url: String,
    /// Sent in the `api-key` header when present
    pub api_key: Option<String>,
    /// Per-request timeout enforced by the HTTP client
    pub request_timeout: Duration,
}

impl HttpProviderConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Quote provider backed by the HTTP quotes API.
pub struct HttpQuoteProvider {
    client: Client,
    config: HttpProviderConfig,
}

impl HttpQuoteProvider {
    pub fn new(config: HttpProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn quotes_url(&self) -> String {
        format!("{}/quotes", self.config.base_url.trim_end_matches('/'))
    }
}

/// Query string for a quotes request, ids and fields joined in the given order.
fn query_params(
    reference_currency_id: &str,
    asset_ids: &[AssetId],
    fields: &[Field],
) -> [(&'static str, String); 3] {
    let fields = fields
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(",");

    [
        ("currencyId", reference_currency_id.to_string()),
        ("coinIds", asset_ids.join(",")),
        ("fields", fields),
    ]
}

/// Translate a non-success status and its body into a provider error.
fn status_error(status: StatusCode, body: &str) -> ProviderError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        };
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("").to_string()
            } else {
                body.trim().to_string()
            }
        });

    ProviderError::Http {
        provider: PROVIDER_ID.to_string(),
        status: status.as_u16(),
        message,
    }
}

fn parse_quotes(body: &str) -> Result<HashMap<AssetId, Quote>, ProviderError> {
    serde_json::from_str::<QuotesBody>(body)
        .map(|b| b.quotes)
        .map_err(|e| {
            ProviderError::Deserialization(format!("Failed to parse quotes response: {}", e))
        })
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quotes(
        &self,
        reference_currency_id: &str,
        asset_ids: &[AssetId],
        fields: &[Field],
    ) -> Result<HashMap<AssetId, Quote>, ProviderError> {
        let params = query_params(reference_currency_id, asset_ids, fields);

        let mut request = self.client.get(self.quotes_url()).query(&params);
        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        debug!(
            "Quotes request: currency={} assets={} fields={}",
            reference_currency_id,
            asset_ids.len(),
            params[2].1
        );

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                ProviderError::Network(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Quotes request failed with HTTP {}", status);
            return Err(status_error(status, &body));
        }

        parse_quotes(&body)
    }
}
