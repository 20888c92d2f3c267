//! Quote Cache Crate
//!
//! This crate answers "give me current market data for these assets in this
//! reference currency" while keeping upstream calls to a minimum.
//!
//! # Overview
//!
//! - Memory-resident cache partitioned by reference currency
//! - Time-based freshness: stale entries are refetched, never served
//! - Partial hits: only absent or stale assets are requested upstream
//! - Per-partition locking: concurrent requests for one reference currency
//!   run in order and reuse each other's results, other currencies run in parallel
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |      Caller      |
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   QuoteFetcher   | --> |    CacheStore    |  (reference currency -> Partition)
//! +------------------+     +------------------+
//!          |                        |
//!          | missing ids only       v
//!          v               +------------------+
//! +------------------+     |    Partition     |  (lock + one QuoteEntry per asset)
//! |  QuoteProvider   |     +------------------+
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteFetcher`] - Validates requests, resolves against the cache, calls the provider
//! - [`CacheStore`] - Injectable store of [`Partition`]s
//! - [`QuoteEntry`] - A cached [`Quote`] with its fetch time
//! - [`QuoteProvider`] - Upstream source of quotes
//! - [`FetcherConfig`] - Freshness window and provider timeout

pub mod cache;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod provider;

pub use cache::{CacheStore, Partition, PartitionEntries, Resolution};
pub use config::{FetcherConfig, DEFAULT_FRESHNESS_WINDOW, DEFAULT_PROVIDER_TIMEOUT};
pub use errors::{ProviderError, QuoteFetchError, RetryClass};
pub use fetcher::QuoteFetcher;
pub use models::{
    AssetId, FetchRequest, FetchResponse, Field, ParseFieldError, Quote, QuoteEntry,
    ReferenceCurrencyId,
};
pub use provider::{
    HttpProviderConfig, HttpQuoteProvider, QuoteProvider, RateLimitConfig, RateLimitedProvider,
    RetryPolicy, RetryingProvider,
};
