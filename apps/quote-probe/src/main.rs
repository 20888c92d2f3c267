//! Quote probe binary.
//!
//! Run with:
//! ```bash
//! quote-probe --base-url https://quotes.example.com/v1 usd ethereum,bitcoin --repeat 3
//! ```
//!
//! Later repeats inside the freshness window are answered from the cache.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quote_cache::{
    CacheStore, Field, FetcherConfig, HttpProviderConfig, HttpQuoteProvider, QuoteFetcher,
    RateLimitConfig, RateLimitedProvider, RetryPolicy, RetryingProvider,
};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "quote-probe")]
#[command(about = "Fetch quotes through the quote cache")]
struct Args {
    /// Reference currency id (e.g. usd)
    currency: String,

    /// Comma-separated asset ids, in request order
    #[arg(value_delimiter = ',')]
    assets: Vec<String>,

    /// Comma-separated fields to request
    #[arg(short, long, value_delimiter = ',', default_value = "price")]
    fields: Vec<Field>,

    /// Base URL of the quotes API
    #[arg(long, env = "QC_API_BASE_URL")]
    base_url: String,

    /// API key sent with every request
    #[arg(long, env = "QC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "QC_HTTP_TIMEOUT_MS", default_value_t = 30_000)]
    http_timeout_ms: u64,

    /// Upstream requests allowed per minute
    #[arg(long, env = "QC_REQUESTS_PER_MINUTE", default_value_t = 60)]
    requests_per_minute: u32,

    /// Attempts per upstream call for transient failures
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Number of times to run the fetch
    #[arg(short, long, default_value_t = 1)]
    repeat: u32,

    /// Pause between repeats in milliseconds
    #[arg(long, default_value_t = 1_000)]
    interval_ms: u64,
}

fn init_tracing() {
    let log_format = std::env::var("QC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn build_fetcher(args: &Args) -> QuoteFetcher {
    let mut http_config = HttpProviderConfig::new(&args.base_url)
        .with_request_timeout(Duration::from_millis(args.http_timeout_ms));
    if let Some(api_key) = &args.api_key {
        http_config = http_config.with_api_key(api_key);
    }

    let provider = RetryingProvider::new(
        RateLimitedProvider::new(
            HttpQuoteProvider::new(http_config),
            RateLimitConfig {
                requests_per_minute: args.requests_per_minute,
                ..Default::default()
            },
        ),
        RetryPolicy {
            max_attempts: args.max_attempts.max(1),
            ..Default::default()
        },
    );

    QuoteFetcher::with_config(
        Arc::new(provider),
        Arc::new(CacheStore::new()),
        FetcherConfig::from_env(),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    let fetcher = build_fetcher(&args);

    info!(
        "Fetching {} asset(s) in '{}' (freshness window {:?})",
        args.assets.len(),
        args.currency,
        fetcher.config().freshness_window
    );

    for run in 1..=args.repeat.max(1) {
        if run > 1 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }

        let response = fetcher
            .fetch(&args.currency, &args.assets, &args.fields)
            .await
            .with_context(|| format!("prices unavailable for '{}'", args.currency))?;

        info!("Run {}: {} quote(s)", run, response.len());
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    Ok(())
}
