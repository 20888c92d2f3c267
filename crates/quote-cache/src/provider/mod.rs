//! Upstream quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait the fetch engine calls for missing quotes
//! - `HttpQuoteProvider`, a client for the HTTP quotes API
//! - Decorators that add rate limiting and retries to any provider
//!
//! Decorators compose by wrapping:
//!
//! ```text
//! RetryingProvider<RateLimitedProvider<HttpQuoteProvider>>
//! ```

mod rate_limited;
mod retrying;
mod traits;

pub mod http;

pub use http::{HttpProviderConfig, HttpQuoteProvider};
pub use rate_limited::{RateLimitConfig, RateLimitedProvider};
pub use retrying::{RetryPolicy, RetryingProvider};
pub use traits::QuoteProvider;
