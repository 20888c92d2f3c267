//! Quote fetch orchestration.
//!
//! [`QuoteFetcher`] sits between callers and the upstream
//! [`QuoteProvider`](crate::provider::QuoteProvider):
//!
//! ```text
//! caller -> QuoteFetcher -> (lock partition) -> CacheStore read
//!                                            -> QuoteProvider (missing ids only)
//!                                            -> CacheStore write
//!                           (unlock partition) -> caller
//! ```

mod engine;


pub use engine::QuoteFetcher;
