//! Quote cache models
//!
//! This module contains the core data types for quote fetching:
//! - `types` - Type aliases for common identifiers (AssetId, ReferenceCurrencyId)
//! - `quote` - The quote payload and the fields that can be requested (Quote, Field)
//! - `entry` - A timestamped cached quote (QuoteEntry)
//! - `request` - Fetch request and response shapes (FetchRequest, FetchResponse)

mod entry;
mod quote;
mod request;
mod types;

pub use entry::QuoteEntry;
pub use quote::{Field, ParseFieldError, Quote};
pub use request::{FetchRequest, FetchResponse};
pub use types::{AssetId, ReferenceCurrencyId};
