//! In-memory quote storage.
//!
//! - [`CacheStore`] maps a reference currency to its [`Partition`]
//! - [`Partition`] holds one [`QuoteEntry`](crate::models::QuoteEntry) per asset behind a lock

mod partition;
mod store;

pub use partition::{Partition, PartitionEntries, Resolution};
pub use store::CacheStore;
