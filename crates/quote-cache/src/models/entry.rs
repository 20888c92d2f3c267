use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quote::Quote;
use super::types::AssetId;

/// A cached quote together with the moment it was obtained.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEntry {
    /// The priced asset; unique within a partition
    pub asset_id: AssetId,

    /// When the value was fetched from the provider
    pub fetched_at: DateTime<Utc>,

    /// Opaque quote payload
    pub value: Quote,
}

impl QuoteEntry {
    pub fn new(asset_id: impl Into<AssetId>, fetched_at: DateTime<Utc>, value: Quote) -> Self {
        Self {
            asset_id: asset_id.into(),
            fetched_at,
            value,
        }
    }

    /// Whether this entry may still be served at `now`.
    ///
    /// Fresh iff `now - fetched_at < window`. Entries stamped in the future
    /// count as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: std::time::Duration) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        match age.to_std() {
            Ok(age) => age < window,
            // negative age
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const WINDOW: Duration = Duration::from_secs(5);

    fn entry_aged(now: DateTime<Utc>, age: ChronoDuration) -> QuoteEntry {
        QuoteEntry::new("ethereum", now - age, Quote::with_price(dec!(1)))
    }

    #[test]
    fn test_just_fetched_is_fresh() {
        let now = Utc::now();
        assert!(entry_aged(now, ChronoDuration::zero()).is_fresh(now, WINDOW));
    }

    #[test]
    fn test_ten_seconds_old_is_stale() {
        let now = Utc::now();
        assert!(!entry_aged(now, ChronoDuration::seconds(10)).is_fresh(now, WINDOW));
    }

    #[test]
    fn test_age_equal_to_window_is_stale() {
        let now = Utc::now();
        assert!(!entry_aged(now, ChronoDuration::seconds(5)).is_fresh(now, WINDOW));
        assert!(entry_aged(now, ChronoDuration::milliseconds(4_999)).is_fresh(now, WINDOW));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let now = Utc::now();
        assert!(entry_aged(now, ChronoDuration::seconds(-30)).is_fresh(now, WINDOW));
    }
}
