//! Property-based tests for cache resolution.
//!
//! Whatever the mix of fresh, stale and absent entries, a request must split
//! into cache hits and ids to fetch without losing, duplicating or reordering ids.

use chrono::{Duration as ChronoDuration, Utc};
use proptest::prelude::*;
use quote_cache::{PartitionEntries, Quote, QuoteEntry};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(5);

// =============================================================================
// Generators
// =============================================================================

/// Asset ids from a small alphabet so requests and cache contents overlap.
fn arb_asset_id() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

/// Cached entries as (asset id, age in seconds); ages straddle the window.
fn arb_cached() -> impl Strategy<Value = Vec<(String, i64)>> {
    proptest::collection::vec((arb_asset_id(), 0i64..12), 0..15)
}

fn arb_request() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_asset_id(), 0..20)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every distinct requested id lands in exactly one of fresh or missing.
    #[test]
    fn prop_resolution_partitions_request(cached in arb_cached(), request in arb_request()) {
        let now = Utc::now();
        let mut entries = PartitionEntries::default();
        for (id, age) in &cached {
            entries.upsert(QuoteEntry::new(
                id.clone(),
                now - ChronoDuration::seconds(*age),
                Quote::with_price(Decimal::from(*age)),
            ));
        }

        let resolution = entries.resolve(&request, now, WINDOW);

        let distinct: HashSet<&String> = request.iter().collect();
        let missing: HashSet<&String> = resolution.missing.iter().collect();
        let fresh: HashSet<&String> = resolution.fresh.keys().collect();

        prop_assert!(missing.is_disjoint(&fresh));
        prop_assert_eq!(missing.len(), resolution.missing.len(), "missing has repeats");
        prop_assert_eq!(missing.len() + fresh.len(), distinct.len());

        for id in &distinct {
            let expect_fresh = entries
                .get(id)
                .map(|e| e.is_fresh(now, WINDOW))
                .unwrap_or(false);
            prop_assert_eq!(fresh.contains(id), expect_fresh);
        }
    }

    /// Missing ids keep the order of their first appearance in the request.
    #[test]
    fn prop_missing_keeps_request_order(request in arb_request()) {
        let entries = PartitionEntries::default();
        let resolution = entries.resolve(&request, Utc::now(), WINDOW);

        let mut seen = HashSet::new();
        let expected: Vec<String> = request
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        prop_assert_eq!(resolution.missing, expected);
    }

    /// Upserting the same asset repeatedly leaves a single entry holding the last value.
    #[test]
    fn prop_upsert_keeps_one_entry_per_asset(
        values in proptest::collection::vec(0u32..1000, 1..10)
    ) {
        let now = Utc::now();
        let mut entries = PartitionEntries::default();
        for value in &values {
            let value = Quote::with_price(Decimal::from(*value));
            entries.upsert(QuoteEntry::new("ethereum", now, value));
        }

        prop_assert_eq!(entries.len(), 1);
        let last = Decimal::from(*values.last().unwrap());
        prop_assert_eq!(entries.get("ethereum").unwrap().value.price, Some(last));
    }
}
