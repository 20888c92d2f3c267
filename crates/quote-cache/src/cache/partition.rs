//! Per-reference-currency storage and locking.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::models::{AssetId, Quote, QuoteEntry, ReferenceCurrencyId};

/// Cached quotes for one reference currency, behind their own lock.
///
/// Fetches for the same reference currency serialize on this lock; fetches
/// for different reference currencies never touch it. The lock outlives
/// cache clears: clearing only invalidates the entries.
#[derive(Debug)]
pub struct Partition {
    reference_currency_id: ReferenceCurrencyId,
    /// Last cache generation in which the partition was referenced
    generation: AtomicU64,
    entries: Arc<Mutex<PartitionEntries>>,
}

impl Partition {
    pub fn new(reference_currency_id: impl Into<ReferenceCurrencyId>) -> Self {
        Self::with_generation(reference_currency_id, 0)
    }

    pub(crate) fn with_generation(
        reference_currency_id: impl Into<ReferenceCurrencyId>,
        generation: u64,
    ) -> Self {
        Self {
            reference_currency_id: reference_currency_id.into(),
            generation: AtomicU64::new(generation),
            entries: Arc::new(Mutex::new(PartitionEntries::new(generation))),
        }
    }

    pub fn reference_currency_id(&self) -> &str {
        &self.reference_currency_id
    }

    pub(crate) fn touch(&self, generation: u64) {
        self.generation.fetch_max(generation, Ordering::AcqRel);
    }

    /// Whether the partition was referenced since the given generation began.
    pub(crate) fn is_live(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Wait for exclusive access to the entries.
    ///
    /// Waiters are served in the order they called `lock`. The lock is
    /// released when the guard is dropped, including when the holding future
    /// is cancelled.
    pub async fn lock(&self) -> MutexGuard<'_, PartitionEntries> {
        self.entries.lock().await
    }

    /// Like [`lock`](Self::lock), but the guard keeps the partition alive on
    /// its own.
    pub async fn lock_owned(&self) -> OwnedMutexGuard<PartitionEntries> {
        Arc::clone(&self.entries).lock_owned().await
    }
}

/// The entry set of a partition. At most one entry per asset id.
///
/// Entries belong to the cache generation they were written in; a set from
/// an older generation is emptied when it is renewed.
#[derive(Debug, Default)]
pub struct PartitionEntries {
    generation: u64,
    entries: HashMap<AssetId, QuoteEntry>,
}

/// Requested asset ids split by what the cache can serve.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Requested ids with a fresh entry, mapped to the cached value
    pub fresh: HashMap<AssetId, Quote>,
    /// Requested ids that are absent or stale, in first-requested order
    pub missing: Vec<AssetId>,
}

impl PartitionEntries {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            entries: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Move the set to `generation`, dropping entries of earlier generations.
    pub(crate) fn renew(&mut self, generation: u64) {
        if self.generation != generation {
            self.entries.clear();
            self.generation = generation;
        }
    }

    /// Split `asset_ids` into fresh hits and ids that must be fetched.
    ///
    /// Stale entries count as missing. Repeated ids appear once.
    pub fn resolve(
        &self,
        asset_ids: &[AssetId],
        now: DateTime<Utc>,
        window: Duration,
    ) -> Resolution {
        let mut resolution = Resolution::default();
        let mut seen = HashSet::with_capacity(asset_ids.len());

        for asset_id in asset_ids {
            if !seen.insert(asset_id.as_str()) {
                continue;
            }

            match self.entries.get(asset_id) {
                Some(entry) if entry.is_fresh(now, window) => {
                    resolution.fresh.insert(asset_id.clone(), entry.value.clone());
                }
                _ => resolution.missing.push(asset_id.clone()),
            }
        }

        resolution
    }

    /// Insert an entry, replacing any previous entry for the same asset.
    /// Returns the replaced entry.
    pub fn upsert(&mut self, entry: QuoteEntry) -> Option<QuoteEntry> {
        self.entries.insert(entry.asset_id.clone(), entry)
    }

    pub fn get(&self, asset_id: &str) -> Option<&QuoteEntry> {
        self.entries.get(asset_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuoteEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use rust_decimal_macros::dec;

    const WINDOW: Duration = Duration::from_secs(5);

    fn ids(ids: &[&str]) -> Vec<AssetId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_empty_partition_reports_all_missing() {
        let entries = PartitionEntries::default();
        let resolution = entries.resolve(&ids(&["ethereum", "solana"]), Utc::now(), WINDOW);

        assert!(resolution.fresh.is_empty());
        assert_eq!(resolution.missing, ids(&["ethereum", "solana"]));
    }

    #[test]
    fn test_resolve_splits_fresh_and_stale() {
        let now = Utc::now();
        let mut entries = PartitionEntries::default();
        entries.upsert(QuoteEntry::new(
            "bitcoin",
            now,
            Quote::with_price(dec!(60000)),
        ));
        entries.upsert(QuoteEntry::new(
            "ethereum",
            now - ChronoDuration::seconds(10),
            Quote::with_price(dec!(3000)),
        ));

        let resolution = entries.resolve(&ids(&["ethereum", "bitcoin", "solana"]), now, WINDOW);

        assert_eq!(resolution.fresh.len(), 1);
        assert_eq!(resolution.fresh["bitcoin"], Quote::with_price(dec!(60000)));
        assert_eq!(resolution.missing, ids(&["ethereum", "solana"]));
    }

    #[test]
    fn test_resolve_collapses_repeated_ids() {
        let entries = PartitionEntries::default();
        let resolution = entries.resolve(
            &ids(&["solana", "ethereum", "solana"]),
            Utc::now(),
            WINDOW,
        );

        assert_eq!(resolution.missing, ids(&["solana", "ethereum"]));
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let now = Utc::now();
        let mut entries = PartitionEntries::default();

        assert!(entries
            .upsert(QuoteEntry::new("ethereum", now, Quote::with_price(dec!(1))))
            .is_none());
        let replaced = entries
            .upsert(QuoteEntry::new("ethereum", now, Quote::with_price(dec!(2))))
            .unwrap();

        assert_eq!(replaced.value, Quote::with_price(dec!(1)));
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries.get("ethereum").unwrap().value,
            Quote::with_price(dec!(2))
        );
    }

    #[tokio::test]
    async fn test_lock_serializes_access() {
        let partition = Partition::new("usd");
        assert_eq!(partition.reference_currency_id(), "usd");

        let guard = partition.lock().await;
        assert!(partition.entries.try_lock().is_err());
        drop(guard);
        assert!(partition.entries.try_lock().is_ok());
    }

    #[test]
    fn test_renew_drops_entries_of_older_generation() {
        let mut entries = PartitionEntries::new(0);
        entries.upsert(QuoteEntry::new("ethereum", Utc::now(), Quote::default()));

        entries.renew(0);
        assert_eq!(entries.len(), 1);

        entries.renew(1);
        assert!(entries.is_empty());
        assert_eq!(entries.generation(), 1);
    }

    #[tokio::test]
    async fn test_touch_never_moves_generation_back() {
        let partition = Partition::with_generation("usd", 2);
        assert!(partition.is_live(2));

        partition.touch(1);
        assert!(partition.is_live(2));

        partition.touch(3);
        assert!(!partition.is_live(2));
        assert!(partition.is_live(3));

        let owned = partition.lock_owned().await;
        assert!(partition.entries.try_lock().is_err());
        drop(owned);
    }
}
