//! Concurrent map of reference currency to partition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::{debug, info};
use tokio::sync::OwnedMutexGuard;

use super::partition::{Partition, PartitionEntries};
use crate::models::{QuoteEntry, ReferenceCurrencyId};

/// In-memory quote cache, partitioned by reference currency.
///
/// Construct one with [`CacheStore::new`] and share it through an `Arc`;
/// there is no process-wide instance. Partitions are created on first use and
/// live until [`clear`](Self::clear).
///
/// Lookups and creation of different reference currencies never contend on a
/// common lock: the map is sharded and each partition carries its own mutex.
///
/// Clearing starts a new generation instead of removing map entries, so a
/// reference currency keeps a single lock for the life of the store. Entries
/// and partitions from an earlier generation are treated as absent.
#[derive(Debug, Default)]
pub struct CacheStore {
    partitions: DashMap<ReferenceCurrencyId, Arc<Partition>>,
    generation: AtomicU64,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cache generation. Advanced by every [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Return the partition for `reference_currency_id`, creating it if absent.
    ///
    /// Concurrent callers with the same key always receive the same partition,
    /// before and after a clear.
    pub fn partition_for(&self, reference_currency_id: &str) -> Arc<Partition> {
        let generation = self.generation();

        if let Some(partition) = self.partitions.get(reference_currency_id) {
            partition.touch(generation);
            return Arc::clone(partition.value());
        }

        let partition = self
            .partitions
            .entry(reference_currency_id.to_string())
            .or_insert_with(|| {
                debug!("Quote cache: creating partition '{}'", reference_currency_id);
                Arc::new(Partition::with_generation(reference_currency_id, generation))
            });
        partition.touch(generation);
        Arc::clone(partition.value())
    }

    /// Lock the partition for `reference_currency_id` and bring its entries
    /// up to the current generation.
    pub async fn lock_partition(
        &self,
        reference_currency_id: &str,
    ) -> OwnedMutexGuard<PartitionEntries> {
        let partition = self.partition_for(reference_currency_id);
        let mut entries = partition.lock_owned().await;

        let generation = self.generation();
        partition.touch(generation);
        entries.renew(generation);
        entries
    }

    /// Whether `entries` still belong to the current generation, i.e. no
    /// clear happened since they were locked.
    pub fn is_current(&self, entries: &PartitionEntries) -> bool {
        entries.generation() == self.generation()
    }

    /// Drop every cached entry.
    ///
    /// Fetches issued afterwards behave as if the cache had never been
    /// populated. A fetch already in flight keeps the partition lock until it
    /// finishes, and its results are not written.
    pub fn clear(&self) {
        let generation = self.generation();
        let count = self
            .partitions
            .iter()
            .filter(|p| p.is_live(generation))
            .count();

        self.generation.fetch_add(1, Ordering::AcqRel);
        if count > 0 {
            info!("Quote cache: cleared {} partition(s)", count);
        }
    }

    /// Copy of the entries of a partition, or `None` if it does not exist.
    ///
    /// Waits for any fetch currently holding the partition lock.
    pub async fn snapshot(&self, reference_currency_id: &str) -> Option<Vec<QuoteEntry>> {
        // Never hold a map guard across an await
        let partition = self
            .partitions
            .get(reference_currency_id)
            .map(|p| Arc::clone(p.value()))?;
        if !partition.is_live(self.generation()) {
            return None;
        }

        let entries = partition.lock().await;
        if !self.is_current(&entries) {
            return Some(Vec::new());
        }
        Some(entries.iter().cloned().collect())
    }

    /// Insert entries into a partition, creating the partition if needed.
    ///
    /// Entries replace existing ones with the same asset id. Seeding with no
    /// entries still creates the partition.
    pub async fn seed<I>(&self, reference_currency_id: &str, entries: I)
    where
        I: IntoIterator<Item = QuoteEntry>,
    {
        let mut guard = self.lock_partition(reference_currency_id).await;
        for entry in entries {
            guard.upsert(entry);
        }
    }

    /// Reference currencies that currently have a partition.
    pub fn reference_currencies(&self) -> Vec<ReferenceCurrencyId> {
        let generation = self.generation();
        self.partitions
            .iter()
            .filter(|p| p.is_live(generation))
            .map(|p| p.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        let generation = self.generation();
        self.partitions
            .iter()
            .filter(|p| p.is_live(generation))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
