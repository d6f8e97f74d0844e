//! Cache activity counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cache activity.
///
/// Counters are cumulative since the cache was created. `entry_count` and
/// `cached_count` describe the registry at the moment the snapshot was taken.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use weak_cache::WeakCache;
///
/// let cache = WeakCache::new(Duration::from_secs(60), |key: &str| key.len());
/// cache.read("abc");
/// cache.read("abc");
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics.misses, 1);
/// assert_eq!(metrics.hits, 1);
/// println!("Hit rate: {:.2}%", metrics.hit_rate() * 100.0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetrics {
	/// `read` calls served from a cached payload.
	pub hits: u64,
	/// `read` calls that had to run the recreator.
	pub misses: u64,
	/// `add` calls that created a new entry.
	pub inserts: u64,
	/// `add` calls that overwrote an existing entry.
	pub updates: u64,
	/// Payloads released by sweeps.
	pub evictions: u64,
	/// Sweep cycles that scanned the registry.
	pub sweeps: u64,
	/// Background cycles skipped because GC was stopped.
	pub skipped_sweeps: u64,
	/// Entries in the registry, cached or evicted.
	pub entry_count: usize,
	/// Entries currently holding a payload.
	pub cached_count: usize,
}

impl CacheMetrics {
	/// Ratio of `read` calls answered without recreation, between 0.0 and 1.0.
	///
	/// Returns 0.0 if nothing has been read yet.
	pub fn hit_rate(&self) -> f64 {
		let total = self.total_reads();
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}

	/// Total reads that produced a value (hits + misses).
	pub fn total_reads(&self) -> u64 {
		self.hits + self.misses
	}
}

/// Live counters behind [`CacheMetrics`].
#[derive(Default)]
pub(crate) struct Counters {
	pub hits: AtomicU64,
	pub misses: AtomicU64,
	pub inserts: AtomicU64,
	pub updates: AtomicU64,
	pub evictions: AtomicU64,
	pub sweeps: AtomicU64,
	pub skipped_sweeps: AtomicU64,
}

impl Counters {
	pub fn bump(counter: &AtomicU64) {
		counter.fetch_add(1, Ordering::Relaxed);
	}

	pub fn snapshot(&self, entry_count: usize, cached_count: usize) -> CacheMetrics {
		CacheMetrics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			inserts: self.inserts.load(Ordering::Relaxed),
			updates: self.updates.load(Ordering::Relaxed),
			evictions: self.evictions.load(Ordering::Relaxed),
			sweeps: self.sweeps.load(Ordering::Relaxed),
			skipped_sweeps: self.skipped_sweeps.load(Ordering::Relaxed),
			entry_count,
			cached_count,
		}
	}
}
