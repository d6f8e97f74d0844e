use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::builder::WeakCacheBuilder;
use crate::metrics::{CacheMetrics, Counters};
use crate::registry::Registry;
use crate::sweeper::Sweeper;
use crate::traits::Recreator;

/// How often the background sweeper wakes up.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// State shared between the cache handle and its sweeper thread.
struct Shared<V> {
	/// Every entry ever added or read, behind the single cache-wide lock
	registry: Mutex<Registry<V>>,
	/// Rebuilds missing payloads
	recreator: Box<dyn Recreator<V>>,
	/// Payloads idle for longer than this are released
	evict_after: Duration,
	/// Gates the background sweep; read without the registry lock
	gc_enabled: AtomicBool,
	counters: Counters,
}

impl<V: 'static> Shared<V> {
	fn recreate(&self, key: &str) -> Arc<V> {
		debug!(key, "Recreating cache value");
		let value = Arc::new(self.recreator.recreate(key));
		// Only counted once the recreator has returned
		Counters::bump(&self.counters.misses);
		value
	}

	/// One pass over the registry, releasing stale payloads.
	fn sweep(&self) -> usize {
		let now = Instant::now();
		// Nothing can be older than the process clock allows
		let Some(cutoff) = now.checked_sub(self.evict_after) else {
			return 0;
		};

		let released = self.registry.lock().sweep(cutoff);
		Counters::bump(&self.counters.sweeps);
		self.counters.evictions.fetch_add(released as u64, Ordering::Relaxed);

		if released > 0 {
			debug!(released, "Sweep released idle values");
		} else {
			trace!("Sweep found nothing to release");
		}
		released
	}

	/// Background tick: sweep unless GC has been stopped.
	fn tick(&self) {
		if self.gc_enabled.load(Ordering::Relaxed) {
			self.sweep();
		} else {
			Counters::bump(&self.counters.skipped_sweeps);
		}
	}
}

/// Thread-safe, self-repopulating cache keyed by strings.
///
/// Values that have not been touched for `evict_after` are released by a
/// background sweeper, but their entries stay behind: the next
/// [`read`](WeakCache::read) calls the recreator and fills the slot again.
///
/// Every operation, including recreation and the sweep, runs under one
/// cache-wide lock. A slow recreator therefore stalls all other callers.
///
/// Values are handed out as `Arc<V>`, so the lock is never held by the caller
/// and results are safe to keep across `.await` points.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use weak_cache::WeakCache;
///
/// let cache = WeakCache::new(Duration::from_secs(30), |key: &str| key.to_uppercase());
///
/// cache.add("greeting", "hi".to_string());
/// assert_eq!(*cache.read("greeting"), "hi");
///
/// // Unknown keys are recreated on demand
/// assert_eq!(*cache.read("abc"), "ABC");
/// assert!(cache.in_cache("abc"));
///
/// // pure_read never recreates
/// assert!(cache.pure_read("missing").is_none());
/// ```
///
/// Dropping the cache stops and joins the sweeper thread.
pub struct WeakCache<V> {
	shared: Arc<Shared<V>>,
	sweeper: Sweeper,
}

impl<V> WeakCache<V>
where
	V: Send + Sync + 'static,
{
	/// Create a cache releasing values idle for longer than `evict_after`.
	///
	/// GC starts enabled and the sweeper thread is running when this returns.
	///
	/// # Panics
	///
	/// Panics if the OS cannot spawn the sweeper thread, like
	/// [`std::thread::spawn`]. Use [`WeakCache::builder`] to handle that case.
	pub fn new(evict_after: Duration, recreator: impl Recreator<V>) -> Self {
		match Self::builder(evict_after).recreator(recreator).build() {
			Ok(cache) => cache,
			Err(err) => panic!("failed to create weak cache: {err}"),
		}
	}

	/// Start configuring a cache with the given eviction window.
	pub fn builder(evict_after: Duration) -> WeakCacheBuilder<V> {
		WeakCacheBuilder::new(evict_after)
	}

	pub(crate) fn spawn(
		evict_after: Duration,
		recreator: Box<dyn Recreator<V>>,
		gc_enabled: bool,
		thread_name: String,
	) -> std::io::Result<Self> {
		let shared = Arc::new(Shared {
			registry: Mutex::new(Registry::new()),
			recreator,
			evict_after,
			gc_enabled: AtomicBool::new(gc_enabled),
			counters: Counters::default(),
		});

		let sweep_state = Arc::clone(&shared);
		let sweeper = Sweeper::spawn(thread_name, SWEEP_INTERVAL, move || sweep_state.tick())?;

		Ok(Self {
			shared,
			sweeper,
		})
	}
}

impl<V: 'static> WeakCache<V> {
	/// Store `value` under `key`, replacing any previous value.
	///
	/// The access time is reset, so the value gets a full eviction window.
	pub fn add(&self, key: impl AsRef<str>, value: V) {
		self.add_with_access_time(key, value, Instant::now());
	}

	/// Store `value` under `key` as if it had last been accessed at `last_accessed`.
	///
	/// A time in the past shortens the value's remaining window; one older
	/// than `evict_after` makes it eligible for the next sweep.
	pub fn add_with_access_time(&self, key: impl AsRef<str>, value: V, last_accessed: Instant) {
		let key = key.as_ref();
		let replaced = self.shared.registry.lock().insert(key, Arc::new(value), last_accessed);

		if replaced {
			Counters::bump(&self.shared.counters.updates);
		} else {
			Counters::bump(&self.shared.counters.inserts);
		}
	}

	/// Return the value for `key`, recreating it if it is missing or was evicted.
	///
	/// The recreator runs while the cache lock is held, so concurrent reads
	/// (for any key) wait for it. If the recreator panics, nothing is stored
	/// and the panic reaches the caller.
	pub fn read(&self, key: impl AsRef<str>) -> Arc<V> {
		let key = key.as_ref();
		let mut registry = self.shared.registry.lock();

		let Some(entry) = registry.get_mut(key) else {
			let value = self.shared.recreate(key);
			registry.insert(key, Arc::clone(&value), Instant::now());
			return value;
		};

		let value = match entry.value() {
			Some(value) => {
				Counters::bump(&self.shared.counters.hits);
				value
			}
			None => {
				let value = self.shared.recreate(key);
				entry.set_value(Arc::clone(&value));
				value
			}
		};

		// Stamped once the value is ready to return, not when recreation began
		entry.touch(Instant::now());
		value
	}

	/// Like [`read`](WeakCache::read), but returns an owned clone.
	pub fn read_clone(&self, key: impl AsRef<str>) -> V
	where
		V: Clone,
	{
		(*self.read(key)).clone()
	}

	/// Return the cached value for `key` without ever running the recreator.
	///
	/// Any existing entry counts as accessed, even one whose value was evicted.
	pub fn pure_read(&self, key: impl AsRef<str>) -> Option<Arc<V>> {
		let mut registry = self.shared.registry.lock();
		let entry = registry.get_mut(key.as_ref())?;
		entry.touch(Instant::now());
		entry.value()
	}

	/// Whether `key` currently holds a value. Counts as an access like
	/// [`pure_read`](WeakCache::pure_read).
	pub fn in_cache(&self, key: impl AsRef<str>) -> bool {
		self.pure_read(key).is_some()
	}

	/// Resume background eviction.
	pub fn start_gc(&self) {
		self.shared.gc_enabled.store(true, Ordering::Relaxed);
		info!("Weak cache GC started");
	}

	/// Pause background eviction. The sweeper keeps ticking but skips its scan.
	pub fn stop_gc(&self) {
		self.shared.gc_enabled.store(false, Ordering::Relaxed);
		info!("Weak cache GC stopped");
	}

	pub fn is_gc_enabled(&self) -> bool {
		self.shared.gc_enabled.load(Ordering::Relaxed)
	}

	/// Run one sweep now, regardless of the GC flag.
	///
	/// Returns the number of values released.
	pub fn collect_garbage(&self) -> usize {
		self.shared.sweep()
	}

	/// Eviction window this cache was built with.
	pub fn evict_after(&self) -> Duration {
		self.shared.evict_after
	}

	/// Number of entries, including ones whose value was evicted.
	pub fn len(&self) -> usize {
		self.shared.registry.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of entries currently holding a value.
	pub fn cached_len(&self) -> usize {
		self.shared.registry.lock().cached_len()
	}

	/// Get a snapshot of cache activity.
	pub fn metrics(&self) -> CacheMetrics {
		let (entry_count, cached_count) = {
			let registry = self.shared.registry.lock();
			(registry.len(), registry.cached_len())
		};
		self.shared.counters.snapshot(entry_count, cached_count)
	}

	/// Whether the sweeper thread is alive.
	pub fn is_sweeper_running(&self) -> bool {
		self.sweeper.is_running()
	}
}

impl<V: 'static> fmt::Debug for WeakCache<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakCache")
			.field("evict_after", &self.shared.evict_after)
			.field("gc_enabled", &self.is_gc_enabled())
			.field("len", &self.len())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;
	use std::thread;

	use super::*;

	fn counting_cache(evict_after: Duration) -> (WeakCache<String>, Arc<AtomicUsize>) {
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = Arc::clone(&calls);
		let cache = WeakCache::new(evict_after, move |key: &str| {
			counter.fetch_add(1, Ordering::SeqCst);
			key.to_string()
		});
		(cache, calls)
	}

	#[test]
	fn test_read_recreates_unknown_key() {
		let (cache, calls) = counting_cache(Duration::from_secs(60));

		assert_eq!(*cache.read("x"), "x");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(cache.in_cache("x"));

		// Second read is a hit
		assert_eq!(*cache.read("x"), "x");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_add_then_read() {
		let (cache, calls) = counting_cache(Duration::from_secs(60));

		cache.add("k", "works".to_string());
		assert_eq!(*cache.read("k"), "works");
		assert_eq!(cache.pure_read("k").as_deref().map(String::as_str), Some("works"));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_add_overwrites() {
		let (cache, _) = counting_cache(Duration::from_secs(60));

		cache.add("k", "one".to_string());
		cache.add("k", "two".to_string());

		assert_eq!(cache.read_clone("k"), "two");
		assert_eq!(cache.len(), 1);

		let metrics = cache.metrics();
		assert_eq!(metrics.inserts, 1);
		assert_eq!(metrics.updates, 1);
	}

	#[test]
	fn test_pure_read_never_recreates() {
		let (cache, calls) = counting_cache(Duration::from_secs(60));

		assert!(cache.pure_read("test").is_none());
		assert!(!cache.in_cache("test"));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(cache.is_empty());
	}

	#[test]
	fn test_collect_garbage_keeps_entry() {
		let (cache, calls) = counting_cache(Duration::ZERO);
		// Keep the background sweep out of the way
		cache.stop_gc();

		cache.add("k", "v".to_string());
		thread::sleep(Duration::from_millis(5));

		assert_eq!(cache.collect_garbage(), 1);
		assert!(cache.pure_read("k").is_none());
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.cached_len(), 0);

		// Evicted entry is rebuilt from its key
		assert_eq!(*cache.read("k"), "k");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn test_collect_garbage_ignores_fresh_entries() {
		let (cache, _) = counting_cache(Duration::from_secs(60));

		cache.add("a", "1".to_string());
		cache.read("b");

		assert_eq!(cache.collect_garbage(), 0);
		assert_eq!(cache.cached_len(), 2);
	}

	#[test]
	fn test_gc_toggle() {
		let (cache, _) = counting_cache(Duration::from_secs(60));
		assert!(cache.is_gc_enabled());

		cache.stop_gc();
		assert!(!cache.is_gc_enabled());

		cache.start_gc();
		assert!(cache.is_gc_enabled());
	}

	#[test]
	fn test_recreator_panic_leaves_no_entry() {
		let cache: WeakCache<String> = WeakCache::new(Duration::from_secs(60), |key: &str| {
			if key == "bad" {
				panic!("cannot build {key}");
			}
			key.to_string()
		});

		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cache.read("bad")));
		assert!(result.is_err());

		// Lock was released and nothing was committed or counted
		assert!(cache.is_empty());
		assert_eq!(cache.metrics().misses, 0);
		assert_eq!(*cache.read("good"), "good");
		assert_eq!(cache.metrics().misses, 1);
	}

	/// Exercises the public API from generic code, with only the bounds a
	/// downstream caller would write.
	fn round_trip<V: Send + Sync + 'static>(cache: &WeakCache<V>, key: &str, value: V) -> Arc<V> {
		cache.add(key, value);
		assert!(cache.in_cache(key));
		assert!(cache.pure_read(key).is_some());
		cache.read(key)
	}

	#[test]
	fn test_generic_caller() {
		let (cache, calls) = counting_cache(Duration::from_secs(60));

		assert_eq!(*round_trip(&cache, "k", "works".to_string()), "works");
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(format!("{cache:?}").contains("WeakCache"));
	}

	#[test]
	fn test_add_with_access_time() {
		let (cache, calls) = counting_cache(Duration::from_secs(60));
		cache.stop_gc();

		let long_ago = Instant::now().checked_sub(Duration::from_secs(120)).unwrap();
		cache.add_with_access_time("old", "stale".to_string(), long_ago);
		cache.add("new", "fresh".to_string());

		assert_eq!(cache.collect_garbage(), 1);
		assert!(!cache.in_cache("old"));
		assert!(cache.in_cache("new"));
		assert_eq!(cache.len(), 2);

		// Rebuilt from its key on the next read
		assert_eq!(*cache.read("old"), "old");
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_drop_stops_sweeper() {
		let (cache, _) = counting_cache(Duration::from_secs(60));
		assert!(cache.is_sweeper_running());
		drop(cache);
	}

	#[test]
	fn test_cache_is_send_sync() {
		fn assert_send<T: Send>() {}
		fn assert_sync<T: Sync>() {}

		assert_send::<WeakCache<String>>();
		assert_sync::<WeakCache<String>>();
	}
}
