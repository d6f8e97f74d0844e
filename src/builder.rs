use std::time::Duration;

use crate::cache::WeakCache;
use crate::error::{Error, Result};
use crate::traits::Recreator;

const DEFAULT_THREAD_NAME: &str = "weak-cache-sweeper";

/// Builder for configuring a WeakCache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use weak_cache::WeakCache;
///
/// let cache = WeakCache::builder(Duration::from_secs(300))
/// 	.recreator(|key: &str| key.len())
/// 	.gc_enabled(false) // start paused
/// 	.thread_name("sizes-sweeper")
/// 	.build()
/// 	.unwrap();
///
/// assert_eq!(*cache.read("four"), 4);
/// assert!(!cache.is_gc_enabled());
/// ```
pub struct WeakCacheBuilder<V> {
	evict_after: Duration,
	recreator: Option<Box<dyn Recreator<V>>>,
	gc_enabled: bool,
	thread_name: String,
}

impl<V> WeakCacheBuilder<V>
where
	V: Send + Sync + 'static,
{
	/// Create a new builder with the given eviction window.
	pub fn new(evict_after: Duration) -> Self {
		Self {
			evict_after,
			recreator: None,
			gc_enabled: true,
			thread_name: DEFAULT_THREAD_NAME.to_string(),
		}
	}

	/// Set the function that rebuilds a value from its key. Required.
	pub fn recreator(mut self, recreator: impl Recreator<V>) -> Self {
		self.recreator = Some(Box::new(recreator));
		self
	}

	/// Whether the background sweep starts enabled.
	///
	/// Default: true
	pub fn gc_enabled(mut self, enabled: bool) -> Self {
		self.gc_enabled = enabled;
		self
	}

	/// Name of the sweeper thread, as shown in debuggers and panic messages.
	///
	/// Default: "weak-cache-sweeper"
	pub fn thread_name(mut self, name: impl Into<String>) -> Self {
		self.thread_name = name.into();
		self
	}

	/// Build the cache and start its sweeper thread.
	pub fn build(self) -> Result<WeakCache<V>> {
		let recreator = self.recreator.ok_or(Error::MissingRecreator)?;
		WeakCache::spawn(self.evict_after, recreator, self.gc_enabled, self.thread_name)
			.map_err(Error::SpawnSweeper)
	}
}
