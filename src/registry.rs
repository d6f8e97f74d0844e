use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::entry::Entry;

/// Every entry the cache has ever seen, keyed by its recreation key.
///
/// The registry is not thread-safe on its own; the cache wraps it in a Mutex.
pub struct Registry<V> {
	entries: HashMap<String, Entry<V>>,
}

impl<V> Registry<V> {
	pub fn new() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}

	/// Store `value` under `key`, overwriting any previous payload and access time.
	///
	/// Returns true if the key already had an entry.
	pub fn insert(&mut self, key: &str, value: Arc<V>, now: Instant) -> bool {
		if let Some(entry) = self.entries.get_mut(key) {
			entry.set_value(value);
			entry.touch(now);
			return true;
		}
		self.entries.insert(key.to_owned(), Entry::new(value, now));
		false
	}

	pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry<V>> {
		self.entries.get_mut(key)
	}

	/// Release every payload last accessed strictly before `cutoff`.
	///
	/// Returns the number of payloads released.
	pub fn sweep(&mut self, cutoff: Instant) -> usize {
		self.entries.values_mut().map(|entry| entry.evict_if_stale(cutoff)).filter(|released| *released).count()
	}

	/// Number of entries, cached or not.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Number of entries currently holding a payload.
	pub fn cached_len(&self) -> usize {
		self.entries.values().filter(|entry| entry.is_cached()).count()
	}
}
