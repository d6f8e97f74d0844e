use std::sync::Arc;
use std::time::Instant;

/// One registry slot.
///
/// The slot itself is never dropped by the cache; eviction only takes the
/// payload out, leaving the key and access time behind.
pub struct Entry<V> {
	/// Current payload, `None` once a sweep has cleared it
	value: Option<Arc<V>>,
	/// Last time the entry was read or written
	last_accessed: Instant,
}

impl<V> Entry<V> {
	/// Create an entry holding `value`, accessed at `now`.
	pub fn new(value: Arc<V>, now: Instant) -> Self {
		Self {
			value: Some(value),
			last_accessed: now,
		}
	}

	/// Current payload, cloned out of the slot.
	pub fn value(&self) -> Option<Arc<V>> {
		self.value.clone()
	}

	/// Whether the entry holds a payload.
	pub fn is_cached(&self) -> bool {
		self.value.is_some()
	}

	/// Replace the payload without touching the access time.
	pub fn set_value(&mut self, value: Arc<V>) {
		self.value = Some(value);
	}

	#[cfg(test)]
	pub fn last_accessed(&self) -> Instant {
		self.last_accessed
	}

	/// Record an access at `now`.
	pub fn touch(&mut self, now: Instant) {
		self.last_accessed = now;
	}

	/// Drop the payload if it was last accessed strictly before `cutoff`.
	///
	/// Returns true if a payload was released.
	pub fn evict_if_stale(&mut self, cutoff: Instant) -> bool {
		if self.value.is_some() && self.last_accessed < cutoff {
			self.value = None;
			return true;
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	#[test]
	fn test_new_entry_is_cached() {
		let now = Instant::now();
		let entry = Entry::new(Arc::new(7u32), now);

		assert!(entry.is_cached());
		assert_eq!(entry.value().as_deref(), Some(&7));
		assert_eq!(entry.last_accessed(), now);
	}

	#[test]
	fn test_evict_if_stale() {
		let start = Instant::now();
		let mut entry = Entry::new(Arc::new("payload"), start);

		// Access time equal to the cutoff is not stale
		assert!(!entry.evict_if_stale(start));
		assert!(entry.is_cached());

		assert!(entry.evict_if_stale(start + Duration::from_millis(1)));
		assert!(!entry.is_cached());

		// Already empty: nothing to release
		assert!(!entry.evict_if_stale(start + Duration::from_secs(1)));
	}

	#[test]
	fn test_set_value_keeps_access_time() {
		let start = Instant::now();
		let mut entry = Entry::new(Arc::new(1), start);
		entry.evict_if_stale(start + Duration::from_millis(1));

		entry.set_value(Arc::new(2));
		assert_eq!(entry.value().as_deref(), Some(&2));
		assert_eq!(entry.last_accessed(), start);

		let later = start + Duration::from_secs(3);
		entry.touch(later);
		assert_eq!(entry.last_accessed(), later);
	}
}
