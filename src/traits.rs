/// Produces a fresh value for a key whose payload is missing or was evicted.
///
/// Any `Fn(&str) -> V + Send + Sync + 'static` closure or function is a
/// recreator, so most callers never implement this trait by hand.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use weak_cache::WeakCache;
///
/// fn load_greeting(name: &str) -> String {
/// 	format!("hello, {name}")
/// }
///
/// let cache = WeakCache::new(Duration::from_secs(60), load_greeting);
/// assert_eq!(*cache.read("world"), "hello, world");
/// ```
///
/// The recreator runs while the cache lock is held, so it must not call back
/// into the same cache.
pub trait Recreator<V>: Send + Sync + 'static {
	/// Build the value for `key`.
	fn recreate(&self, key: &str) -> V;
}

impl<V, F> Recreator<V> for F
where
	F: Fn(&str) -> V + Send + Sync + 'static,
{
	fn recreate(&self, key: &str) -> V {
		self(key)
	}
}
