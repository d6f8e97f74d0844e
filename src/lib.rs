//! # Weak Cache
//!
//! A concurrent, self-repopulating cache keyed by strings:
//! - **Recreate on miss**: a missing or evicted value is rebuilt by a
//!   user-supplied recreator the next time it is read
//! - **Idle eviction**: a background sweeper releases values nobody touched
//!   for a configurable window; the entry stays so it can be refilled
//! - **One lock, simple guarantees**: every operation, recreation included,
//!   is serialized, so the recreator never runs concurrently with anything else
//! - **Deterministic shutdown**: dropping the cache stops and joins the sweeper
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//!
//! use weak_cache::WeakCache;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Profile {
//! 	name: String,
//! }
//!
//! // Values idle for 5 minutes are released and rebuilt on the next read
//! let cache = WeakCache::new(Duration::from_secs(300), |user: &str| Profile {
//! 	name: user.to_string(),
//! });
//!
//! cache.add("alice", Profile { name: "Alice".to_string() });
//! assert_eq!(cache.read("alice").name, "Alice");
//!
//! // Never seen before: recreated from the key
//! assert_eq!(cache.read("bob").name, "bob");
//!
//! // Look without recreating
//! assert!(cache.pure_read("carol").is_none());
//! ```
//!
//! ## Thread Safety
//!
//! The cache is `Send + Sync` and can be shared across threads via `Arc`:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! use weak_cache::WeakCache;
//!
//! let cache = Arc::new(WeakCache::new(Duration::from_secs(60), |key: &str| key.len()));
//!
//! let handles: Vec<_> = (0..4)
//! 	.map(|i| {
//! 		let cache = cache.clone();
//! 		thread::spawn(move || *cache.read(format!("key-{i}")))
//! 	})
//! 	.collect();
//!
//! for handle in handles {
//! 	assert_eq!(handle.join().unwrap(), 5);
//! }
//! ```

mod builder;
mod cache;
mod entry;
mod error;
mod metrics;
mod registry;
mod sweeper;
mod traits;

pub use builder::WeakCacheBuilder;
pub use cache::WeakCache;
pub use error::{Error, Result};
pub use metrics::CacheMetrics;
pub use traits::Recreator;
