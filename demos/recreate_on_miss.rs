//! Example showing a value being released after sitting idle and rebuilt on
//! the next read.
//!
//! Run with `RUST_LOG=weak_cache=debug` to see recreation and sweep events.

use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use weak_cache::WeakCache;

#[derive(Clone, Debug, PartialEq)]
struct Thumbnail {
	path: String,
	bytes: Vec<u8>,
}

fn render_thumbnail(path: &str) -> Thumbnail {
	println!("  rendering {path}");
	Thumbnail {
		path: path.to_string(),
		bytes: vec![0u8; 256],
	}
}

fn main() {
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let cache = WeakCache::new(Duration::from_secs(1), render_thumbnail);

	println!("First read renders:");
	let thumb = cache.read("photos/cat.png");
	println!("  got {} ({} bytes)", thumb.path, thumb.bytes.len());

	println!("Second read is a hit:");
	cache.read("photos/cat.png");

	println!("Waiting for the sweeper...");
	thread::sleep(Duration::from_millis(2500));
	println!("  cached: {}", cache.in_cache("photos/cat.png"));

	println!("Read after eviction renders again:");
	cache.read("photos/cat.png");

	let metrics = cache.metrics();
	println!("\nMetrics:");
	println!("  hits: {}, misses: {}", metrics.hits, metrics.misses);
	println!("  evictions: {}", metrics.evictions);
	println!("  entries: {} ({} cached)", metrics.entry_count, metrics.cached_count);
}
