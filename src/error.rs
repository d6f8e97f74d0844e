use std::io;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a cache.
///
/// Cache operations themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
	/// `build()` was called before a recreator was set.
	#[error("no recreator configured")]
	MissingRecreator,

	/// The OS refused to start the sweeper thread.
	#[error("failed to spawn sweeper thread: {0}")]
	SpawnSweeper(#[source] io::Error),
}
