use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{info, warn};

/// Stop flag shared between the owner and the sweeper thread.
struct Signal {
	stopped: Mutex<bool>,
	condvar: Condvar,
}

/// Background thread that runs a tick closure on a fixed interval until stopped.
///
/// Stopping wakes the thread immediately instead of waiting out the interval,
/// so dropping the owner never blocks for longer than one tick in progress.
pub struct Sweeper {
	signal: Arc<Signal>,
	handle: Option<JoinHandle<()>>,
}

impl Sweeper {
	/// Spawn a named thread calling `tick` every `interval`.
	pub fn spawn<F>(name: String, interval: Duration, mut tick: F) -> io::Result<Self>
	where
		F: FnMut() + Send + 'static,
	{
		let signal = Arc::new(Signal {
			stopped: Mutex::new(false),
			condvar: Condvar::new(),
		});

		let thread_signal = Arc::clone(&signal);
		let handle = thread::Builder::new().name(name.clone()).spawn(move || {
			let mut stopped = thread_signal.stopped.lock();
			while !*stopped {
				let timed_out = thread_signal.condvar.wait_for(&mut stopped, interval).timed_out();
				if timed_out && !*stopped {
					// Release the flag while ticking so stop() never waits on it
					MutexGuard::unlocked(&mut stopped, &mut tick);
				}
			}
		})?;

		info!(thread = %name, interval_ms = interval.as_millis() as u64, "Sweeper started");

		Ok(Self {
			signal,
			handle: Some(handle),
		})
	}

	/// Signal the thread to exit and wait for it.
	///
	/// Idempotent.
	pub fn stop(&mut self) {
		let Some(handle) = self.handle.take() else {
			return;
		};

		*self.signal.stopped.lock() = true;
		self.signal.condvar.notify_all();

		let name = handle.thread().name().unwrap_or("sweeper").to_owned();
		if handle.join().is_err() {
			warn!(thread = %name, "Sweeper thread panicked");
		} else {
			info!(thread = %name, "Sweeper stopped");
		}
	}

	pub fn is_running(&self) -> bool {
		self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
	}
}

impl Drop for Sweeper {
	fn drop(&mut self) {
		self.stop();
	}
}
