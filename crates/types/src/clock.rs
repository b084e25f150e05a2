//! Time source for deadline checks

use std::sync::atomic::{AtomicU64, Ordering};

/// Current unix time in seconds
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait Clock: Send + Sync {
	fn now(&self) -> u64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> u64 {
		chrono::Utc::now().timestamp().max(0) as u64
	}
}

/// Settable clock for deterministic tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
	now: AtomicU64,
}

impl ManualClock {
	pub fn new(now: u64) -> Self {
		Self {
			now: AtomicU64::new(now),
		}
	}

	pub fn set(&self, now: u64) {
		self.now.store(now, Ordering::SeqCst);
	}

	pub fn advance(&self, seconds: u64) {
		self.now.fetch_add(seconds, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> u64 {
		self.now.load(Ordering::SeqCst)
	}
}
