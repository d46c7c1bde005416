//! Clock seam for timestamping

use chrono::{DateTime, Utc};

/// Source of row timestamps
pub trait Clock: Send + Sync {
	/// The current instant
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock pinned to one instant, for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		self.0
	}
}
