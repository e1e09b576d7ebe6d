//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `onedrive_disk.acquire` with a `stage`
//!   (call site) field.
//! - Enable `metrics` to increment the `onedrive_disk_acquire_total` counter for every
//!   attempt/cache hit/refresh/failure, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquireOutcome {
	/// Entry to the provider.
	Attempt,
	/// A fresh cached token was served without touching the network.
	CacheHit,
	/// A new token was exchanged and written to the cache.
	Refreshed,
	/// Failure propagated back to the caller.
	Failure,
}
impl AcquireOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AcquireOutcome::Attempt => "attempt",
			AcquireOutcome::CacheHit => "cache_hit",
			AcquireOutcome::Refreshed => "refreshed",
			AcquireOutcome::Failure => "failure",
		}
	}
}
impl Display for AcquireOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
