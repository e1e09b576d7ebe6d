// self
use crate::obs::AcquireOutcome;

/// Records an acquisition outcome via the global metrics recorder (when enabled).
pub fn record_acquire_outcome(outcome: AcquireOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("onedrive_disk_acquire_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
