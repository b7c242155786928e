// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing which tier served each lookup.
#[derive(Debug, Default)]
pub struct CacheStats {
	fast_hits: AtomicU64,
	warm_hits: AtomicU64,
	cold_attempts: AtomicU64,
	failures: AtomicU64,
	write_failures: AtomicU64,
}
impl CacheStats {
	/// Lookups answered from the in-memory holder.
	pub fn fast_hits(&self) -> u64 {
		self.fast_hits.load(Ordering::Relaxed)
	}

	/// Lookups answered from the durable record.
	pub fn warm_hits(&self) -> u64 {
		self.warm_hits.load(Ordering::Relaxed)
	}

	/// Lookups that fell through to the issuer (including ones rejected before dispatch).
	pub fn cold_attempts(&self) -> u64 {
		self.cold_attempts.load(Ordering::Relaxed)
	}

	/// Lookups that returned an error.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Durable writes that failed and were swallowed.
	pub fn write_failures(&self) -> u64 {
		self.write_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_fast_hit(&self) {
		self.fast_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_warm_hit(&self) {
		self.warm_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cold_attempt(&self) {
		self.cold_attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_write_failure(&self) {
		self.write_failures.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counters_start_at_zero_and_accumulate() {
		let stats = CacheStats::default();

		assert_eq!(stats.fast_hits(), 0);

		stats.record_fast_hit();
		stats.record_fast_hit();
		stats.record_warm_hit();
		stats.record_cold_attempt();
		stats.record_failure();
		stats.record_write_failure();

		assert_eq!(stats.fast_hits(), 2);
		assert_eq!(stats.warm_hits(), 1);
		assert_eq!(stats.cold_attempts(), 1);
		assert_eq!(stats.failures(), 1);
		assert_eq!(stats.write_failures(), 1);
	}
}
