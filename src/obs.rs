//! Optional observability helpers for cache lookups.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to run every lookup inside a span named
//!   `onemap_token.get_token` with the `stage` (call site) and `path` (last tier consulted)
//!   fields, and to emit events for refreshes, cache corruption, and swallowed write failures.
//! - Enable `metrics` to increment the `onemap_token_cache_total` counter for every tier
//!   attempt/success/miss/failure, labeled by `path` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Cache tiers consulted by a lookup, cheapest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CachePath {
	/// In-memory holder.
	Fast,
	/// Durable record on stable storage.
	Warm,
	/// Network login against the issuer.
	Cold,
}
impl CachePath {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CachePath::Fast => "fast",
			CachePath::Warm => "warm",
			CachePath::Cold => "cold",
		}
	}
}
impl Display for CachePath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// The tier was consulted.
	Attempt,
	/// The tier produced the returned token.
	Success,
	/// The tier had nothing usable; the lookup moved on.
	Miss,
	/// The tier failed and the error was returned to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Miss => "miss",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
