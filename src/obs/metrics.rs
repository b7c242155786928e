// self
use crate::obs::{CachePath, FlowOutcome};

/// Records a tier outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(path: CachePath, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"onemap_token_cache_total",
			"path" => path.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (path, outcome);
	}
}
