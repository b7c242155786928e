// self
use crate::{_prelude::*, obs::CachePath};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by cache lookups.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided stage; the path is recorded later.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("onemap_token.get_token", stage, path = tracing::field::Empty);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Records the tier currently being consulted.
	pub fn record_path(&self, path: CachePath) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("path", path.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = path;
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits an informational event for the provided stage.
pub fn record_event(stage: &'static str, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::info!(stage, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message);
	}
}

/// Emits a warning for a failure that was handled locally instead of returned.
pub fn record_warning(stage: &'static str, message: &str, error: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage, error = %error, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn helpers_are_safe_without_subscriber() {
		let span = FlowSpan::new("test");

		span.record_path(CachePath::Warm);
		record_event("test", "loaded");
		record_warning("test", "write failed", &"disk full");
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new("instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
