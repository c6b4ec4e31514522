// self
use crate::{_prelude::*, obs::CallOutcome};

/// Records a finished call via the global metrics recorder (when enabled).
pub fn record_call(endpoint: &str, outcome: CallOutcome, latency: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"maps_transport_call_total",
			"endpoint" => endpoint.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
		metrics::histogram!(
			"maps_transport_call_latency_seconds",
			"endpoint" => endpoint.to_owned()
		)
		.record(latency.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (endpoint, outcome, latency);
	}
}
